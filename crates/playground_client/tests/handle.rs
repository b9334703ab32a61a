use std::sync::Arc;
use std::time::Duration;

use playground_client::{
    ClientError, ClientEvent, ClientHandle, ClientSettings, FailureKind, JobId, PollReply,
    RunClient,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn next_event(handle: &ClientHandle, within: Duration) -> Option<ClientEvent> {
    let step = Duration::from_millis(10);
    let mut waited = Duration::ZERO;
    while waited < within {
        if let Some(event) = handle.try_recv() {
            return Some(event);
        }
        tokio::time::sleep(step).await;
        waited += step;
    }
    None
}

/// Answers `start` with the code as job id after a per-code delay.
struct ScriptedClient;

#[async_trait::async_trait]
impl RunClient for ScriptedClient {
    async fn start(&self, code: &str) -> Result<JobId, ClientError> {
        if code == "slow" {
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        Ok(code.to_string())
    }

    async fn poll(&self, job_id: &str) -> Result<PollReply, ClientError> {
        Ok(PollReply::Done {
            output: Some(format!("{job_id} finished")),
        })
    }
}

#[tokio::test]
async fn handle_reports_start_then_poll() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"pid": 7}"#, "application/json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/poll/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"status": "running", "output": "1\n"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let handle = ClientHandle::new(ClientSettings::new(&server.uri()).unwrap()).unwrap();
    handle.start(1, "print(1)");
    assert_eq!(
        next_event(&handle, Duration::from_secs(5)).await,
        Some(ClientEvent::RunStarted {
            generation: 1,
            job_id: "7".to_string(),
        })
    );

    handle.schedule_poll(1, "7", Duration::from_millis(10));
    assert_eq!(
        next_event(&handle, Duration::from_secs(5)).await,
        Some(ClientEvent::Polled {
            generation: 1,
            job_id: "7".to_string(),
            reply: PollReply::Running {
                output: Some("1\n".to_string())
            },
        })
    );
}

#[tokio::test]
async fn handle_reports_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let handle = ClientHandle::new(ClientSettings::new(&server.uri()).unwrap()).unwrap();
    handle.start(4, "boom");

    match next_event(&handle, Duration::from_secs(5)).await {
        Some(ClientEvent::Failed { generation, error }) => {
            assert_eq!(generation, 4);
            assert_eq!(error.kind, FailureKind::HttpStatus(500));
            assert_eq!(error.message, "Internal Server Error");
        }
        other => panic!("expected failure event, got {other:?}"),
    }
}

#[tokio::test]
async fn new_run_supersedes_pending_start() {
    let handle = ClientHandle::with_client(Arc::new(ScriptedClient)).unwrap();
    handle.start(1, "slow");
    handle.start(2, "fast");

    assert_eq!(
        next_event(&handle, Duration::from_secs(2)).await,
        Some(ClientEvent::RunStarted {
            generation: 2,
            job_id: "fast".to_string(),
        })
    );
    assert_eq!(next_event(&handle, Duration::from_millis(500)).await, None);
}

#[tokio::test]
async fn polls_for_other_generations_are_dropped() {
    let handle = ClientHandle::with_client(Arc::new(ScriptedClient)).unwrap();
    handle.start(1, "fast");
    assert!(next_event(&handle, Duration::from_secs(2)).await.is_some());

    handle.schedule_poll(2, "fast", Duration::ZERO);
    assert_eq!(next_event(&handle, Duration::from_millis(300)).await, None);

    handle.schedule_poll(1, "fast", Duration::ZERO);
    assert_eq!(
        next_event(&handle, Duration::from_secs(2)).await,
        Some(ClientEvent::Polled {
            generation: 1,
            job_id: "fast".to_string(),
            reply: PollReply::Done {
                output: Some("fast finished".to_string())
            },
        })
    );
}

#[tokio::test]
async fn cancel_drops_scheduled_poll() {
    let handle = ClientHandle::with_client(Arc::new(ScriptedClient)).unwrap();
    handle.start(1, "fast");
    assert!(next_event(&handle, Duration::from_secs(2)).await.is_some());

    handle.schedule_poll(1, "fast", Duration::from_millis(200));
    handle.cancel(1);
    assert_eq!(next_event(&handle, Duration::from_millis(500)).await, None);
}

#[test]
fn recv_timeout_is_empty_while_idle() {
    let handle = ClientHandle::with_client(Arc::new(ScriptedClient)).unwrap();
    assert_eq!(handle.recv_timeout(Duration::from_millis(20)), Ok(None));
}

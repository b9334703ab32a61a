use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use playground_logging::{playground_debug, playground_info, playground_warn};
use tokio_util::sync::CancellationToken;

use crate::client::{ClientSettings, ReqwestRunClient, RunClient};
use crate::types::{ClientError, ClientEvent, FailureKind, Generation, JobId, PollReply};

enum ClientCommand {
    Start {
        generation: Generation,
        code: String,
    },
    Poll {
        generation: Generation,
        job_id: JobId,
        delay: Duration,
    },
    Cancel {
        generation: Generation,
    },
}

/// Requests and timers belonging to one run.
struct PollSession {
    generation: Generation,
    token: CancellationToken,
}

impl PollSession {
    fn new(generation: Generation) -> Self {
        Self {
            generation,
            token: CancellationToken::new(),
        }
    }
}

/// Runs protocol requests on a background tokio runtime.
///
/// Commands go in over a channel; results come back as [`ClientEvent`]s.
/// Only one poll session is live at a time: starting a run cancels the
/// previous session, and work for any other generation is dropped.
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    event_rx: mpsc::Receiver<ClientEvent>,
}

impl ClientHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let client = ReqwestRunClient::new(settings)?;
        Self::with_client(Arc::new(client))
    }

    pub fn with_client(client: Arc<dyn RunClient>) -> Result<Self, ClientError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|err| ClientError::new(FailureKind::Setup, err.to_string()))?;

        thread::spawn(move || {
            let mut session: Option<PollSession> = None;
            while let Ok(command) = cmd_rx.recv() {
                dispatch(&runtime, &client, &mut session, command, &event_tx);
            }
            if let Some(session) = session.take() {
                session.token.cancel();
            }
            playground_debug!("Client command channel closed");
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn start(&self, generation: Generation, code: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::Start {
            generation,
            code: code.into(),
        });
    }

    pub fn schedule_poll(&self, generation: Generation, job_id: impl Into<JobId>, delay: Duration) {
        let _ = self.cmd_tx.send(ClientCommand::Poll {
            generation,
            job_id: job_id.into(),
            delay,
        });
    }

    pub fn cancel(&self, generation: Generation) {
        let _ = self.cmd_tx.send(ClientCommand::Cancel { generation });
    }

    pub fn try_recv(&self) -> Option<ClientEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// `Ok(None)` means nothing arrived in time; an error means the background
    /// thread has exited and the handle is dead.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<ClientEvent>, ClientError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ClientError::new(
                FailureKind::Stopped,
                "client runtime stopped",
            )),
        }
    }
}

fn dispatch(
    runtime: &tokio::runtime::Runtime,
    client: &Arc<dyn RunClient>,
    session: &mut Option<PollSession>,
    command: ClientCommand,
    event_tx: &mpsc::Sender<ClientEvent>,
) {
    match command {
        ClientCommand::Start { generation, code } => {
            if let Some(previous) = session.take() {
                playground_info!("Run {} superseded by run {}", previous.generation, generation);
                previous.token.cancel();
            }
            let current = PollSession::new(generation);
            let token = current.token.clone();
            *session = Some(current);

            let client = client.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = tokio::select! {
                    _ = token.cancelled() => return,
                    result = client.start(&code) => result,
                };
                let event = match result {
                    Ok(job_id) => ClientEvent::RunStarted { generation, job_id },
                    Err(error) => {
                        playground_warn!("Run {} failed to start: {}", generation, error);
                        ClientEvent::Failed { generation, error }
                    }
                };
                let _ = event_tx.send(event);
            });
        }
        ClientCommand::Poll {
            generation,
            job_id,
            delay,
        } => {
            let Some(token) = session
                .as_ref()
                .filter(|s| s.generation == generation)
                .map(|s| s.token.clone())
            else {
                playground_debug!("Dropping poll for stale run {}", generation);
                return;
            };

            let client = client.clone();
            let event_tx = event_tx.clone();
            runtime.spawn(async move {
                let result = tokio::select! {
                    _ = token.cancelled() => return,
                    result = poll_after(client.as_ref(), &job_id, delay) => result,
                };
                let event = match result {
                    Ok(reply) => ClientEvent::Polled { generation, job_id, reply },
                    Err(error) => {
                        playground_warn!("Poll of job {} failed: {}", job_id, error);
                        ClientEvent::Failed { generation, error }
                    }
                };
                let _ = event_tx.send(event);
            });
        }
        ClientCommand::Cancel { generation } => {
            if session.as_ref().is_some_and(|s| s.generation == generation) {
                if let Some(cancelled) = session.take() {
                    cancelled.token.cancel();
                }
            }
        }
    }
}

async fn poll_after(
    client: &dyn RunClient,
    job_id: &str,
    delay: Duration,
) -> Result<PollReply, ClientError> {
    tokio::time::sleep(delay).await;
    client.poll(job_id).await
}

use std::time::Duration;

use playground_logging::{playground_debug, playground_info};
use hyper::ext::ReasonPhrase;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::types::{ClientError, FailureKind, JobId, PollReply};
use crate::wire::{parse_body, PollResponse, StartResponse};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ClientSettings {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be used as a base url"),
            ));
        }
        Ok(Self {
            base_url,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Resolve `path` (e.g. `/fib.ic`) against the base url.
    pub fn resolve(&self, path: &str) -> Result<Url, ClientError> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        endpoint(&self.base_url, &segments)
    }
}

/// The two calls of the run/poll protocol.
#[async_trait::async_trait]
pub trait RunClient: Send + Sync {
    /// Submit code; returns the job id assigned by the server.
    async fn start(&self, code: &str) -> Result<JobId, ClientError>;

    /// Fetch the status (and any new output) of a job.
    async fn poll(&self, job_id: &str) -> Result<PollReply, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestRunClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestRunClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Setup, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ClientError> {
        let status = response.status();
        if !status.is_success() {
            // hyper only records the reason phrase when it differs from the canonical one.
            let status_text = response
                .extensions()
                .get::<ReasonPhrase>()
                .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status_text,
            ));
        }
        response.text().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl RunClient for ReqwestRunClient {
    async fn start(&self, code: &str) -> Result<JobId, ClientError> {
        let url = endpoint(&self.settings.base_url, &["run"])?;
        playground_debug!("POST {} ({} bytes)", url, code.len());
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(code.to_owned())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = Self::read_body(response).await?;
        let started: StartResponse = parse_body(&body)?;
        let job_id = started.job_id();
        playground_info!("Started job {}", job_id);
        Ok(job_id)
    }

    async fn poll(&self, job_id: &str) -> Result<PollReply, ClientError> {
        let url = endpoint(&self.settings.base_url, &["poll", job_id])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = Self::read_body(response).await?;
        let polled: PollResponse = parse_body(&body)?;
        playground_debug!("Job {} status {:?}", job_id, polled.status);
        Ok(polled.into())
    }
}

/// Append path segments to the base url, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::new(FailureKind::InvalidUrl, format!("{base} cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::MalformedBody, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}

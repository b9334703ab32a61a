//! JSON bodies exchanged with the execution server.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{ClientError, FailureKind, JobId, PollReply};

/// Body of a successful `POST /run`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartResponse {
    pid: WireJobId,
}

impl StartResponse {
    pub fn job_id(&self) -> JobId {
        match &self.pid {
            WireJobId::Number(n) => n.to_string(),
            WireJobId::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum WireJobId {
    Number(u64),
    Text(String),
}

/// Body of `GET /poll/{pid}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PollResponse {
    pub status: WireStatus,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub message: Option<WireMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireStatus {
    Running,
    #[serde(alias = "success")]
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireMessage {
    Plain(String),
    Entries(Vec<WireEntry>),
    /// Any other JSON the server chose to send; shown as text.
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WireEntry {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: Vec<WirePart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WirePart {
    Text(String),
    /// Line number (as a string key) to source line text.
    SourceQuote(BTreeMap<String, String>),
}

const MISSING_ERROR_MESSAGE: &str = "execution failed";

impl From<PollResponse> for PollReply {
    fn from(response: PollResponse) -> Self {
        match response.status {
            WireStatus::Running => PollReply::Running {
                output: response.output,
            },
            WireStatus::Done => PollReply::Done {
                output: response.output,
            },
            WireStatus::Error => PollReply::Error {
                message: response
                    .message
                    .unwrap_or_else(|| WireMessage::Plain(MISSING_ERROR_MESSAGE.to_string())),
            },
        }
    }
}

pub(crate) fn parse_body<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|err| ClientError::new(FailureKind::MalformedBody, err.to_string()))
}

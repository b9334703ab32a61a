use std::fmt;

use crate::wire::WireMessage;

pub type JobId = String;
pub type Generation = u64;

/// Outcome of one poll request.
#[derive(Debug, Clone, PartialEq)]
pub enum PollReply {
    Running { output: Option<String> },
    Done { output: Option<String> },
    Error { message: WireMessage },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    RunStarted {
        generation: Generation,
        job_id: JobId,
    },
    Polled {
        generation: Generation,
        job_id: JobId,
        reply: PollReply,
    },
    Failed {
        generation: Generation,
        error: ClientError,
    },
}

/// Transport-level failure: the request never produced a usable reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// Non-success response; the message carries the status text.
    HttpStatus(u16),
    Timeout,
    Network,
    MalformedBody,
    Setup,
    /// The background runtime is gone; no further events will arrive.
    Stopped,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::MalformedBody => write!(f, "malformed response body"),
            FailureKind::Setup => write!(f, "client setup failed"),
            FailureKind::Stopped => write!(f, "client stopped"),
        }
    }
}

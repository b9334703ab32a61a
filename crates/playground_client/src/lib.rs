//! Playground client: HTTP run/poll protocol and effect execution.
mod client;
mod engine;
mod save;
mod types;
mod wire;

pub use client::{
    ClientSettings, ReqwestRunClient, RunClient, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT,
};
pub use engine::ClientHandle;
pub use save::{save_download, SaveError};
pub use types::{ClientError, ClientEvent, FailureKind, Generation, JobId, PollReply};
pub use wire::{PollResponse, StartResponse, WireEntry, WireMessage, WirePart, WireStatus};

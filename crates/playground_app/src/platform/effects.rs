use std::path::PathBuf;
use std::time::Duration;

use playground_client::{
    save_download, ClientEvent, ClientHandle, ClientSettings, PollReply, WireEntry, WireMessage,
    WirePart,
};
use playground_core::{Effect, ErrorEntry, ErrorMessage, JobId, MessagePart, Msg, PollStatus};
use playground_logging::{playground_debug, playground_info, playground_warn};
use url::Url;

/// Side effects the host has to surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved(PathBuf),
    SaveFailed(String),
    Navigate(Url),
    NavigateFailed(String),
}

/// Outcome of waiting for the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbox {
    Msg(Msg),
    Idle,
    /// No client, or its runtime has stopped; nothing more will arrive.
    Closed(String),
}

/// Executes core effects. Saving needs neither a server url nor a client;
/// navigation needs the url; runs need the client handle.
pub struct EffectRunner {
    handle: Option<ClientHandle>,
    settings: Option<ClientSettings>,
    save_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(save_dir: PathBuf) -> Self {
        Self {
            handle: None,
            settings: None,
            save_dir,
        }
    }

    pub fn with_settings(mut self, settings: ClientSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_handle(mut self, handle: ClientHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    pub fn execute(&self, effect: Effect) -> Option<Notice> {
        match effect {
            Effect::StartRun { generation, code } => {
                playground_info!("StartRun generation={} code_len={}", generation, code.len());
                if let Some(handle) = &self.handle {
                    handle.start(generation, code);
                } else {
                    playground_warn!("No client to start run {}", generation);
                }
                None
            }
            Effect::SchedulePoll {
                generation,
                job_id,
                delay,
            } => {
                playground_debug!(
                    "SchedulePoll generation={} job_id={} delay_ms={}",
                    generation,
                    job_id,
                    delay.as_millis()
                );
                if let Some(handle) = &self.handle {
                    handle.schedule_poll(generation, job_id.as_str().to_string(), delay);
                }
                None
            }
            Effect::CancelRun { generation } => {
                playground_debug!("CancelRun generation={}", generation);
                if let Some(handle) = &self.handle {
                    handle.cancel(generation);
                }
                None
            }
            Effect::SaveFile { filename, contents } => {
                match save_download(&self.save_dir, &filename, &contents) {
                    Ok(path) => Some(Notice::Saved(path)),
                    Err(err) => {
                        playground_warn!("Saving {} failed: {}", filename, err);
                        Some(Notice::SaveFailed(err.to_string()))
                    }
                }
            }
            Effect::Navigate { path } => match &self.settings {
                Some(settings) => match settings.resolve(&path) {
                    Ok(url) => Some(Notice::Navigate(url)),
                    Err(err) => Some(Notice::NavigateFailed(err.to_string())),
                },
                None => Some(Notice::NavigateFailed(format!(
                    "no server configured to open {path}"
                ))),
            },
        }
    }

    /// Wait up to `timeout` for the next client event, translated into a core message.
    pub fn recv(&self, timeout: Duration) -> Inbox {
        let Some(handle) = &self.handle else {
            return Inbox::Closed("no client connected".to_string());
        };
        match handle.recv_timeout(timeout) {
            Ok(Some(event)) => Inbox::Msg(map_event(event)),
            Ok(None) => Inbox::Idle,
            Err(err) => Inbox::Closed(err.message),
        }
    }
}

pub(crate) fn map_event(event: ClientEvent) -> Msg {
    match event {
        ClientEvent::RunStarted { generation, job_id } => Msg::RunStarted {
            generation,
            job_id: JobId::new(job_id),
        },
        ClientEvent::Polled {
            generation,
            job_id,
            reply,
        } => Msg::PollCompleted {
            generation,
            job_id: JobId::new(job_id),
            status: map_reply(reply),
        },
        ClientEvent::Failed { generation, error } => {
            playground_warn!(
                "Request for generation {} failed ({}): {}",
                generation,
                error.kind,
                error.message
            );
            Msg::TransportFailed {
                generation,
                message: error.message,
            }
        }
    }
}

fn map_reply(reply: PollReply) -> PollStatus {
    match reply {
        PollReply::Running { output } => PollStatus::Running { output },
        PollReply::Done { output } => PollStatus::Done { output },
        PollReply::Error { message } => PollStatus::Failed {
            message: map_message(message),
        },
    }
}

fn map_message(message: WireMessage) -> ErrorMessage {
    match message {
        WireMessage::Plain(text) => ErrorMessage::Plain(text),
        WireMessage::Entries(entries) => {
            ErrorMessage::Entries(entries.into_iter().map(map_entry).collect())
        }
        WireMessage::Other(value) => ErrorMessage::Plain(value.to_string()),
    }
}

fn map_entry(entry: WireEntry) -> ErrorEntry {
    ErrorEntry {
        category: entry.category,
        name: entry.name,
        parts: entry
            .message
            .into_iter()
            .map(|part| match part {
                WirePart::Text(text) => MessagePart::Text(text),
                WirePart::SourceQuote(lines) => MessagePart::source_quote(lines),
            })
            .collect(),
    }
}

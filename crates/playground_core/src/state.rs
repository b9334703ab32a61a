use std::fmt;
use std::time::Duration;

use crate::editor::{
    EditorBuffer, EditorOptions, Keymap, Platform, DEFAULT_FILE_EXTENSION,
};
use crate::error_view::{ErrorMessage, ErrorView};
use crate::view_model::{AppViewModel, OutputTone};

/// Delay between a poll result and the next poll tick.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Counter identifying one run; bumped every time a run starts.
pub type Generation = u64;

/// Opaque job identifier handed out by the execution server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Submitted,
    Running,
    Completed,
    Failed,
}

/// Result of one poll tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Running { output: Option<String> },
    Done { output: Option<String> },
    Failed { message: ErrorMessage },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunSession {
    generation: Generation,
    job_id: Option<JobId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    editor: EditorBuffer,
    options: EditorOptions,
    keymap: Keymap,
    platform: Platform,
    file_extension: String,
    poll_interval: Duration,
    generation: Generation,
    session: Option<RunSession>,
    phase: RunPhase,
    output: String,
    error: Option<ErrorView>,
    transport_error: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            editor: EditorBuffer::default(),
            options: EditorOptions::default(),
            keymap: Keymap::default(),
            platform: Platform::current(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            poll_interval: POLL_INTERVAL,
            generation: 0,
            session: None,
            phase: RunPhase::Idle,
            output: String::new(),
            error: None,
            transport_error: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = extension.into();
        self
    }

    pub fn with_editor_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn view(&self) -> AppViewModel {
        let tone = match self.phase {
            RunPhase::Completed => OutputTone::Success,
            RunPhase::Failed => OutputTone::Failure,
            RunPhase::Idle | RunPhase::Submitted | RunPhase::Running => OutputTone::Neutral,
        };
        AppViewModel {
            phase: self.phase,
            submit_enabled: self.session.is_none(),
            output: self.output.clone(),
            tone,
            error: self.error.clone(),
            transport_error: self.transport_error.clone(),
            editor: self.options.clone(),
            dirty: self.dirty,
        }
    }

    pub fn editor(&self) -> &EditorBuffer {
        &self.editor
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    /// Returns whether a render is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_editor_text(&mut self, text: String) {
        self.editor.set_value(text);
    }

    pub(crate) fn set_viewport_width(&mut self, width: u32) {
        let options = self.options.clone().with_viewport(width);
        if options != self.options {
            self.options = options;
            self.mark_dirty();
        }
    }

    /// Generation of the run currently in flight, if any.
    pub(crate) fn active_generation(&self) -> Option<Generation> {
        self.session.as_ref().map(|s| s.generation)
    }

    /// Starts a new run, superseding any previous one, and returns its generation.
    pub(crate) fn begin_run(&mut self) -> Generation {
        self.generation += 1;
        self.session = Some(RunSession {
            generation: self.generation,
            job_id: None,
        });
        self.phase = RunPhase::Submitted;
        self.output.clear();
        self.error = None;
        self.transport_error = None;
        self.mark_dirty();
        self.generation
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        self.active_generation() == Some(generation)
    }

    pub(crate) fn is_polling(&self, generation: Generation, job_id: &JobId) -> bool {
        self.phase == RunPhase::Running
            && self
                .session
                .as_ref()
                .is_some_and(|s| s.generation == generation && s.job_id.as_ref() == Some(job_id))
    }

    pub(crate) fn mark_started(&mut self, job_id: JobId) {
        if let Some(session) = self.session.as_mut() {
            session.job_id = Some(job_id);
        }
        self.phase = RunPhase::Running;
        self.mark_dirty();
    }

    pub(crate) fn append_output(&mut self, chunk: Option<String>) {
        if let Some(chunk) = chunk.filter(|c| !c.is_empty()) {
            self.output.push_str(&chunk);
            self.mark_dirty();
        }
    }

    pub(crate) fn complete(&mut self) {
        self.finish(RunPhase::Completed);
    }

    pub(crate) fn fail_execution(&mut self, message: &ErrorMessage) {
        self.error = Some(ErrorView::from_message(message));
        self.finish(RunPhase::Failed);
    }

    pub(crate) fn fail_transport(&mut self, message: String) {
        self.transport_error = Some(message);
        self.finish(RunPhase::Failed);
    }

    fn finish(&mut self, phase: RunPhase) {
        self.session = None;
        self.phase = phase;
        self.mark_dirty();
    }
}

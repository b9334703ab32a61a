use crate::{EditorCommand, Generation, JobId, KeyChord, PollStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Editor contents changed.
    EditorChanged(String),
    /// A key chord was pressed inside the editor.
    KeyPressed(KeyChord),
    /// A command was invoked directly (run button, menu).
    CommandInvoked(EditorCommand),
    /// User picked an entry from the example selector.
    ExampleSelected(String),
    /// Viewport width changed.
    ViewportResized { width: u32 },
    /// Server accepted the submitted code.
    RunStarted { generation: Generation, job_id: JobId },
    /// A poll tick returned.
    PollCompleted {
        generation: Generation,
        job_id: JobId,
        status: PollStatus,
    },
    /// Network error, non-success status or malformed body.
    TransportFailed { generation: Generation, message: String },
    /// Render tick to coalesce rendering.
    Tick,
    NoOp,
}

//! Playground core: pure state machine, editor surface and output rendering.
mod ansi;
mod editor;
mod effect;
mod error_view;
mod msg;
mod state;
mod update;
mod view_model;

pub use ansi::{decode_ansi_colors, escape_html};
pub use editor::{
    save_filename, EditorBuffer, EditorCommand, EditorOptions, KeyBinding, KeyChord,
    KeyChordError, Keymap, Modifier, Platform, DEFAULT_FILE_EXTENSION, GUTTER_MIN_WIDTH,
};
pub use effect::Effect;
pub use error_view::{
    BlockPart, ErrorBlock, ErrorEntry, ErrorMessage, ErrorView, MessagePart, SourceLine,
};
pub use msg::Msg;
pub use state::{AppState, Generation, JobId, PollStatus, RunPhase, POLL_INTERVAL};
pub use update::update;
pub use view_model::{AppViewModel, OutputTone};

use std::fmt;
use std::str::FromStr;

/// Viewports at or below this width hide the line-number gutter.
pub const GUTTER_MIN_WIDTH: u32 = 800;
pub const DEFAULT_FILE_EXTENSION: &str = "ic";

/// Name of the file produced by the save command, e.g. `playground.ic`.
pub fn save_filename(extension: &str) -> String {
    format!("playground.{}", extension.trim_start_matches('.'))
}

/// Text held by the editor pane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorBuffer {
    text: String,
}

impl EditorBuffer {
    pub fn get_value(&self) -> &str {
        &self.text
    }

    pub fn set_value(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub theme: String,
    pub font_size: String,
    pub show_gutter: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            theme: "monokai".to_string(),
            font_size: "13pt".to_string(),
            show_gutter: true,
        }
    }
}

impl EditorOptions {
    pub fn for_viewport(width: u32) -> Self {
        Self::default().with_viewport(width)
    }

    pub fn with_viewport(mut self, width: u32) -> Self {
        self.show_gutter = width > GUTTER_MIN_WIDTH;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows and Linux style bindings (`Ctrl`).
    Windows,
    Mac,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Windows
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Ctrl,
    Cmd,
}

/// A modifier plus a key, written as `Ctrl-Enter` or `Cmd-s`.
///
/// Key names compare case-insensitively; they are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub modifier: Modifier,
    pub key: String,
}

impl KeyChord {
    pub fn new(modifier: Modifier, key: &str) -> Self {
        Self {
            modifier,
            key: key.to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifier = match self.modifier {
            Modifier::Ctrl => "Ctrl",
            Modifier::Cmd => "Cmd",
        };
        write!(f, "{modifier}-{}", self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyChordError {
    MissingKey(String),
    UnknownModifier(String),
}

impl fmt::Display for KeyChordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyChordError::MissingKey(raw) => write!(f, "key chord {raw:?} has no key"),
            KeyChordError::UnknownModifier(m) => write!(f, "unknown modifier {m:?}"),
        }
    }
}

impl std::error::Error for KeyChordError {}

impl FromStr for KeyChord {
    type Err = KeyChordError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (modifier, key) = trimmed
            .split_once('-')
            .ok_or_else(|| KeyChordError::MissingKey(raw.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(KeyChordError::MissingKey(raw.to_string()));
        }
        let modifier = match modifier.trim().to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Modifier::Ctrl,
            "cmd" | "command" => Modifier::Cmd,
            other => return Err(KeyChordError::UnknownModifier(other.to_string())),
        };
        Ok(KeyChord::new(modifier, key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Run,
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub command: EditorCommand,
    pub win: KeyChord,
    pub mac: KeyChord,
}

impl KeyBinding {
    pub fn chord_for(&self, platform: Platform) -> &KeyChord {
        match platform {
            Platform::Windows => &self.win,
            Platform::Mac => &self.mac,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            bindings: vec![
                KeyBinding {
                    command: EditorCommand::Run,
                    win: KeyChord::new(Modifier::Ctrl, "Enter"),
                    mac: KeyChord::new(Modifier::Cmd, "Enter"),
                },
                KeyBinding {
                    command: EditorCommand::Save,
                    win: KeyChord::new(Modifier::Ctrl, "s"),
                    mac: KeyChord::new(Modifier::Cmd, "s"),
                },
            ],
        }
    }
}

impl Keymap {
    pub fn resolve(&self, platform: Platform, chord: &KeyChord) -> Option<EditorCommand> {
        self.bindings
            .iter()
            .find(|binding| binding.chord_for(platform) == chord)
            .map(|binding| binding.command)
    }
}

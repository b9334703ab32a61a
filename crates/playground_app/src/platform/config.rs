use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use playground_client::{
    save_download, ClientError, ClientSettings, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT,
};
use playground_core::{EditorOptions, DEFAULT_FILE_EXTENSION, POLL_INTERVAL};
use playground_logging::{playground_info, playground_warn};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "playground.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    pub server_url: String,
    pub poll_interval_ms: u64,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub save_dir: PathBuf,
    pub file_extension: String,
    pub theme: String,
    pub font_size: String,
    pub viewport_width: u32,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        let editor = EditorOptions::default();
        Self {
            server_url: "http://localhost:8787".to_string(),
            poll_interval_ms: POLL_INTERVAL.as_millis() as u64,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            save_dir: PathBuf::from("."),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            theme: editor.theme,
            font_size: editor.font_size,
            viewport_width: 1024,
        }
    }
}

impl PlaygroundConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn client_settings(&self) -> Result<ClientSettings, ClientError> {
        let mut settings = ClientSettings::new(&self.server_url)?;
        settings.connect_timeout = Duration::from_millis(self.connect_timeout_ms);
        settings.request_timeout = self.request_timeout();
        Ok(settings)
    }

    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions {
            theme: self.theme.clone(),
            font_size: self.font_size.clone(),
            show_gutter: true,
        }
        .with_viewport(self.viewport_width)
    }
}

/// Load configuration from `explicit`, or from `./playground.ron` when present.
///
/// Problems are logged and fall back to defaults; a bad config file never
/// stops the playground from running.
pub(crate) fn load_config(explicit: Option<&Path>) -> PlaygroundConfig {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
            return PlaygroundConfig::default();
        }
        Err(err) => {
            playground_warn!("Failed to read config from {:?}: {}", path, err);
            return PlaygroundConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            playground_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            playground_warn!("Failed to parse config from {:?}: {}", path, err);
            PlaygroundConfig::default()
        }
    }
}

pub(crate) fn save_config(dir: &Path, config: &PlaygroundConfig) -> anyhow::Result<PathBuf> {
    let content = ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::new())
        .context("serializing configuration")?;
    let path = save_download(dir, CONFIG_FILENAME, &content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_default_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(Some(&temp.path().join("absent.ron")));
        assert_eq!(config, PlaygroundConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(server_url: \"http://play.example\", poll_interval_ms: 100)").unwrap();

        let config = load_config(Some(&path));
        assert_eq!(config.server_url, "http://play.example");
        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.file_extension, "ic");
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "this is not ron").unwrap();
        assert_eq!(load_config(Some(&path)), PlaygroundConfig::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let temp = TempDir::new().unwrap();
        let config = PlaygroundConfig {
            server_url: "http://10.0.0.2:9000".to_string(),
            viewport_width: 640,
            ..PlaygroundConfig::default()
        };
        let path = save_config(temp.path(), &config).unwrap();
        assert_eq!(load_config(Some(&path)), config);
    }

    #[test]
    fn narrow_viewport_hides_gutter() {
        let config = PlaygroundConfig {
            viewport_width: 640,
            ..PlaygroundConfig::default()
        };
        assert!(!config.editor_options().show_gutter);
        assert!(PlaygroundConfig::default().editor_options().show_gutter);
    }

    #[test]
    fn client_settings_apply_timeouts() {
        let config = PlaygroundConfig {
            request_timeout_ms: 1_500,
            ..PlaygroundConfig::default()
        };
        let settings = config.client_settings().unwrap();
        assert_eq!(settings.request_timeout, Duration::from_millis(1_500));
        assert_eq!(settings.base_url.as_str(), "http://localhost:8787/");
    }
}

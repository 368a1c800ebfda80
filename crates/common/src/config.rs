//! Application configuration.
//!
//! Scenario files describe *what* to record; this config holds the
//! machine-level settings around it (driver command, encoder binary,
//! font, logging).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Capture-side defaults.
    pub capture: CaptureDefaults,

    /// Render/encode-side defaults.
    pub render: RenderDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Defaults for the capture side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Command line of the external automation driver (program + args).
    /// Empty means no driver is configured.
    pub driver_command: Vec<String>,

    /// How long to wait for a selector to become visible.
    pub element_timeout_ms: u64,
}

/// Defaults for rendering and encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// ffmpeg binary name or path.
    pub ffmpeg_binary: String,

    /// TrueType/OpenType font used for keystroke and watermark text.
    pub font_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "democast=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Whether to print the event target (module path).
    pub show_targets: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capture: CaptureDefaults::default(),
            render: RenderDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            driver_command: Vec::new(),
            element_timeout_ms: 5000,
        }
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            ffmpeg_binary: "ffmpeg".to_string(),
            font_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            show_targets: true,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults when
    /// the file is missing or unreadable.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("democast").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"render":{"ffmpeg_binary":"/opt/ffmpeg"}}"#).unwrap();
        assert_eq!(config.render.ffmpeg_binary, "/opt/ffmpeg");
        assert!(config.render.font_path.is_none());
        assert_eq!(config.capture.element_timeout_ms, 5000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/democast/config.json"));
        assert!(config.capture.driver_command.is_empty());
        assert_eq!(config.render.ffmpeg_binary, "ffmpeg");
    }

    #[test]
    fn test_output_location_belongs_to_scenario() {
        let config: AppConfig =
            serde_json::from_str(r#"{"output_dir":"/old/out","capture":{"element_timeout_ms":900}}"#)
                .unwrap();
        assert_eq!(config.capture.element_timeout_ms, 900);
        let saved = serde_json::to_value(&config).unwrap();
        assert!(saved.get("output_dir").is_none());
    }
}

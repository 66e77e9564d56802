//! Vellum configuration
//!
//! Settings for the view layer, loaded from `vellum.toml` with environment
//! variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct VellumConfig {
    /// Pointer input settings
    pub input: InputConfig,
    /// Context-action overlay settings
    pub overlay: OverlayConfig,
    /// Undo and playback log locations
    pub recording: RecordingConfig,
    /// Snapshot export settings
    pub export: ExportConfig,
}

/// Pointer input configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Two releases closer than this (milliseconds) form a double-click
    pub double_click_ms: u64,
}

/// Context-action overlay configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlayConfig {
    /// Show context actions for the selection
    pub enabled: bool,
    /// Height of a labeled button in pixels
    pub button_height: f32,
    /// Width allotted per caption character
    pub char_width: f32,
    /// Extra width added to every labeled button
    pub button_padding: f32,
}

/// Recording configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecordingConfig {
    /// Directory for the undo log
    pub undo_dir: PathBuf,
    /// Directory for the playback log
    pub playback_dir: PathBuf,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Extension used when an export path has none
    pub default_extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { double_click_ms: 300 }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            button_height: 24.0,
            char_width: 14.0,
            button_padding: 8.0,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        let base = cache_root();
        Self {
            undo_dir: base.join("undo"),
            playback_dir: base.join("playback"),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_extension: "png".to_string(),
        }
    }
}

/// `<cache dir>/vellum`, or `./.vellum` when the platform has no cache dir.
fn cache_root() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("vellum"))
        .unwrap_or_else(|| PathBuf::from(".vellum"))
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl VellumConfig {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(VellumConfig)` - Successfully loaded configuration
    /// * `Err(String)` - Error message if loading failed
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Load `vellum.toml` from the current directory, or defaults if it is missing
    pub fn load_or_default() -> Self {
        Self::load_from_file("vellum.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Ok(val) = std::env::var("VELLUM_DOUBLE_CLICK_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                self.input.double_click_ms = ms;
            }
        }
        if let Ok(val) = std::env::var("VELLUM_OVERLAY") {
            self.overlay.enabled = parse_flag(&val);
        }
        if let Ok(dir) = std::env::var("VELLUM_UNDO_DIR") {
            self.recording.undo_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("VELLUM_PLAYBACK_DIR") {
            self.recording.playback_dir = PathBuf::from(dir);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from vellum.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

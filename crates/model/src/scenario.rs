//! Scenario schema.
//!
//! A scenario is a JSON document with camelCase keys. Every field except
//! `name` and `steps` has a default, so a minimal scenario is just a name
//! and a list of steps.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::ViewportSize;
use crate::validate::{validate, ValidationReport};

/// Top-level scripted demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub viewport: ViewportSize,

    #[serde(default)]
    pub effects: EffectsConfig,

    #[serde(default)]
    pub output: OutputConfig,

    pub steps: Vec<Step>,
}

/// One scripted step: a list of actions followed by a capture delay and a
/// hold, both measured in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub actions: Vec<Action>,

    #[serde(default = "default_capture_delay")]
    pub capture_delay: u64,

    #[serde(default = "default_hold_duration")]
    pub hold_duration: u64,

    #[serde(default)]
    pub transition: Transition,
}

/// Transition applied at the boundary where this step begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    #[default]
    None,
    Fade,
}

/// A single scripted interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    Navigate {
        url: String,
        #[serde(default, rename = "waitUntil")]
        wait_until: WaitUntil,
    },
    Click {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delay: Option<u64>,
    },
    Type {
        selector: String,
        text: String,
        #[serde(default = "default_type_delay")]
        delay: u64,
    },
    Scroll {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default = "default_true")]
        smooth: bool,
    },
    Wait {
        duration: u64,
    },
    Hover {
        selector: String,
    },
    Screenshot {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, rename = "fullPage")]
        full_page: bool,
    },
}

impl Action {
    /// The action's tag as it appears in scenario files.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Navigate { .. } => "navigate",
            Action::Click { .. } => "click",
            Action::Type { .. } => "type",
            Action::Scroll { .. } => "scroll",
            Action::Wait { .. } => "wait",
            Action::Hover { .. } => "hover",
            Action::Screenshot { .. } => "screenshot",
        }
    }

    /// The selector this action targets, if any.
    pub fn selector(&self) -> Option<&str> {
        match self {
            Action::Click { selector, .. }
            | Action::Type { selector, .. }
            | Action::Hover { selector } => Some(selector),
            Action::Scroll { selector, .. } => selector.as_deref(),
            _ => None,
        }
    }
}

/// Navigation readiness condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    Load,
    DomContentLoaded,
    #[default]
    NetworkIdle,
}

impl WaitUntil {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitUntil::Load => "load",
            WaitUntil::DomContentLoaded => "domcontentloaded",
            WaitUntil::NetworkIdle => "networkidle",
        }
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// All visual effects; each section is independently enable-able.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectsConfig {
    pub zoom: ZoomConfig,
    pub cursor: CursorConfig,
    pub background: BackgroundConfig,
    pub device_frame: DeviceFrameConfig,
    pub speed_ramp: SpeedRampConfig,
    pub keystroke: KeystrokeConfig,
    pub watermark: WatermarkConfig,
}

impl EffectsConfig {
    /// Every effect switched off: frames pass through the compositor
    /// untouched apart from the final resize.
    pub fn disabled() -> Self {
        let mut effects = Self::default();
        effects.zoom.enabled = false;
        effects.cursor.enabled = false;
        effects.background.padding = 0;
        effects.background.shadow = false;
        effects.background.border_radius = 0;
        effects.device_frame.enabled = false;
        effects.speed_ramp.enabled = false;
        effects.keystroke.enabled = false;
        effects.watermark.enabled = false;
        effects
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomConfig {
    pub enabled: bool,
    /// Peak scale reached on a click frame.
    pub scale: f64,
    /// Zoom-in/zoom-out ramp length.
    pub duration: u64,
    pub easing: Easing,
    pub auto_zoom: AutoZoomConfig,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 1.8,
            duration: 600,
            easing: Easing::default(),
            auto_zoom: AutoZoomConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    EaseInOut,
    EaseIn,
    EaseOut,
    Linear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AutoZoomConfig {
    pub follow_cursor: bool,
    pub max_scale: f64,
    pub transition_duration: u64,
    pub padding: u32,
}

impl Default for AutoZoomConfig {
    fn default() -> Self {
        Self {
            follow_cursor: true,
            max_scale: 2.0,
            transition_duration: 400,
            padding: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CursorConfig {
    pub enabled: bool,
    pub size: u32,
    pub color: String,
    pub speed: CursorSpeed,
    pub smoothing: bool,
    pub click_effect: bool,
    pub click_color: String,
    pub click_radius: u32,
    pub trail: bool,
    pub trail_length: usize,
    pub trail_color: String,
    pub highlight: bool,
    pub highlight_radius: u32,
    pub highlight_color: String,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 20,
            color: "#000000".to_string(),
            speed: CursorSpeed::Fast,
            smoothing: true,
            click_effect: true,
            click_color: "rgba(59, 130, 246, 0.3)".to_string(),
            click_radius: 30,
            trail: false,
            trail_length: 8,
            trail_color: "rgba(59, 130, 246, 0.2)".to_string(),
            highlight: false,
            highlight_radius: 40,
            highlight_color: "rgba(255, 215, 0, 0.18)".to_string(),
        }
    }
}

/// Cursor travel speed preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorSpeed {
    #[default]
    Fast,
    Normal,
    Slow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundConfig {
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    /// CSS-like color, `linear-gradient(...)`, or an image path.
    pub value: String,
    pub padding: u32,
    pub border_radius: u32,
    pub shadow: bool,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            kind: BackgroundKind::Gradient,
            value: "linear-gradient(135deg, #667eea 0%, #764ba2 100%)".to_string(),
            padding: 60,
            border_radius: 12,
            shadow: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    Gradient,
    Solid,
    Image,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceFrameConfig {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub dark_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Browser,
    Macbook,
    Iphone,
    Ipad,
    Android,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpeedRampConfig {
    pub enabled: bool,
    /// Speed-up factor applied to idle stretches.
    pub idle_speed: f64,
    /// Playback speed around clicks (below 1 slows down).
    pub action_speed: f64,
    pub transition_frames: u32,
}

impl Default for SpeedRampConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            idle_speed: 3.0,
            action_speed: 0.8,
            transition_frames: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeystrokeConfig {
    pub enabled: bool,
    pub position: HudPosition,
    pub font_size: u32,
    pub background_color: String,
    pub text_color: String,
    pub padding: u32,
    /// How long keys stay on screen after the last keystroke.
    pub fade_after: u64,
}

impl Default for KeystrokeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            position: HudPosition::BottomCenter,
            font_size: 18,
            background_color: "rgba(0, 0, 0, 0.75)".to_string(),
            text_color: "#ffffff".to_string(),
            padding: 8,
            fade_after: 1500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HudPosition {
    #[default]
    BottomCenter,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WatermarkConfig {
    pub enabled: bool,
    pub text: String,
    pub position: Corner,
    pub opacity: f64,
    pub font_size: u32,
    pub color: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            text: String::new(),
            position: Corner::BottomRight,
            opacity: 0.5,
            font_size: 14,
            color: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// 1-100; mapped to palette effort for GIF and CRF for video.
    pub quality: u32,
    pub output_dir: PathBuf,
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Gif,
            width: 1280,
            height: 800,
            fps: 15,
            quality: 80,
            output_dir: PathBuf::from("./output"),
            filename: "democast-recording".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Gif,
    Mp4,
    Webm,
    PngSequence,
}

impl OutputFormat {
    /// File extension, or `None` for directory outputs.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Gif => Some("gif"),
            OutputFormat::Mp4 => Some("mp4"),
            OutputFormat::Webm => Some("webm"),
            OutputFormat::PngSequence => None,
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gif" => Ok(OutputFormat::Gif),
            "mp4" => Ok(OutputFormat::Mp4),
            "webm" => Ok(OutputFormat::Webm),
            "png-sequence" => Ok(OutputFormat::PngSequence),
            other => Err(format!(
                "unknown format '{other}' (expected gif, mp4, webm, png-sequence)"
            )),
        }
    }
}

fn default_capture_delay() -> u64 {
    300
}

fn default_hold_duration() -> u64 {
    1500
}

fn default_type_delay() -> u64 {
    50
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Scenario {
    /// Parse a scenario from JSON text without logical validation.
    pub fn from_json_str(json: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(json).map_err(|source| ScenarioError::Parse { path: None, source })
    }

    /// Read, parse, and validate a scenario file.
    ///
    /// Warnings are returned alongside the scenario; any validation error
    /// rejects the file.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, ValidationReport), ScenarioError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario: Scenario =
            serde_json::from_str(&json).map_err(|source| ScenarioError::Parse {
                path: Some(path.to_path_buf()),
                source,
            })?;
        let report = validate(&scenario);
        if !report.is_valid() {
            return Err(ScenarioError::Invalid {
                errors: report.errors,
            });
        }
        Ok((scenario, report))
    }

    pub fn to_json_pretty(&self) -> Result<String, ScenarioError> {
        serde_json::to_string_pretty(self)
            .map_err(|source| ScenarioError::Parse { path: None, source })
    }

    /// Total number of actions across all steps.
    pub fn action_count(&self) -> usize {
        self.steps.iter().map(|s| s.actions.len()).sum()
    }
}

/// Errors raised before capture starts.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    Parse {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },

    #[error("Invalid scenario: {}", errors.join("; "))]
    Invalid { errors: Vec<String> },
}

impl From<ScenarioError> for democast_common::DemocastError {
    fn from(err: ScenarioError) -> Self {
        democast_common::DemocastError::scenario(err.to_string())
    }
}

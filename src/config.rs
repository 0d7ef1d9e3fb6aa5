use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Application configuration loaded from file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DialogdConfig {
    /// Terminal surface settings
    #[serde(default)]
    pub ui: UiConfig,

    /// How the surface is brought to the user's attention
    #[serde(default)]
    pub surface: SurfaceConfig,

    /// Socket session handling
    #[serde(default)]
    pub session: SessionConfig,
}

/// Terminal surface settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    /// Ticks per second (drains the task slot, animates spinners)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,

    /// Maximum frames per second
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Calls kept in the activity log
    #[serde(default = "default_activity_log")]
    pub activity_log: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            frame_rate: default_frame_rate(),
            activity_log: default_activity_log(),
        }
    }
}

fn default_tick_rate() -> f64 {
    4.0
}

fn default_frame_rate() -> f64 {
    30.0
}

fn default_activity_log() -> usize {
    50
}

/// Launcher settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SurfaceConfig {
    /// Send a desktop notification whenever a dialog is raised
    #[serde(default)]
    pub notify: bool,
}

/// Socket session settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Concurrent sessions allowed (they share the single dialog slot)
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Dismiss the current dialog when its session disconnects
    #[serde(default = "default_true")]
    pub dismiss_on_disconnect: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            dismiss_on_disconnect: true,
        }
    }
}

fn default_max_sessions() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Tick and frame rates the run loop accepts, per second
pub const RATE_RANGE: RangeInclusive<f64> = 0.1..=240.0;

/// Upper bound on concurrent socket sessions
const MAX_SESSIONS: usize = 64;

/// Non-positive or non-finite rates fall back to the default; the rest are clamped
fn sanitize_rate(name: &str, value: f64, default: f64) -> f64 {
    if !(value.is_finite() && value > 0.0) {
        tracing::warn!(rate = value, "Invalid {}, using default", name);
        return default;
    }
    if RATE_RANGE.contains(&value) {
        return value;
    }
    let clamped = value.clamp(*RATE_RANGE.start(), *RATE_RANGE.end());
    tracing::warn!(rate = value, "{} out of range, using {}", name, clamped);
    clamped
}

impl DialogdConfig {
    /// Load configuration from default path (~/.config/dialogd/config.toml)
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Get the default configuration path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new().map_or_else(
            || PathBuf::from("~/.config/dialogd/config.toml"),
            |dirs| dirs.config_dir().join("dialogd").join("config.toml"),
        )
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Self {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<Self>(&content) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {:?}", path);
                    config.sanitized()
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Replace values the host cannot run with
    fn sanitized(mut self) -> Self {
        self.ui.tick_rate = sanitize_rate("tick_rate", self.ui.tick_rate, default_tick_rate());
        self.ui.frame_rate = sanitize_rate("frame_rate", self.ui.frame_rate, default_frame_rate());
        let max_sessions = self.session.max_sessions.clamp(1, MAX_SESSIONS);
        if max_sessions != self.session.max_sessions {
            tracing::warn!(
                max_sessions = self.session.max_sessions,
                "max_sessions out of range, using {}",
                max_sessions
            );
            self.session.max_sessions = max_sessions;
        }
        self
    }

    /// Generate example configuration file content
    pub fn example() -> String {
        r#"# dialogd configuration
# Place this file at ~/.config/dialogd/config.toml

[ui]
# Ticks per second: drains queued dialogs and animates spinners
tick_rate = 4.0
frame_rate = 30.0
# Number of recent calls shown on the idle screen
activity_log = 50

[surface]
# Desktop notification when a script raises a dialog
notify = false

[session]
# Concurrent socket sessions (all share the one dialog slot)
max_sessions = 1
# Dismiss the open dialog when the session that created it disconnects
dismiss_on_disconnect = true
"#
        .to_string()
    }
}

/// Tokyo Night color palette
pub mod colors {
    use super::Color;

    pub const BG: Color = Color::Rgb(26, 27, 38); // #1a1b26
    pub const FG: Color = Color::Rgb(192, 202, 245); // #c0caf5
    pub const DIM: Color = Color::Rgb(86, 95, 137); // #565f89 gray
    pub const ACCENT: Color = Color::Rgb(122, 162, 247); // #7aa2f7 blue
    pub const WARN: Color = Color::Rgb(255, 158, 100); // #ff9e64 orange
    pub const OK: Color = Color::Rgb(158, 206, 106); // #9ece6a green
    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261
    pub const HIGHLIGHT: Color = Color::Rgb(187, 154, 247); // #bb9af7 purple
}

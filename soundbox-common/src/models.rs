//! Record models shared between the database layer and the HTTP API
//!
//! Sounds and shortcuts are stored in SQLite as TEXT-heavy rows; the enums
//! here carry `FromStr`/`Display` implementations matching the stored values
//! so the database layer can round-trip them without custom sqlx types.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Where a sound's media comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Media file on the local filesystem (`local_path`)
    LocalFile,
    /// Remote URL played directly by the player process (`source_url`)
    DirectUrl,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::LocalFile => write!(f, "LOCAL_FILE"),
            SourceType::DirectUrl => write!(f, "DIRECT_URL"),
        }
    }
}

impl FromStr for SourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "LOCAL_FILE" => Ok(SourceType::LocalFile),
            "DIRECT_URL" => Ok(SourceType::DirectUrl),
            other => Err(Error::InvalidInput(format!("Unknown source type: {other}"))),
        }
    }
}

/// A user-defined playable sound with per-sound playback overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sound {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub source_type: SourceType,
    pub source_url: Option<String>,
    pub local_path: Option<String>,
    /// Per-sound volume override (0-100); None falls back to the default
    pub volume: Option<i64>,
    /// Trim window start, seconds into the media
    pub trim_start_sec: Option<f64>,
    /// Trim window end, seconds into the media
    pub trim_end_sec: Option<f64>,
    /// Per-sound output device override
    pub output_device: Option<String>,
    pub play_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sound {
    /// Create a new sound with defaults for all optional fields
    pub fn new(name: String, source_type: SourceType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description: None,
            tags: Vec::new(),
            source_type,
            source_url: None,
            local_path: None,
            volume: None,
            trim_start_sec: None,
            trim_end_sec: None,
            output_device: None,
            play_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Resolve the playable source handed to the player process
    pub fn source(&self) -> Result<&str> {
        let source = match self.source_type {
            SourceType::LocalFile => self.local_path.as_deref(),
            SourceType::DirectUrl => self.source_url.as_deref(),
        };
        source.ok_or_else(|| {
            Error::InvalidInput(format!("No playable source for sound {}", self.id))
        })
    }

    /// Validate user-editable fields at the creating/updating boundary
    ///
    /// The playback resolver passes these values through unvalidated, so the
    /// checks live here, on the write path.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("Sound name must not be empty".into()));
        }
        if let Some(vol) = self.volume {
            if !(0..=100).contains(&vol) {
                return Err(Error::InvalidInput(format!(
                    "Volume must be between 0 and 100, got {vol}"
                )));
            }
        }
        if let (Some(start), Some(end)) = (self.trim_start_sec, self.trim_end_sec) {
            if end <= start {
                return Err(Error::InvalidInput(format!(
                    "Trim end ({end}) must be greater than trim start ({start})"
                )));
            }
        }
        if let Some(start) = self.trim_start_sec {
            if start < 0.0 {
                return Err(Error::InvalidInput("Trim start must not be negative".into()));
            }
        }
        // A sound without a source cannot be played; reject it up front.
        self.source().map(|_| ())
    }
}

/// What a keyboard shortcut does when triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShortcutAction {
    Play,
    Stop,
    Toggle,
    Restart,
}

impl fmt::Display for ShortcutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutAction::Play => write!(f, "PLAY"),
            ShortcutAction::Stop => write!(f, "STOP"),
            ShortcutAction::Toggle => write!(f, "TOGGLE"),
            ShortcutAction::Restart => write!(f, "RESTART"),
        }
    }
}

impl FromStr for ShortcutAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PLAY" => Ok(ShortcutAction::Play),
            "STOP" => Ok(ShortcutAction::Stop),
            "TOGGLE" => Ok(ShortcutAction::Toggle),
            "RESTART" => Ok(ShortcutAction::Restart),
            other => Err(Error::InvalidInput(format!("Unknown shortcut action: {other}"))),
        }
    }
}

/// A hotkey bound to a sound action
///
/// Only the records live here; OS-level hotkey registration is a client
/// concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortcut {
    pub id: Uuid,
    pub sound_id: Uuid,
    pub hotkey: String,
    pub action: ShortcutAction,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shortcut {
    pub fn new(sound_id: Uuid, hotkey: String, action: ShortcutAction) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sound_id,
            hotkey,
            action,
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Global playback settings snapshot
///
/// Loaded from the settings table at the start of each playback operation,
/// never subscribed to: a settings change takes effect on the next Play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Default output device; None uses the player's own default
    pub default_output_device: Option<String>,
    /// Default volume (0-100); None uses the player's own default
    pub default_volume: Option<i64>,
    /// Starting a sound stops everything else first
    pub stop_previous_on_play: bool,
    /// Multiple sounds may play concurrently
    pub allow_overlapping: bool,
    /// Path to the external player binary
    pub mpv_path: String,
    /// Grace period before an unresponsive player process is force-killed
    pub kill_grace_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_output_device: None,
            default_volume: None,
            stop_previous_on_play: true,
            allow_overlapping: false,
            mpv_path: "mpv".to_string(),
            kill_grace_ms: 3000,
        }
    }
}

/// One currently-playing sound, as reported to polling clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowPlayingEntry {
    pub sound_id: Uuid,
    pub sound_name: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_seconds: f64,
    pub pid: Option<u32>,
}

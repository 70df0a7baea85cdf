//! Effective playback parameter resolution
//!
//! Pure policy computation, kept separate from the stateful orchestrator so
//! it is unit-testable without process spawning. Fallback order for device
//! and volume: per-sound override, then global default, then absent (the
//! player's own default applies — the value is never forced).

use soundbox_common::{Settings, Sound};
use std::time::Duration;

/// Upper bound on the configurable kill grace period
const MAX_KILL_GRACE_MS: u64 = 10_000;

/// Resolved parameters for one play request
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveParams {
    /// Output device, if any override or default is configured
    pub device: Option<String>,
    /// Volume 0-100, if any override or default is configured
    pub volume: Option<i64>,
    /// Trim window start in seconds; passed through unvalidated
    pub trim_start: Option<f64>,
    /// Trim window end in seconds; passed through unvalidated
    pub trim_end: Option<f64>,
    /// Only one sound may play at a time
    pub exclusive: bool,
    /// Grace period before an unresponsive player is force-killed
    pub kill_grace: Duration,
}

/// Clamped kill grace period from the global settings
pub fn resolve_kill_grace(settings: &Settings) -> Duration {
    Duration::from_millis(settings.kill_grace_ms.min(MAX_KILL_GRACE_MS))
}

/// Compute effective playback parameters from a sound and the global settings
pub fn resolve(sound: &Sound, settings: &Settings) -> EffectiveParams {
    EffectiveParams {
        device: sound
            .output_device
            .clone()
            .or_else(|| settings.default_output_device.clone()),
        volume: sound.volume.or(settings.default_volume),
        trim_start: sound.trim_start_sec,
        trim_end: sound.trim_end_sec,
        exclusive: settings.stop_previous_on_play && !settings.allow_overlapping,
        kill_grace: resolve_kill_grace(settings),
    }
}

//! Playback control surface
//!
//! Coordinates policy resolution, the registry and process spawning, and
//! hooks a reaper onto every spawned process. Sound and settings records are
//! read-only snapshots passed in by the caller at the start of each
//! operation, so a settings change takes effect on the next play, never
//! retroactively.
//!
//! Informational outcomes are successes, not errors: playing an
//! already-playing sound or stopping an idle one reports a flag and changes
//! nothing. Only genuine external failures (unknown sound, spawn failure)
//! surface as errors.

use crate::playback::backend::PlayerBackend;
use crate::playback::policy;
use crate::playback::reaper::spawn_reaper;
use crate::playback::registry::{PlaybackEntry, PlaybackRegistry, Toggled};
use futures::future::join_all;
use soundbox_common::{NowPlayingEntry, Result, Settings, Sound};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Result of a play/restart request
#[derive(Debug)]
pub struct PlayOutcome {
    /// False when the sound was already playing and no restart was requested
    pub started: bool,
    pub entry: Arc<PlaybackEntry>,
}

/// Result of a toggle request
pub struct ToggleOutcome {
    pub now_playing: bool,
    /// Present when the toggle started playback
    pub entry: Option<Arc<PlaybackEntry>>,
}

/// Owns the lifecycle of one external player process per playing sound
pub struct Orchestrator {
    registry: Arc<PlaybackRegistry>,
    backend: Arc<dyn PlayerBackend>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn PlayerBackend>) -> Self {
        Self {
            registry: Arc::new(PlaybackRegistry::new()),
            backend,
        }
    }

    /// Start playing a sound
    ///
    /// `restart` stops any running instance first and waits for its
    /// termination, so playback resumes from the configured trim start and
    /// two live processes for one sound id can never coexist. Under the
    /// exclusive policy every other live sound is stopped before the new one
    /// becomes visible.
    pub async fn play(
        &self,
        sound: &Sound,
        settings: &Settings,
        restart: bool,
    ) -> Result<PlayOutcome> {
        let params = policy::resolve(sound, settings);
        let source = sound.source()?.to_string();

        if restart {
            if let Some(previous) = self.registry.remove(sound.id).await {
                previous.terminate(params.kill_grace).await;
            }
        }

        if params.exclusive {
            let victims = self.registry.drain_except(sound.id).await;
            self.terminate_all(victims, params.kill_grace).await;
        }

        let (entry, already_playing) = self
            .registry
            .try_insert(sound.id, &sound.name, || self.backend.spawn(&source, &params))
            .await?;

        if !already_playing {
            spawn_reaper(Arc::clone(&self.registry), Arc::clone(&entry));
            info!(
                sound_id = %sound.id,
                name = %sound.name,
                pid = ?entry.pid(),
                restart,
                "playback started"
            );
        }

        Ok(PlayOutcome {
            started: !already_playing,
            entry,
        })
    }

    /// Stop a sound; returns false if it was not playing (benign no-op)
    pub async fn stop(&self, sound_id: Uuid, settings: &Settings) -> bool {
        let grace = kill_grace(settings);
        match self.registry.remove(sound_id).await {
            Some(entry) => {
                entry.terminate(grace).await;
                info!(sound_id = %sound_id, "playback stopped");
                true
            }
            None => false,
        }
    }

    /// Stop the sound if playing, start it otherwise
    ///
    /// The branch is decided in a single registry critical section, so a
    /// concurrent toggle cannot fire both stop and play.
    pub async fn toggle(&self, sound: &Sound, settings: &Settings) -> Result<ToggleOutcome> {
        let params = policy::resolve(sound, settings);
        let source = sound.source()?.to_string();

        let outcome = self
            .registry
            .toggle_with(sound.id, &sound.name, params.exclusive, || {
                self.backend.spawn(&source, &params)
            })
            .await?;

        match outcome {
            Toggled::Stopped(entry) => {
                entry.terminate(params.kill_grace).await;
                info!(sound_id = %sound.id, "playback stopped (toggle)");
                Ok(ToggleOutcome {
                    now_playing: false,
                    entry: None,
                })
            }
            Toggled::Started { entry, displaced } => {
                self.terminate_all(displaced, params.kill_grace).await;
                spawn_reaper(Arc::clone(&self.registry), Arc::clone(&entry));
                info!(
                    sound_id = %sound.id,
                    pid = ?entry.pid(),
                    "playback started (toggle)"
                );
                Ok(ToggleOutcome {
                    now_playing: true,
                    entry: Some(entry),
                })
            }
        }
    }

    /// Restart from the configured trim start with freshly resolved params
    pub async fn restart(&self, sound: &Sound, settings: &Settings) -> Result<PlayOutcome> {
        self.play(sound, settings, true).await
    }

    /// Stop every playing sound; returns how many were stopped
    pub async fn stop_all(&self, settings: &Settings) -> usize {
        let entries = self.registry.drain().await;
        let stopped = entries.len();
        self.terminate_all(entries, kill_grace(settings)).await;
        if stopped > 0 {
            info!(stopped, "stopped all playback");
        }
        stopped
    }

    /// Point-in-time view of currently playing sounds
    ///
    /// Never blocks on process I/O; safe to poll at high frequency.
    pub async fn now_playing(&self) -> Vec<NowPlayingEntry> {
        self.registry
            .snapshot_all()
            .await
            .into_iter()
            .map(|entry| NowPlayingEntry {
                sound_id: entry.sound_id(),
                sound_name: entry.sound_name().to_string(),
                started_at: entry.started_at(),
                elapsed_seconds: entry.elapsed_seconds(),
                pid: entry.pid(),
            })
            .collect()
    }

    async fn terminate_all(&self, entries: Vec<Arc<PlaybackEntry>>, grace: Duration) {
        join_all(entries.iter().map(|entry| entry.terminate(grace))).await;
    }
}

/// Grace period for stop paths that have no sound record in hand
fn kill_grace(settings: &Settings) -> Duration {
    policy::resolve_kill_grace(settings)
}

//! External player process invocation
//!
//! The orchestrator treats the player as opaque: it needs a spawned handle,
//! a way to request termination, and a way to observe exit. `PlayerBackend`
//! is that seam; `MpvBackend` is the production implementation, test
//! backends implement the same trait without touching the OS.

use crate::playback::policy::EffectiveParams;
use async_trait::async_trait;
use soundbox_common::{Error, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

/// Spawns one player process per play request
#[async_trait]
pub trait PlayerBackend: Send + Sync {
    /// Start playing `source` with the resolved parameters
    ///
    /// Must either return a live [`PlayerChild`] or fail with
    /// [`Error::SpawnFailed`] leaving no process behind.
    async fn spawn(&self, source: &str, params: &EffectiveParams) -> Result<PlayerChild>;
}

/// Handle to one spawned player instance
///
/// Carries no OS types: a kill request channel into the supervisor task and
/// a watch flag the supervisor sets on exit, whatever the cause.
#[derive(Debug)]
pub struct PlayerChild {
    pid: Option<u32>,
    kill: oneshot::Sender<()>,
    exited: watch::Receiver<bool>,
}

impl PlayerChild {
    pub fn new(pid: Option<u32>, kill: oneshot::Sender<()>, exited: watch::Receiver<bool>) -> Self {
        Self { pid, kill, exited }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub(crate) fn into_parts(self) -> (Option<u32>, oneshot::Sender<()>, watch::Receiver<bool>) {
        (self.pid, self.kill, self.exited)
    }
}

/// Plays sounds by spawning one mpv process per clip
pub struct MpvBackend {
    mpv_path: PathBuf,
}

impl MpvBackend {
    pub fn new(mpv_path: impl Into<PathBuf>) -> Self {
        Self {
            mpv_path: mpv_path.into(),
        }
    }

    /// Build the mpv invocation for a resolved play request
    fn build_command(&self, source: &str, params: &EffectiveParams) -> Command {
        let mut cmd = Command::new(&self.mpv_path);
        cmd.arg("--no-video");

        if let Some(device) = &params.device {
            cmd.arg("--audio-device").arg(device);
        }
        if let Some(volume) = params.volume {
            cmd.arg("--volume").arg(volume.to_string());
        }
        if let Some(start) = params.trim_start {
            cmd.arg("--start").arg(start.to_string());
        }
        if let Some(end) = params.trim_end {
            // mpv takes a play length, not an end position
            let length = match params.trim_start {
                Some(start) => end - start,
                None => end,
            };
            cmd.arg("--length").arg(length.to_string());
        }

        cmd.arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl PlayerBackend for MpvBackend {
    async fn spawn(&self, source: &str, params: &EffectiveParams) -> Result<PlayerChild> {
        let mut child = self.build_command(source, params).spawn().map_err(|e| {
            Error::SpawnFailed(format!("{}: {}", self.mpv_path.display(), e))
        })?;
        let pid = child.id();
        debug!(?pid, source, "spawned player process");

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let (exit_tx, exit_rx) = watch::channel(false);
        let grace = params.kill_grace;

        // Supervisor task: owns the child, waits for natural exit or a kill
        // request, and publishes the exit flag in every path.
        tokio::spawn(async move {
            let natural = tokio::select! {
                status = child.wait() => Some(status),
                _ = kill_rx => None,
            };
            match natural {
                Some(status) => {
                    debug!(?pid, ?status, "player process exited");
                }
                None => {
                    terminate_child(&mut child, grace).await;
                }
            }
            let _ = exit_tx.send(true);
        });

        Ok(PlayerChild::new(pid, kill_tx, exit_rx))
    }
}

/// Terminate a child: polite signal first, force-kill after the grace period
async fn terminate_child(child: &mut Child, grace: Duration) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: plain kill(2) on a pid we own; no memory is touched.
        unsafe {
            libc::kill(pid as i32, libc::SIGTERM);
        }
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(status) => {
                debug!(pid, ?status, "player process terminated");
                return;
            }
            Err(_) => {
                warn!(pid, grace_ms = grace.as_millis() as u64, "player process ignored SIGTERM, force killing");
            }
        }
    }

    #[cfg(not(unix))]
    let _ = grace;

    if let Err(e) = child.kill().await {
        // Process already gone: treated as success.
        debug!("force kill failed (process already exited): {e}");
    }
}

//! Process exit reconciliation
//!
//! One lightweight task per live process watches for exit (natural
//! completion or external kill) and removes the entry from the registry, so
//! a snapshot never reports a dead process for longer than one reaper cycle
//! and callers never need to know a sound "finished".

use crate::playback::registry::{PlaybackEntry, PlaybackRegistry};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Watch `entry`'s process and remove it from the registry once it exits
///
/// Removal matches on process identity, not sound id alone: if a Restart has
/// already replaced the entry, this exit notification is stale and must
/// leave the replacement in place.
pub fn spawn_reaper(
    registry: Arc<PlaybackRegistry>,
    entry: Arc<PlaybackEntry>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        entry.exited_signal().await;
        let removed = registry
            .remove_if_instance(entry.sound_id(), entry.instance())
            .await;
        if removed {
            debug!(
                sound_id = %entry.sound_id(),
                pid = ?entry.pid(),
                "reaped exited player process"
            );
        }
    })
}

//! Live playback registry
//!
//! The single source of truth for "now playing" and the only shared mutable
//! state in the playback subsystem. Every mutation goes through one critical
//! section: an entry is created only inside a registry operation that also
//! successfully spawned its process, and destroyed only by an explicit
//! stop path or by the reaper observing the exit. That discipline is what
//! prevents races between "user stopped it" and "it finished on its own".

use crate::playback::backend::PlayerChild;
use chrono::{DateTime, Utc};
use soundbox_common::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::{oneshot, watch, Mutex};
use tracing::warn;
use uuid::Uuid;

/// Extra time allowed for the supervisor's force-kill path to complete
const KILL_CONFIRM_MARGIN: Duration = Duration::from_secs(2);

/// One live player process for one sound
pub struct PlaybackEntry {
    sound_id: Uuid,
    sound_name: String,
    pid: Option<u32>,
    started_at: DateTime<Utc>,
    /// Process identity token, unique per spawn. The reaper matches on this
    /// so a stale exit notification cannot remove the replacement process a
    /// Restart installed under the same sound id.
    instance: u64,
    kill: StdMutex<Option<oneshot::Sender<()>>>,
    exited: watch::Receiver<bool>,
}

impl PlaybackEntry {
    fn new(sound_id: Uuid, sound_name: String, instance: u64, child: PlayerChild) -> Self {
        let (pid, kill, exited) = child.into_parts();
        Self {
            sound_id,
            sound_name,
            pid,
            started_at: Utc::now(),
            instance,
            kill: StdMutex::new(Some(kill)),
            exited,
        }
    }

    pub fn sound_id(&self) -> Uuid {
        self.sound_id
    }

    pub fn sound_name(&self) -> &str {
        &self.sound_name
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Whether the underlying process has exited (any cause)
    pub fn has_exited(&self) -> bool {
        *self.exited.borrow()
    }

    /// Seconds since playback started
    pub fn elapsed_seconds(&self) -> f64 {
        (Utc::now() - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Request termination of the player process
    ///
    /// Returns false if the request was already made or the process is
    /// already gone; both are idempotent successes.
    pub fn request_kill(&self) -> bool {
        let sender = self.kill.lock().expect("kill sender lock poisoned").take();
        match sender {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Wait until the process has exited, up to `timeout`
    ///
    /// Returns true once the exit is confirmed. A dropped supervisor counts
    /// as exited.
    pub async fn await_exit(&self, timeout: Duration) -> bool {
        let mut rx = self.exited.clone();
        let result = match tokio::time::timeout(timeout, rx.wait_for(|exited| *exited)).await {
            Ok(Ok(_)) => true,
            Ok(Err(_)) => true,
            Err(_) => false,
        };
        result
    }

    /// Wait for process exit with no deadline (reaper path)
    pub async fn exited_signal(&self) {
        let mut rx = self.exited.clone();
        let _ = rx.wait_for(|exited| *exited).await;
    }

    /// Terminate the process and wait for the exit to be confirmed
    ///
    /// The supervisor escalates from a polite signal to a force-kill after
    /// `grace`, so the bounded wait here covers the worst case.
    pub async fn terminate(&self, grace: Duration) {
        if self.request_kill() && !self.await_exit(grace + KILL_CONFIRM_MARGIN).await {
            warn!(
                sound_id = %self.sound_id,
                pid = ?self.pid,
                "player process did not confirm exit within the kill deadline"
            );
        }
    }
}

impl std::fmt::Debug for PlaybackEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEntry")
            .field("sound_id", &self.sound_id)
            .field("sound_name", &self.sound_name)
            .field("pid", &self.pid)
            .field("started_at", &self.started_at)
            .field("instance", &self.instance)
            .field("exited", &self.has_exited())
            .finish()
    }
}

/// Outcome of [`PlaybackRegistry::toggle_with`]
pub enum Toggled {
    /// Sound was playing; the entry has been removed and awaits termination
    Stopped(Arc<PlaybackEntry>),
    /// Sound was idle; a process was spawned and inserted
    Started {
        entry: Arc<PlaybackEntry>,
        /// Entries displaced under the exclusive policy, removed atomically
        /// with the insert and awaiting termination
        displaced: Vec<Arc<PlaybackEntry>>,
    },
}

/// Concurrency-safe mapping from sound id to at most one live process
pub struct PlaybackRegistry {
    entries: Mutex<HashMap<Uuid, Arc<PlaybackEntry>>>,
    next_instance: AtomicU64,
}

impl PlaybackRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_instance: AtomicU64::new(1),
        }
    }

    /// Insert a new entry for `sound_id`, spawning inside the critical section
    ///
    /// If a live entry already exists it is returned with `already_playing =
    /// true` and nothing is spawned, so two concurrent plays of the same
    /// sound cannot both spawn. A leftover entry whose process has already
    /// exited is replaced. Spawn failure leaves the registry unchanged.
    pub async fn try_insert<F, Fut>(
        &self,
        sound_id: Uuid,
        sound_name: &str,
        spawn: F,
    ) -> Result<(Arc<PlaybackEntry>, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PlayerChild>>,
    {
        let mut entries = self.entries.lock().await;
        if let Some(existing) = entries.get(&sound_id) {
            if !existing.has_exited() {
                return Ok((Arc::clone(existing), true));
            }
            entries.remove(&sound_id);
        }

        let child = spawn().await?;
        let entry = Arc::new(PlaybackEntry::new(
            sound_id,
            sound_name.to_string(),
            self.next_instance.fetch_add(1, Ordering::Relaxed),
            child,
        ));
        entries.insert(sound_id, Arc::clone(&entry));
        Ok((entry, false))
    }

    /// Atomically remove and return the entry for `sound_id`, if present
    ///
    /// Idempotent: removing twice is a no-op the second time.
    pub async fn remove(&self, sound_id: Uuid) -> Option<Arc<PlaybackEntry>> {
        self.entries.lock().await.remove(&sound_id)
    }

    /// Remove the entry for `sound_id` only if its process identity matches
    ///
    /// Reaper path: a stale exit notification for a process that Restart
    /// already replaced must not remove the new entry.
    pub async fn remove_if_instance(&self, sound_id: Uuid, instance: u64) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get(&sound_id) {
            Some(entry) if entry.instance() == instance => {
                entries.remove(&sound_id);
                true
            }
            _ => false,
        }
    }

    /// Atomically remove every entry
    pub async fn drain(&self) -> Vec<Arc<PlaybackEntry>> {
        self.entries.lock().await.drain().map(|(_, e)| e).collect()
    }

    /// Atomically remove every entry except the one for `keep`
    pub async fn drain_except(&self, keep: Uuid) -> Vec<Arc<PlaybackEntry>> {
        let mut entries = self.entries.lock().await;
        let victims: Vec<Uuid> = entries.keys().copied().filter(|id| *id != keep).collect();
        victims
            .into_iter()
            .filter_map(|id| entries.remove(&id))
            .collect()
    }

    /// Consistent copy of all live entries
    ///
    /// The lock is held only while cloning Arcs, never across process I/O.
    /// Entries whose process has already exited but which the reaper has not
    /// yet removed are filtered out of the view.
    pub async fn snapshot_all(&self) -> Vec<Arc<PlaybackEntry>> {
        self.entries
            .lock()
            .await
            .values()
            .filter(|entry| !entry.has_exited())
            .cloned()
            .collect()
    }

    /// Decide stop-vs-play for `sound_id` in a single critical section
    ///
    /// There is no window in which both branches can fire: membership is
    /// checked and the branch executed under the same lock used by
    /// [`try_insert`](Self::try_insert) and [`remove`](Self::remove). On the
    /// play branch with `exclusive`, all other entries are drained atomically
    /// with the insert.
    pub async fn toggle_with<F, Fut>(
        &self,
        sound_id: Uuid,
        sound_name: &str,
        exclusive: bool,
        spawn: F,
    ) -> Result<Toggled>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PlayerChild>>,
    {
        let mut entries = self.entries.lock().await;
        if let Some(existing) = entries.get(&sound_id) {
            if !existing.has_exited() {
                let entry = Arc::clone(existing);
                entries.remove(&sound_id);
                return Ok(Toggled::Stopped(entry));
            }
            entries.remove(&sound_id);
        }

        let child = spawn().await?;
        let displaced = if exclusive {
            let others: Vec<Uuid> = entries.keys().copied().collect();
            others.into_iter().filter_map(|id| entries.remove(&id)).collect()
        } else {
            Vec::new()
        };
        let entry = Arc::new(PlaybackEntry::new(
            sound_id,
            sound_name.to_string(),
            self.next_instance.fetch_add(1, Ordering::Relaxed),
            child,
        ));
        entries.insert(sound_id, Arc::clone(&entry));
        Ok(Toggled::Started { entry, displaced })
    }
}

impl Default for PlaybackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

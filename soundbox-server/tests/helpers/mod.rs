//! Shared test helpers
//!
//! A stub player backend that honors the full backend contract (spawn,
//! kill request, exit observation) without touching the OS, plus database
//! and router setup used across the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use soundbox_common::{Error, Result, Settings, Sound, SourceType};
use soundbox_server::api::{create_router, AppState};
use soundbox_server::db::init::{init_database, open_pool};
use soundbox_server::playback::{EffectiveParams, Orchestrator, PlayerBackend, PlayerChild};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, watch};

/// One recorded spawn from the stub backend
#[derive(Clone)]
pub struct SpawnRecord {
    pub source: String,
    pub params: EffectiveParams,
    /// Set when the orchestrator requested this process be killed
    pub killed: Arc<AtomicBool>,
    /// Drives the exit flag; send(true) simulates a natural exit
    pub exit_tx: watch::Sender<bool>,
}

/// Player backend that fakes processes with channels
pub struct StubPlayer {
    /// Simulated clip length; None plays until killed
    auto_exit: Option<Duration>,
    /// Refuse every spawn with SpawnFailed
    fail: bool,
    spawns: Mutex<Vec<SpawnRecord>>,
    counter: AtomicUsize,
}

impl StubPlayer {
    pub fn new() -> Self {
        Self {
            auto_exit: None,
            fail: false,
            spawns: Mutex::new(Vec::new()),
            counter: AtomicUsize::new(0),
        }
    }

    /// Stub whose processes exit on their own after `clip_length`
    pub fn auto_exit(clip_length: Duration) -> Self {
        Self {
            auto_exit: Some(clip_length),
            ..Self::new()
        }
    }

    /// Stub whose spawns always fail
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn spawn_count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<SpawnRecord> {
        self.spawns.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlayerBackend for StubPlayer {
    async fn spawn(&self, source: &str, params: &EffectiveParams) -> Result<PlayerChild> {
        if self.fail {
            return Err(Error::SpawnFailed("stub backend refused to spawn".into()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let (exit_tx, exit_rx) = watch::channel(false);
        let killed = Arc::new(AtomicBool::new(false));

        // Fake supervisor: exits on kill request or after the clip length.
        let killed_flag = Arc::clone(&killed);
        let exit_publish = exit_tx.clone();
        let auto_exit = self.auto_exit;
        tokio::spawn(async move {
            match auto_exit {
                Some(clip_length) => {
                    tokio::select! {
                        result = kill_rx => {
                            if result.is_ok() {
                                killed_flag.store(true, Ordering::SeqCst);
                            }
                        }
                        _ = tokio::time::sleep(clip_length) => {}
                    }
                }
                None => {
                    if kill_rx.await.is_ok() {
                        killed_flag.store(true, Ordering::SeqCst);
                    }
                }
            }
            let _ = exit_publish.send(true);
        });

        self.spawns.lock().unwrap().push(SpawnRecord {
            source: source.to_string(),
            params: params.clone(),
            killed,
            exit_tx,
        });

        Ok(PlayerChild::new(Some(1000 + n as u32), kill_tx, exit_rx))
    }
}

/// Orchestrator wired to a stub backend
pub fn stub_orchestrator(backend: StubPlayer) -> (Arc<Orchestrator>, Arc<StubPlayer>) {
    let backend = Arc::new(backend);
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&backend) as Arc<dyn PlayerBackend>
    ));
    (orchestrator, backend)
}

/// Fresh in-memory database with schema and defaults
pub async fn setup_db() -> SqlitePool {
    let pool = open_pool("sqlite::memory:").await.expect("open pool");
    init_database(&pool).await.expect("init database");
    pool
}

/// Router + pool + backend for API tests
pub async fn setup_test_server(backend: StubPlayer) -> (axum::Router, SqlitePool, Arc<StubPlayer>) {
    let pool = setup_db().await;
    let (orchestrator, backend) = stub_orchestrator(backend);
    let router = create_router(AppState {
        db: pool.clone(),
        orchestrator,
    });
    (router, pool, backend)
}

/// Local-file sound named `name`
pub fn local_sound(name: &str) -> Sound {
    let mut sound = Sound::new(name.to_string(), SourceType::LocalFile);
    sound.local_path = Some(format!("/sounds/{name}.mp3"));
    sound
}

/// Settings with the exclusive collision policy
pub fn exclusive_settings() -> Settings {
    Settings {
        stop_previous_on_play: true,
        allow_overlapping: false,
        kill_grace_ms: 200,
        ..Settings::default()
    }
}

/// Settings allowing sounds to overlap freely
pub fn overlapping_settings() -> Settings {
    Settings {
        stop_previous_on_play: false,
        allow_overlapping: true,
        kill_grace_ms: 200,
        ..Settings::default()
    }
}

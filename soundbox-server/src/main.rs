//! Soundbox server - Main entry point
//!
//! Soundboard backend: HTTP control surface for triggering short audio
//! clips, one external mpv process per actively-playing sound.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundbox_common::config;
use soundbox_server::api;
use soundbox_server::db;
use soundbox_server::playback::{MpvBackend, Orchestrator};

/// Command-line arguments for soundbox-server
#[derive(Parser, Debug)]
#[command(name = "soundbox-server")]
#[command(about = "Soundboard backend server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5720", env = "SOUNDBOX_PORT")]
    port: u16,

    /// Data folder holding the SQLite database
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Override the mpv binary path from settings
    #[arg(long, env = "SOUNDBOX_MPV_PATH")]
    mpv_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soundbox_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    let data_dir = config::resolve_data_dir(args.data_dir.as_deref());
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data folder {}", data_dir.display()))?;

    info!("Starting Soundbox server on port {}", args.port);
    info!("Data folder: {}", data_dir.display());

    // Open the database and make sure the schema and defaults exist
    let pool = db::init::open_pool(&config::database_url(&data_dir))
        .await
        .context("Failed to open database")?;
    db::init::init_database(&pool)
        .await
        .context("Failed to initialize database")?;

    // Player binary: CLI/env override wins, settings value otherwise
    let settings = db::settings::load_settings(&pool)
        .await
        .context("Failed to load settings")?;
    let mpv_path = args.mpv_path.unwrap_or(settings.mpv_path);
    info!("Player binary: {}", mpv_path);

    let orchestrator = Arc::new(Orchestrator::new(Arc::new(MpvBackend::new(mpv_path))));

    // Build the application router
    let app_state = api::AppState {
        db: pool.clone(),
        orchestrator: Arc::clone(&orchestrator),
    };
    let app = api::create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // No player process outlives the server.
    let settings = db::settings::load_settings(&pool).await.unwrap_or_default();
    let stopped = orchestrator.stop_all(&settings).await;
    if stopped > 0 {
        info!("Stopped {} playing sound(s) on shutdown", stopped);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

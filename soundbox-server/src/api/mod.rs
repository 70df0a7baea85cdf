//! REST API implementation for the Soundbox server

pub mod playback;
pub mod settings;
pub mod shortcuts;
pub mod sounds;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::playback::Orchestrator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Playback orchestrator
    pub orchestrator: Arc<Orchestrator>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (no prefix for health endpoint)
        .route("/health", get(health_check))
        // API v1 routes
        .nest(
            "/api/v1",
            Router::new()
                // Sound library
                .route("/sounds", get(sounds::list).post(sounds::create))
                .route(
                    "/sounds/:id",
                    get(sounds::get_one).put(sounds::update).delete(sounds::delete),
                )
                // Shortcut records
                .route("/shortcuts", get(shortcuts::list).post(shortcuts::create))
                .route(
                    "/shortcuts/:id",
                    axum::routing::put(shortcuts::update).delete(shortcuts::delete),
                )
                // Global settings
                .route(
                    "/settings",
                    get(settings::get_settings).put(settings::update_settings),
                )
                // Playback control
                .route("/playback/play/:id", post(playback::play))
                .route("/playback/stop/:id", post(playback::stop))
                .route("/playback/toggle/:id", post(playback::toggle))
                .route("/playback/restart/:id", post(playback::restart))
                .route("/playback/stop-all", post(playback::stop_all))
                .route("/playback/now-playing", get(playback::now_playing)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(_state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "soundbox-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

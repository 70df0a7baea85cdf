//! Playback control endpoints
//!
//! Thin glue over the orchestrator: load the sound and a settings snapshot,
//! invoke the operation, increment the play counter when a process was
//! actually started. Idle-state no-ops (stop/toggle of a sound that is not
//! playing) are 200s with a flag, never errors.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use soundbox_common::{NowPlayingEntry, Settings, Sound};
use uuid::Uuid;

use crate::api::AppState;
use crate::db;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct PlayRequest {
    #[serde(default)]
    pub restart: bool,
}

/// POST /api/v1/playback/play/:id
pub async fn play(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<PlayRequest>>,
) -> ApiResult<Json<serde_json::Value>> {
    let restart = body.map(|Json(req)| req.restart).unwrap_or(false);
    let (sound, settings) = load_sound_and_settings(&state, id).await?;

    let outcome = state.orchestrator.play(&sound, &settings, restart).await?;
    if outcome.started {
        db::sounds::increment_play_count(&state.db, sound.id).await?;
    }

    Ok(Json(json!({
        "sound_id": sound.id,
        "sound_name": sound.name,
        "started": outcome.started,
        "started_at": outcome.entry.started_at(),
        "pid": outcome.entry.pid(),
    })))
}

/// POST /api/v1/playback/stop/:id
///
/// Stopping an idle sound is a benign no-op, reported as `stopped: false`.
pub async fn stop(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let settings = db::settings::load_settings(&state.db).await?;
    let stopped = state.orchestrator.stop(id, &settings).await;
    Ok(Json(json!({ "sound_id": id, "stopped": stopped })))
}

/// POST /api/v1/playback/toggle/:id
pub async fn toggle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let (sound, settings) = load_sound_and_settings(&state, id).await?;

    let outcome = state.orchestrator.toggle(&sound, &settings).await?;
    if outcome.entry.is_some() {
        db::sounds::increment_play_count(&state.db, sound.id).await?;
    }

    Ok(Json(json!({
        "sound_id": sound.id,
        "now_playing": outcome.now_playing,
    })))
}

/// POST /api/v1/playback/restart/:id
pub async fn restart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let (sound, settings) = load_sound_and_settings(&state, id).await?;

    let outcome = state.orchestrator.restart(&sound, &settings).await?;
    if outcome.started {
        db::sounds::increment_play_count(&state.db, sound.id).await?;
    }

    Ok(Json(json!({
        "sound_id": sound.id,
        "sound_name": sound.name,
        "started": outcome.started,
        "started_at": outcome.entry.started_at(),
        "pid": outcome.entry.pid(),
    })))
}

/// POST /api/v1/playback/stop-all
pub async fn stop_all(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let settings = db::settings::load_settings(&state.db).await?;
    let stopped_count = state.orchestrator.stop_all(&settings).await;
    Ok(Json(json!({ "stopped_count": stopped_count })))
}

/// GET /api/v1/playback/now-playing
pub async fn now_playing(State(state): State<AppState>) -> Json<Vec<NowPlayingEntry>> {
    Json(state.orchestrator.now_playing().await)
}

async fn load_sound_and_settings(state: &AppState, id: Uuid) -> ApiResult<(Sound, Settings)> {
    let sound = db::sounds::get_sound(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sound {id} not found")))?;
    let settings = db::settings::load_settings(&state.db).await?;
    Ok((sound, settings))
}

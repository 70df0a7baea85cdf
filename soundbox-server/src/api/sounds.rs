//! Sound library endpoints
//!
//! Field validation happens here, on the write path: the playback resolver
//! passes volume/trim values through without re-checking them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use soundbox_common::{Sound, SourceType};
use uuid::Uuid;

use crate::api::AppState;
use crate::db;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct SoundRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source_type: SourceType,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub local_path: Option<String>,
    #[serde(default)]
    pub volume: Option<i64>,
    #[serde(default)]
    pub trim_start_sec: Option<f64>,
    #[serde(default)]
    pub trim_end_sec: Option<f64>,
    #[serde(default)]
    pub output_device: Option<String>,
}

impl SoundRequest {
    fn apply_to(self, sound: &mut Sound) {
        sound.name = self.name;
        sound.description = self.description;
        sound.tags = self.tags;
        sound.source_type = self.source_type;
        sound.source_url = self.source_url;
        sound.local_path = self.local_path;
        sound.volume = self.volume;
        sound.trim_start_sec = self.trim_start_sec;
        sound.trim_end_sec = self.trim_end_sec;
        sound.output_device = self.output_device;
    }
}

/// GET /api/v1/sounds
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Sound>>> {
    Ok(Json(db::sounds::list_sounds(&state.db).await?))
}

/// POST /api/v1/sounds
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<SoundRequest>,
) -> ApiResult<(StatusCode, Json<Sound>)> {
    let mut sound = Sound::new(String::new(), request.source_type);
    request.apply_to(&mut sound);
    sound.validate()?;

    db::sounds::insert_sound(&state.db, &sound).await?;
    Ok((StatusCode::CREATED, Json(sound)))
}

/// GET /api/v1/sounds/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Sound>> {
    let sound = db::sounds::get_sound(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sound {id} not found")))?;
    Ok(Json(sound))
}

/// PUT /api/v1/sounds/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SoundRequest>,
) -> ApiResult<Json<Sound>> {
    let mut sound = db::sounds::get_sound(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sound {id} not found")))?;
    request.apply_to(&mut sound);
    sound.validate()?;

    db::sounds::update_sound(&state.db, &sound).await?;
    let sound = db::sounds::get_sound(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Internal("Sound vanished during update".into()))?;
    Ok(Json(sound))
}

/// DELETE /api/v1/sounds/:id
///
/// Also stops the sound if it is currently playing, so the registry never
/// references a deleted record.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let settings = db::settings::load_settings(&state.db).await?;
    state.orchestrator.stop(id, &settings).await;

    if db::sounds::delete_sound(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Sound {id} not found")))
    }
}

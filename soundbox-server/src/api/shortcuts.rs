//! Shortcut record endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use soundbox_common::{Shortcut, ShortcutAction};
use uuid::Uuid;

use crate::api::AppState;
use crate::db;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct CreateShortcutRequest {
    pub sound_id: Uuid,
    pub hotkey: String,
    pub action: ShortcutAction,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateShortcutRequest {
    pub hotkey: String,
    pub action: ShortcutAction,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sound_id: Option<Uuid>,
}

/// GET /api/v1/shortcuts?sound_id=...
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Shortcut>>> {
    Ok(Json(db::shortcuts::list_shortcuts(&state.db, query.sound_id).await?))
}

/// POST /api/v1/shortcuts
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateShortcutRequest>,
) -> ApiResult<(StatusCode, Json<Shortcut>)> {
    if request.hotkey.trim().is_empty() {
        return Err(ApiError::BadRequest("Hotkey must not be empty".into()));
    }
    // The bound sound must exist.
    db::sounds::get_sound(&state.db, request.sound_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sound {} not found", request.sound_id)))?;

    let mut shortcut = Shortcut::new(request.sound_id, request.hotkey, request.action);
    shortcut.enabled = request.enabled;
    db::shortcuts::insert_shortcut(&state.db, &shortcut).await?;
    Ok((StatusCode::CREATED, Json(shortcut)))
}

/// PUT /api/v1/shortcuts/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateShortcutRequest>,
) -> ApiResult<Json<Shortcut>> {
    if request.hotkey.trim().is_empty() {
        return Err(ApiError::BadRequest("Hotkey must not be empty".into()));
    }
    let mut shortcut = db::shortcuts::get_shortcut(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Shortcut {id} not found")))?;
    shortcut.hotkey = request.hotkey;
    shortcut.action = request.action;
    shortcut.enabled = request.enabled;

    db::shortcuts::update_shortcut(&state.db, &shortcut).await?;
    Ok(Json(shortcut))
}

/// DELETE /api/v1/shortcuts/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if db::shortcuts::delete_shortcut(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Shortcut {id} not found")))
    }
}

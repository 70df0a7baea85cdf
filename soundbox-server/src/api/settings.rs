//! Global settings endpoints
//!
//! PUT is a partial update: only fields present in the body are written.
//! Clearing the default device or volume is done with the explicit
//! `clear_*` flags, since an absent field means "leave unchanged".

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use soundbox_common::Settings;

use crate::api::AppState;
use crate::db;
use crate::error::ApiResult;

#[derive(Debug, Default, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub default_output_device: Option<String>,
    #[serde(default)]
    pub clear_default_output_device: bool,
    #[serde(default)]
    pub default_volume: Option<i64>,
    #[serde(default)]
    pub clear_default_volume: bool,
    #[serde(default)]
    pub stop_previous_on_play: Option<bool>,
    #[serde(default)]
    pub allow_overlapping: Option<bool>,
    #[serde(default)]
    pub mpv_path: Option<String>,
    #[serde(default)]
    pub kill_grace_ms: Option<u64>,
}

/// GET /api/v1/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<Settings>> {
    Ok(Json(db::settings::load_settings(&state.db).await?))
}

/// PUT /api/v1/settings
pub async fn update_settings(
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> ApiResult<Json<Settings>> {
    let pool = &state.db;

    if patch.clear_default_output_device {
        db::settings::set_default_output_device(pool, None).await?;
    } else if let Some(device) = &patch.default_output_device {
        db::settings::set_default_output_device(pool, Some(device)).await?;
    }

    if patch.clear_default_volume {
        db::settings::set_default_volume(pool, None).await?;
    } else if let Some(volume) = patch.default_volume {
        db::settings::set_default_volume(pool, Some(volume)).await?;
    }

    if let Some(value) = patch.stop_previous_on_play {
        db::settings::set_stop_previous_on_play(pool, value).await?;
    }
    if let Some(value) = patch.allow_overlapping {
        db::settings::set_allow_overlapping(pool, value).await?;
    }
    if let Some(path) = &patch.mpv_path {
        db::settings::set_mpv_path(pool, path).await?;
    }
    if let Some(grace_ms) = patch.kill_grace_ms {
        db::settings::set_kill_grace_ms(pool, grace_ms).await?;
    }

    Ok(Json(db::settings::load_settings(pool).await?))
}

//! Settings database access
//!
//! Read/write settings from the settings table (key-value store). All
//! settings are global/system-wide. Absent device/volume keys mean "let the
//! player use its own default" and are represented as None, never forced to
//! a value.

use soundbox_common::{Error, Result, Settings};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Load the full settings snapshot, applying defaults for missing keys
pub async fn load_settings(pool: &SqlitePool) -> Result<Settings> {
    let defaults = Settings::default();
    Ok(Settings {
        default_output_device: get_setting::<String>(pool, "default_output_device").await?,
        default_volume: get_setting::<i64>(pool, "default_volume").await?,
        stop_previous_on_play: get_setting::<bool>(pool, "stop_previous_on_play")
            .await?
            .unwrap_or(defaults.stop_previous_on_play),
        allow_overlapping: get_setting::<bool>(pool, "allow_overlapping")
            .await?
            .unwrap_or(defaults.allow_overlapping),
        mpv_path: get_setting::<String>(pool, "mpv_path")
            .await?
            .unwrap_or(defaults.mpv_path),
        kill_grace_ms: get_setting::<u64>(pool, "kill_grace_ms")
            .await?
            .unwrap_or(defaults.kill_grace_ms)
            .clamp(0, 10_000),
    })
}

/// Set or clear the default output device
pub async fn set_default_output_device(pool: &SqlitePool, device: Option<&str>) -> Result<()> {
    match device {
        Some(device) => set_setting(pool, "default_output_device", device).await,
        None => delete_setting(pool, "default_output_device").await,
    }
}

/// Set or clear the default volume (0-100)
pub async fn set_default_volume(pool: &SqlitePool, volume: Option<i64>) -> Result<()> {
    if let Some(vol) = volume {
        if !(0..=100).contains(&vol) {
            return Err(Error::InvalidInput(format!(
                "Default volume must be between 0 and 100, got {vol}"
            )));
        }
    }
    match volume {
        Some(vol) => set_setting(pool, "default_volume", vol).await,
        None => delete_setting(pool, "default_volume").await,
    }
}

pub async fn set_stop_previous_on_play(pool: &SqlitePool, value: bool) -> Result<()> {
    set_setting(pool, "stop_previous_on_play", value).await
}

pub async fn set_allow_overlapping(pool: &SqlitePool, value: bool) -> Result<()> {
    set_setting(pool, "allow_overlapping", value).await
}

pub async fn set_mpv_path(pool: &SqlitePool, path: &str) -> Result<()> {
    set_setting(pool, "mpv_path", path).await
}

pub async fn set_kill_grace_ms(pool: &SqlitePool, grace_ms: u64) -> Result<()> {
    set_setting(pool, "kill_grace_ms", grace_ms.clamp(0, 10_000)).await
}

/// Generic setting getter
///
/// Returns None if the key doesn't exist. Parses the stored value using the
/// FromStr trait.
pub async fn get_setting<T: FromStr>(pool: &SqlitePool, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    match value {
        Some(s) => match s.parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::Config(format!(
                "Failed to parse setting '{}' value: {}",
                key, s
            ))),
        },
        None => Ok(None),
    }
}

/// Generic setting setter (upsert)
pub async fn set_setting<T: ToString>(pool: &SqlitePool, key: &str, value: T) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

async fn delete_setting(pool: &SqlitePool, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

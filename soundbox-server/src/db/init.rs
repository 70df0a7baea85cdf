//! Database initialization
//!
//! Creates missing tables on startup and seeds default settings values so a
//! fresh data folder is immediately usable.

use soundbox_common::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

/// Open the SQLite connection pool
pub async fn open_pool(database_url: &str) -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create tables when missing and seed default settings
pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sounds (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            source_type TEXT NOT NULL CHECK (source_type IN ('LOCAL_FILE', 'DIRECT_URL')),
            source_url TEXT,
            local_path TEXT,
            volume INTEGER CHECK (volume IS NULL OR (volume >= 0 AND volume <= 100)),
            trim_start_sec REAL,
            trim_end_sec REAL,
            output_device TEXT,
            play_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS shortcuts (
            id TEXT PRIMARY KEY,
            sound_id TEXT NOT NULL REFERENCES sounds(id) ON DELETE CASCADE,
            hotkey TEXT NOT NULL,
            action TEXT NOT NULL CHECK (action IN ('PLAY', 'STOP', 'TOGGLE', 'RESTART')),
            enabled INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    init_settings_defaults(pool).await?;
    Ok(())
}

/// Initialize settings table with default values
///
/// Only missing keys are written; existing values are never overwritten.
async fn init_settings_defaults(pool: &SqlitePool) -> Result<()> {
    let defaults = vec![
        // Collision policy: exclusive playback by default
        ("stop_previous_on_play", "true"),
        ("allow_overlapping", "false"),
        // External player binary
        ("mpv_path", "mpv"),
        // Grace period before force-killing an unresponsive player
        ("kill_grace_ms", "3000"),
    ];

    for (key, default_value) in defaults {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
                .bind(key)
                .fetch_one(pool)
                .await?;

        if !exists {
            sqlx::query("INSERT INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;
            info!("Initialized setting '{}' with default value: {}", key, default_value);
        }
    }

    Ok(())
}

//! Shortcut database operations
//!
//! Hotkey records bound to sound actions. Only persistence lives here; the
//! OS-level hotkey registration is a client concern.

use chrono::{DateTime, Utc};
use soundbox_common::{Error, Result, Shortcut, ShortcutAction};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert a new shortcut record
pub async fn insert_shortcut(pool: &SqlitePool, shortcut: &Shortcut) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO shortcuts (id, sound_id, hotkey, action, enabled, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(shortcut.id.to_string())
    .bind(shortcut.sound_id.to_string())
    .bind(&shortcut.hotkey)
    .bind(shortcut.action.to_string())
    .bind(shortcut.enabled)
    .bind(shortcut.created_at)
    .bind(shortcut.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update hotkey, action and enabled flag of an existing shortcut
pub async fn update_shortcut(pool: &SqlitePool, shortcut: &Shortcut) -> Result<()> {
    let result = sqlx::query(
        "UPDATE shortcuts SET hotkey = ?, action = ?, enabled = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&shortcut.hotkey)
    .bind(shortcut.action.to_string())
    .bind(shortcut.enabled)
    .bind(Utc::now())
    .bind(shortcut.id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Shortcut {} not found", shortcut.id)));
    }
    Ok(())
}

/// Delete a shortcut; returns false if no row matched
pub async fn delete_shortcut(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM shortcuts WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Load a shortcut by id
pub async fn get_shortcut(pool: &SqlitePool, id: Uuid) -> Result<Option<Shortcut>> {
    let row = sqlx::query("SELECT * FROM shortcuts WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(shortcut_from_row(&row)?)),
        None => Ok(None),
    }
}

/// List all shortcuts, optionally filtered to one sound
pub async fn list_shortcuts(pool: &SqlitePool, sound_id: Option<Uuid>) -> Result<Vec<Shortcut>> {
    let rows = match sound_id {
        Some(sound_id) => {
            sqlx::query("SELECT * FROM shortcuts WHERE sound_id = ? ORDER BY hotkey")
                .bind(sound_id.to_string())
                .fetch_all(pool)
                .await?
        }
        None => {
            sqlx::query("SELECT * FROM shortcuts ORDER BY hotkey")
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter().map(shortcut_from_row).collect()
}

fn shortcut_from_row(row: &SqliteRow) -> Result<Shortcut> {
    let id_str: String = row.get("id");
    let sound_id_str: String = row.get("sound_id");
    let action_str: String = row.get("action");

    Ok(Shortcut {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| Error::Internal(format!("Invalid UUID in shortcuts.id: {e}")))?,
        sound_id: Uuid::parse_str(&sound_id_str)
            .map_err(|e| Error::Internal(format!("Invalid UUID in shortcuts.sound_id: {e}")))?,
        hotkey: row.get("hotkey"),
        action: action_str.parse::<ShortcutAction>()?,
        enabled: row.get("enabled"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}

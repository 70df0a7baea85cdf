//! Sound database operations
//!
//! Implements the persistence boundary the playback subsystem consumes:
//! sound lookup by id and the play-count increment, plus the CRUD surface
//! for the API layer.

use chrono::{DateTime, Utc};
use soundbox_common::{Error, Result, Sound, SourceType};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert a new sound record
pub async fn insert_sound(pool: &SqlitePool, sound: &Sound) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sounds (
            id, name, description, tags, source_type, source_url, local_path,
            volume, trim_start_sec, trim_end_sec, output_device, play_count,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(sound.id.to_string())
    .bind(&sound.name)
    .bind(&sound.description)
    .bind(serde_json::to_string(&sound.tags).map_err(|e| Error::Internal(e.to_string()))?)
    .bind(sound.source_type.to_string())
    .bind(&sound.source_url)
    .bind(&sound.local_path)
    .bind(sound.volume)
    .bind(sound.trim_start_sec)
    .bind(sound.trim_end_sec)
    .bind(&sound.output_device)
    .bind(sound.play_count)
    .bind(sound.created_at)
    .bind(sound.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update all user-editable fields of an existing sound
pub async fn update_sound(pool: &SqlitePool, sound: &Sound) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE sounds SET
            name = ?, description = ?, tags = ?, source_type = ?,
            source_url = ?, local_path = ?, volume = ?, trim_start_sec = ?,
            trim_end_sec = ?, output_device = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&sound.name)
    .bind(&sound.description)
    .bind(serde_json::to_string(&sound.tags).map_err(|e| Error::Internal(e.to_string()))?)
    .bind(sound.source_type.to_string())
    .bind(&sound.source_url)
    .bind(&sound.local_path)
    .bind(sound.volume)
    .bind(sound.trim_start_sec)
    .bind(sound.trim_end_sec)
    .bind(&sound.output_device)
    .bind(Utc::now())
    .bind(sound.id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Sound {} not found", sound.id)));
    }
    Ok(())
}

/// Delete a sound; returns false if no row matched
pub async fn delete_sound(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sounds WHERE id = ?")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Load a sound by id
pub async fn get_sound(pool: &SqlitePool, id: Uuid) -> Result<Option<Sound>> {
    let row = sqlx::query("SELECT * FROM sounds WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(Some(sound_from_row(&row)?)),
        None => Ok(None),
    }
}

/// List all sounds ordered by name
pub async fn list_sounds(pool: &SqlitePool) -> Result<Vec<Sound>> {
    let rows = sqlx::query("SELECT * FROM sounds ORDER BY name COLLATE NOCASE")
        .fetch_all(pool)
        .await?;

    rows.iter().map(sound_from_row).collect()
}

/// Increment the play counter
///
/// Called exactly once per successful play start, at spawn time, so a clip
/// stopped early still counts.
pub async fn increment_play_count(pool: &SqlitePool, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE sounds SET play_count = play_count + 1, updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

fn sound_from_row(row: &SqliteRow) -> Result<Sound> {
    let id_str: String = row.get("id");
    let tags_json: String = row.get("tags");
    let source_type_str: String = row.get("source_type");

    Ok(Sound {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| Error::Internal(format!("Invalid UUID in sounds.id: {e}")))?,
        name: row.get("name"),
        description: row.get("description"),
        tags: serde_json::from_str(&tags_json)
            .map_err(|e| Error::Internal(format!("Invalid tags JSON: {e}")))?,
        source_type: source_type_str.parse::<SourceType>()?,
        source_url: row.get("source_url"),
        local_path: row.get("local_path"),
        volume: row.get("volume"),
        trim_start_sec: row.get("trim_start_sec"),
        trim_end_sec: row.get("trim_end_sec"),
        output_device: row.get("output_device"),
        play_count: row.get("play_count"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::{init_database, open_pool};

    async fn setup() -> SqlitePool {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        init_database(&pool).await.unwrap();
        pool
    }

    fn sample_sound() -> Sound {
        let mut sound = Sound::new("airhorn".into(), SourceType::LocalFile);
        sound.local_path = Some("/sounds/airhorn.mp3".into());
        sound.tags = vec!["meme".into(), "loud".into()];
        sound.volume = Some(85);
        sound.trim_start_sec = Some(1.5);
        sound.trim_end_sec = Some(4.0);
        sound
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let pool = setup().await;
        let sound = sample_sound();
        insert_sound(&pool, &sound).await.unwrap();

        let loaded = get_sound(&pool, sound.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, sound.id);
        assert_eq!(loaded.name, "airhorn");
        assert_eq!(loaded.tags, vec!["meme".to_string(), "loud".to_string()]);
        assert_eq!(loaded.source_type, SourceType::LocalFile);
        assert_eq!(loaded.volume, Some(85));
        assert_eq!(loaded.trim_start_sec, Some(1.5));
        assert_eq!(loaded.trim_end_sec, Some(4.0));
        assert_eq!(loaded.play_count, 0);
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let pool = setup().await;
        assert!(get_sound(&pool, Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_changes_fields_and_missing_row_errors() {
        let pool = setup().await;
        let mut sound = sample_sound();
        insert_sound(&pool, &sound).await.unwrap();

        sound.name = "foghorn".into();
        sound.volume = None;
        update_sound(&pool, &sound).await.unwrap();

        let loaded = get_sound(&pool, sound.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "foghorn");
        assert_eq!(loaded.volume, None);

        let mut ghost = sample_sound();
        ghost.id = Uuid::new_v4();
        assert!(matches!(
            update_sound(&pool, &ghost).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let pool = setup().await;
        let sound = sample_sound();
        insert_sound(&pool, &sound).await.unwrap();

        assert!(delete_sound(&pool, sound.id).await.unwrap());
        assert!(!delete_sound(&pool, sound.id).await.unwrap());
    }

    #[tokio::test]
    async fn list_orders_by_name() {
        let pool = setup().await;
        for name in ["zebra", "Alpha", "mango"] {
            let mut sound = Sound::new(name.into(), SourceType::DirectUrl);
            sound.source_url = Some("https://example.com/clip.mp3".into());
            insert_sound(&pool, &sound).await.unwrap();
        }

        let names: Vec<String> = list_sounds(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "mango", "zebra"]);
    }

    #[tokio::test]
    async fn play_count_increments() {
        let pool = setup().await;
        let sound = sample_sound();
        insert_sound(&pool, &sound).await.unwrap();

        increment_play_count(&pool, sound.id).await.unwrap();
        increment_play_count(&pool, sound.id).await.unwrap();

        let loaded = get_sound(&pool, sound.id).await.unwrap().unwrap();
        assert_eq!(loaded.play_count, 2);
    }
}

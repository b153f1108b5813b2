//! Repository for the `follower_cursor` table.

use chrono::Utc;
use sqlx::SqlitePool;

/// Persists the follower's read cursor, one row per followed stream.
pub struct CursorRepo;

impl CursorRepo {
    /// The persisted offset for a stream, if one exists.
    pub async fn get(pool: &SqlitePool, stream: &str) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT byte_offset FROM follower_cursor WHERE stream_identity = ?")
            .bind(stream)
            .fetch_optional(pool)
            .await
    }

    /// Upsert the offset of the first unconsumed byte for a stream.
    pub async fn set(pool: &SqlitePool, stream: &str, offset: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO follower_cursor (stream_identity, byte_offset, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(stream_identity) DO UPDATE SET
                 byte_offset = excluded.byte_offset,
                 updated_at = excluded.updated_at",
        )
        .bind(stream)
        .bind(offset)
        .bind(Utc::now())
        .execute(pool)
        .await
        .map(|_| ())
    }
}

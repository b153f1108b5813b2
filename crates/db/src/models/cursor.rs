//! Follower cursor rows.

use arenatrack_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `follower_cursor` table.
#[derive(Debug, Clone, FromRow)]
pub struct CursorRow {
    pub stream_identity: String,
    pub byte_offset: i64,
    pub updated_at: Timestamp,
}

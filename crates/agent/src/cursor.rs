//! Persisted follower cursor storage.
//!
//! The cursor is explicit state handed to the follower at construction,
//! not ambient globals; [`CursorStore`] is the narrow storage interface
//! behind it, with a SQLite-backed implementation for the daemon and an
//! in-memory one for tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use arenatrack_db::repositories::CursorRepo;
use arenatrack_db::DbPool;
use async_trait::async_trait;

/// Cursor storage failure. Fatal: the follower refuses to run without
/// working cursor persistence, since resumption would silently break.
#[derive(Debug, thiserror::Error)]
#[error("cursor storage unavailable: {0}")]
pub struct CursorError(pub String);

#[async_trait]
pub trait CursorStore: Send + Sync {
    /// The persisted offset for a stream, if any.
    async fn load(&self, stream: &str) -> Result<Option<u64>, CursorError>;

    /// Persist the offset of the first unconsumed byte for a stream.
    async fn store(&self, stream: &str, offset: u64) -> Result<(), CursorError>;
}

/// SQLite-backed store used by the daemon.
pub struct SqliteCursorStore {
    pool: DbPool,
}

impl SqliteCursorStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CursorStore for SqliteCursorStore {
    async fn load(&self, stream: &str) -> Result<Option<u64>, CursorError> {
        CursorRepo::get(&self.pool, stream)
            .await
            .map(|offset| offset.map(|v| v.max(0) as u64))
            .map_err(|e| CursorError(e.to_string()))
    }

    async fn store(&self, stream: &str, offset: u64) -> Result<(), CursorError> {
        CursorRepo::set(&self.pool, stream, offset as i64)
            .await
            .map_err(|e| CursorError(e.to_string()))
    }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    offsets: Mutex<HashMap<String, u64>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offset for a stream, for assertions.
    pub fn get(&self, stream: &str) -> Option<u64> {
        self.offsets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(stream)
            .copied()
    }
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn load(&self, stream: &str) -> Result<Option<u64>, CursorError> {
        Ok(self.get(stream))
    }

    async fn store(&self, stream: &str, offset: u64) -> Result<(), CursorError> {
        self.offsets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(stream.to_string(), offset);
        Ok(())
    }
}

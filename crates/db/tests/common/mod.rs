//! Shared helpers for db integration tests.

use arenatrack_db::DbPool;

/// Fresh in-memory database with migrations applied.
pub async fn memory_pool() -> DbPool {
    arenatrack_db::connect("sqlite::memory:")
        .await
        .expect("in-memory database should open")
}

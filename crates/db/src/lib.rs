//! SQLite persistence for arenatrack.
//!
//! Storage is split the usual way:
//!
//! - [`models`] -- row structs mapped with `sqlx::FromRow`.
//! - [`repositories`] -- one repository per table with `async fn`s taking
//!   a pool reference.
//!
//! [`connect`] creates the pool and runs the embedded migrations. Both
//! the identity index and the follower cursor live here; if this database
//! cannot be opened the daemon aborts startup rather than run in a
//! silently-inconsistent mode.

pub mod models;
pub mod repositories;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

/// Open (creating if missing) the tracker database and run pending
/// migrations.
pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database exists per connection; keep exactly one so
    // every query and the migrations see the same schema.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    tracing::debug!(database_url, "Database ready");
    Ok(pool)
}

//! Shared type aliases used across the workspace.

/// Database row identifier (SQLite rowid).
pub type DbId = i64;

/// UTC timestamp used on all domain events and rows.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

//! `arenatrack-agent` library crate.
//!
//! Re-exports internal modules for integration testing. The binary
//! entrypoint lives in `main.rs`.

pub mod config;
pub mod cursor;
pub mod follower;
pub mod pipeline;

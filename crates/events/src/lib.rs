//! Arenatrack event bus.
//!
//! The follower pipeline produces a single ordered sequence of
//! [`LogEvent`](arenatrack_core::log::LogEvent)s; [`EventBus`] fans that
//! sequence out to any number of downstream subscribers (the serving
//! layer, exporters), each with an independent cursor into the stream.

pub mod bus;

pub use bus::EventBus;

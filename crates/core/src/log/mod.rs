//! Typed domain events produced from client log records.
//!
//! [`LogEvent`] is the envelope downstream consumers subscribe to. Each
//! payload carries a fixed required-field set; any additional fields the
//! client writes are preserved as opaque metadata in `extra`, so new log
//! fields never break parsing.

pub mod parser;
pub mod record;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::types::Timestamp;

/// One event derived from the client log.
///
/// Never mutated after creation. `raw_offset` is the byte position of the
/// source record in the followed stream, for resumability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub event_id: Uuid,
    pub timestamp: Timestamp,
    pub raw_offset: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl LogEvent {
    pub fn new(timestamp: Timestamp, raw_offset: u64, kind: EventKind) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp,
            raw_offset,
            kind,
        }
    }
}

/// The recognized event categories (closed set, extensible).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventKind {
    MatchStart(MatchStart),
    MatchEnd(MatchEnd),
    DraftPick(DraftPick),
    DeckSubmission(DeckSubmission),
    CollectionUpdate(CollectionUpdate),
    /// Marker injected by the follower when the stream was truncated or
    /// rotated; processing continues from offset 0 after it.
    StreamDiscontinuity(StreamDiscontinuity),
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MatchStart(_) => "match_start",
            Self::MatchEnd(_) => "match_end",
            Self::DraftPick(_) => "draft_pick",
            Self::DeckSubmission(_) => "deck_submission",
            Self::CollectionUpdate(_) => "collection_update",
            Self::StreamDiscontinuity(_) => "stream_discontinuity",
        }
    }
}

/// A match began. The match id is carried in every record of the match,
/// so start/end correlation needs no parser state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStart {
    pub match_id: String,
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub opponent: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A match finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchEnd {
    pub match_id: String,
    /// `"win"`, `"loss"`, `"draw"`; kept as text to tolerate new values.
    pub result: String,
    #[serde(default)]
    pub turns: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One pick during a draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPick {
    pub draft_id: String,
    pub pack_number: u32,
    pub pick_number: u32,
    pub card_id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A deck was submitted to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSubmission {
    #[serde(default)]
    pub deck_name: Option<String>,
    #[serde(rename = "mainDeck")]
    pub main: Vec<CardQuantity>,
    #[serde(default)]
    pub sideboard: Vec<CardQuantity>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A card reference with a count, as the client writes deck lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardQuantity {
    pub card_id: i64,
    pub quantity: u32,
}

/// The client reported the full card collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionUpdate {
    pub counts: Vec<CardCount>,
}

/// Owned count of one card in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCount {
    pub card_id: i64,
    pub count: u32,
}

/// The followed stream was truncated or rotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDiscontinuity {
    /// Offset the cursor held when the truncation was detected.
    pub previous_offset: u64,
    /// Observed stream length at detection time.
    pub stream_len: u64,
}

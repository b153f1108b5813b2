//! Record -> event pipeline.
//!
//! Drains the follower's item sequence, parses each record into typed
//! events, and publishes them on the bus in source order. Per-record
//! parse failures are counted and skipped; they never halt the stream.
//! Discontinuity items become [`StreamDiscontinuity`] marker events that
//! precede whatever is re-emitted from offset 0.

use std::sync::Arc;

use arenatrack_core::cards::index::CardIndex;
use arenatrack_core::cards::CardRef;
use arenatrack_core::log::parser::LogParser;
use arenatrack_core::log::{EventKind, LogEvent, StreamDiscontinuity};
use arenatrack_events::EventBus;
use chrono::Utc;
use tokio::sync::mpsc;

use crate::follower::FollowerItem;

/// Counters reported when the pipeline drains.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub records: u64,
    pub events: u64,
    pub parse_failures: u64,
    pub discontinuities: u64,
    pub unresolved_cards: u64,
}

/// Run until the follower side of the channel closes.
pub async fn run(
    mut rx: mpsc::Receiver<FollowerItem>,
    index: Arc<CardIndex>,
    bus: Arc<EventBus>,
) -> PipelineStats {
    let parser = LogParser::new();
    let mut stats = PipelineStats::default();

    while let Some(item) = rx.recv().await {
        match item {
            FollowerItem::Record(record) => {
                stats.records += 1;
                match parser.parse_record(&record) {
                    Ok(events) => {
                        for event in events {
                            stats.unresolved_cards += count_unresolved(&index, &event);
                            stats.events += 1;
                            bus.publish(event);
                        }
                    }
                    Err(error) => {
                        stats.parse_failures += 1;
                        tracing::warn!(offset = record.offset, %error, "Skipping malformed record");
                    }
                }
            }
            FollowerItem::Discontinuity {
                previous_offset,
                stream_len,
            } => {
                stats.discontinuities += 1;
                tracing::warn!(previous_offset, stream_len, "Stream discontinuity; replaying");
                bus.publish(LogEvent::new(
                    Utc::now(),
                    0,
                    EventKind::StreamDiscontinuity(StreamDiscontinuity {
                        previous_offset,
                        stream_len,
                    }),
                ));
            }
        }
    }

    tracing::info!(
        records = stats.records,
        events = stats.events,
        parse_failures = stats.parse_failures,
        "Pipeline drained"
    );
    stats
}

/// Resolve every card reference an event carries. Misses are expected
/// during initial catch-up (sources may not be ingested yet) and are
/// surfaced as counts, never as errors.
fn count_unresolved(index: &CardIndex, event: &LogEvent) -> u64 {
    let card_ids: Vec<i64> = match &event.kind {
        EventKind::DraftPick(pick) => vec![pick.card_id],
        EventKind::DeckSubmission(deck) => deck
            .main
            .iter()
            .chain(&deck.sideboard)
            .map(|card| card.card_id)
            .collect(),
        EventKind::CollectionUpdate(update) => {
            update.counts.iter().map(|card| card.card_id).collect()
        }
        _ => Vec::new(),
    };

    let misses = card_ids
        .into_iter()
        .filter(|id| index.resolve(&CardRef::Arena(*id)).is_err())
        .count() as u64;
    if misses > 0 {
        tracing::debug!(
            event = event.kind.name(),
            misses,
            "Unresolved card references"
        );
    }
    misses
}

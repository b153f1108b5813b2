//! Integration tests for the record -> event pipeline.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use arenatrack_agent::follower::FollowerItem;
use arenatrack_agent::pipeline;
use arenatrack_core::cards::index::CardIndex;
use arenatrack_core::cards::source::{CardListRow, SourceRow};
use arenatrack_core::log::record::RawRecord;
use arenatrack_core::log::EventKind;
use arenatrack_events::EventBus;

const WAIT: Duration = Duration::from_secs(5);

fn record(offset: u64, text: &str) -> FollowerItem {
    FollowerItem::Record(RawRecord {
        offset,
        next_offset: offset + text.len() as u64 + 1,
        text: text.to_string(),
    })
}

#[tokio::test]
async fn parses_and_publishes_in_source_order() {
    let index = Arc::new(CardIndex::new());
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();
    let (tx, rx) = mpsc::channel(16);

    let pipeline = tokio::spawn(pipeline::run(rx, index, Arc::clone(&bus)));

    tx.send(record(
        0,
        r#"[UnityCrossThreadLogger]==> Event_MatchCreated {"matchId":"m-1"}"#,
    ))
    .await
    .expect("send");
    tx.send(record(
        80,
        r#"[UnityCrossThreadLogger]==> Event_MatchCompleted {"matchId":"m-1","result":"win"}"#,
    ))
    .await
    .expect("send");
    drop(tx);

    let first = timeout(WAIT, events.recv()).await.expect("first").expect("event");
    let second = timeout(WAIT, events.recv()).await.expect("second").expect("event");
    assert_eq!(first.kind.name(), "match_start");
    assert_eq!(first.raw_offset, 0);
    assert_eq!(second.kind.name(), "match_end");
    assert_eq!(second.raw_offset, 80);

    let stats = pipeline.await.expect("pipeline join");
    assert_eq!(stats.records, 2);
    assert_eq!(stats.events, 2);
    assert_eq!(stats.parse_failures, 0);
}

#[tokio::test]
async fn discontinuity_marker_precedes_replayed_records() {
    let index = Arc::new(CardIndex::new());
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();
    let (tx, rx) = mpsc::channel(16);

    let pipeline = tokio::spawn(pipeline::run(rx, index, Arc::clone(&bus)));

    tx.send(FollowerItem::Discontinuity {
        previous_offset: 4096,
        stream_len: 80,
    })
    .await
    .expect("send");
    tx.send(record(
        0,
        r#"[UnityCrossThreadLogger]==> Event_MatchCreated {"matchId":"m-1"}"#,
    ))
    .await
    .expect("send");
    drop(tx);

    let first = timeout(WAIT, events.recv()).await.expect("first").expect("event");
    match first.kind {
        EventKind::StreamDiscontinuity(marker) => {
            assert_eq!(marker.previous_offset, 4096);
            assert_eq!(marker.stream_len, 80);
        }
        other => panic!("expected the discontinuity marker first, got {}", other.name()),
    }

    let second = timeout(WAIT, events.recv()).await.expect("second").expect("event");
    assert_eq!(second.kind.name(), "match_start");

    let stats = pipeline.await.expect("pipeline join");
    assert_eq!(stats.discontinuities, 1);
    assert_eq!(stats.events, 1);
}

#[tokio::test]
async fn malformed_records_are_counted_and_skipped() {
    let index = Arc::new(CardIndex::new());
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();
    let (tx, rx) = mpsc::channel(16);

    let pipeline = tokio::spawn(pipeline::run(rx, index, Arc::clone(&bus)));

    // Relevant channel, missing required field.
    tx.send(record(
        0,
        r#"[UnityCrossThreadLogger]==> Event_MatchCreated {"nope":true}"#,
    ))
    .await
    .expect("send");
    // The stream continues past it.
    tx.send(record(
        70,
        r#"[UnityCrossThreadLogger]==> Event_MatchCreated {"matchId":"m-2"}"#,
    ))
    .await
    .expect("send");
    drop(tx);

    let event = timeout(WAIT, events.recv()).await.expect("event").expect("event");
    assert_eq!(event.raw_offset, 70);

    let stats = pipeline.await.expect("pipeline join");
    assert_eq!(stats.records, 2);
    assert_eq!(stats.parse_failures, 1);
    assert_eq!(stats.events, 1);
}

#[tokio::test]
async fn unresolved_references_are_counted_not_fatal() {
    let index = Arc::new(CardIndex::new());
    index
        .ingest(
            "card_list",
            vec![SourceRow::CardList(CardListRow {
                id: 1001,
                name: "Lightning Bolt".to_string(),
                expansion: "m10".to_string(),
                rarity: None,
                color_identity: None,
                extra: Default::default(),
            })],
        )
        .expect("ingest");

    let bus = Arc::new(EventBus::default());
    let (tx, rx) = mpsc::channel(16);
    let pipeline = tokio::spawn(pipeline::run(rx, index, Arc::clone(&bus)));

    // One known card, one unknown: catch-up has not ingested everything.
    tx.send(record(
        0,
        r#"[UnityCrossThreadLogger]==> Event_SetDeck {"mainDeck":[{"cardId":1001,"quantity":4},{"cardId":9999,"quantity":2}]}"#,
    ))
    .await
    .expect("send");
    drop(tx);

    let stats = pipeline.await.expect("pipeline join");
    assert_eq!(stats.events, 1);
    assert_eq!(stats.unresolved_cards, 1);
}

//! Integration tests for deck storage: creation, entry ownership,
//! cascade delete, uniqueness.

mod common;

use arenatrack_core::deck::{DeckSource, Section};
use arenatrack_db::models::{CreateDeck, NewDeckEntry};
use arenatrack_db::repositories::DeckRepo;

fn entry(reference: &str, section: Section, quantity: u32) -> NewDeckEntry {
    NewDeckEntry {
        card_reference: reference.to_string(),
        section,
        quantity,
    }
}

fn mono_blue() -> (CreateDeck, Vec<NewDeckEntry>) {
    (
        CreateDeck {
            name: "Mono Blue".to_string(),
            source: DeckSource::Import,
            format: Some("standard".to_string()),
            url: None,
        },
        vec![
            entry("Island", Section::Main, 20),
            entry("Opt", Section::Main, 4),
            entry("Negate", Section::Sideboard, 2),
        ],
    )
}

#[tokio::test]
async fn create_stores_deck_with_entries() {
    let pool = common::memory_pool().await;
    let (input, entries) = mono_blue();

    let deck = DeckRepo::create(&pool, &input, &entries).await.expect("create");
    assert_eq!(deck.name, "Mono Blue");
    assert_eq!(deck.source, "import");

    let stored = DeckRepo::entries(&pool, deck.id).await.expect("entries");
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0].card_reference, "Island");
    assert_eq!(stored[0].section, "main");
    assert_eq!(stored[2].section, "sideboard");
}

#[tokio::test]
async fn delete_cascades_to_entries() {
    let pool = common::memory_pool().await;
    let (input, entries) = mono_blue();
    let deck = DeckRepo::create(&pool, &input, &entries).await.expect("create");

    assert!(DeckRepo::delete(&pool, deck.id).await.expect("delete"));
    assert!(DeckRepo::find_by_id(&pool, deck.id)
        .await
        .expect("find")
        .is_none());
    assert!(DeckRepo::entries(&pool, deck.id)
        .await
        .expect("entries")
        .is_empty());

    // Deleting again reports nothing removed.
    assert!(!DeckRepo::delete(&pool, deck.id).await.expect("delete again"));
}

#[tokio::test]
async fn duplicate_entry_per_section_is_rejected() {
    let pool = common::memory_pool().await;
    let (input, _) = mono_blue();
    let dupes = vec![
        entry("Island", Section::Main, 4),
        entry("Island", Section::Main, 3),
    ];

    let result = DeckRepo::create(&pool, &input, &dupes).await;
    assert!(result.is_err(), "one entry per (deck, reference, section)");

    // The failed transaction left nothing behind.
    assert!(DeckRepo::list(&pool).await.expect("list").is_empty());
}

#[tokio::test]
async fn same_reference_may_appear_in_both_sections() {
    let pool = common::memory_pool().await;
    let (input, _) = mono_blue();
    let split = vec![
        entry("Negate", Section::Main, 2),
        entry("Negate", Section::Sideboard, 2),
    ];

    let deck = DeckRepo::create(&pool, &input, &split).await.expect("create");
    assert_eq!(DeckRepo::entries(&pool, deck.id).await.expect("entries").len(), 2);
}

#[tokio::test]
async fn zero_quantity_violates_the_schema() {
    let pool = common::memory_pool().await;
    let (input, _) = mono_blue();
    let bad = vec![entry("Island", Section::Main, 0)];
    assert!(DeckRepo::create(&pool, &input, &bad).await.is_err());
}

#[tokio::test]
async fn replace_entries_swaps_the_set() {
    let pool = common::memory_pool().await;
    let (input, entries) = mono_blue();
    let deck = DeckRepo::create(&pool, &input, &entries).await.expect("create");

    let next = vec![entry("Mountain", Section::Main, 20)];
    DeckRepo::replace_entries(&pool, deck.id, &next)
        .await
        .expect("replace");

    let stored = DeckRepo::entries(&pool, deck.id).await.expect("entries");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].card_reference, "Mountain");
}

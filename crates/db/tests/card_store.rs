//! Integration tests for the card identity store.

mod common;

use arenatrack_core::cards::CardIdentity;
use arenatrack_db::repositories::CardRepo;

fn identity(canonical_id: i64, name: &str, arena_id: Option<i64>) -> CardIdentity {
    CardIdentity {
        canonical_id,
        name: name.to_string(),
        set_code: "m10".to_string(),
        arena_id,
        external_id: None,
        mana_value: Some(1.0),
        type_line: Some("Instant".to_string()),
        colors: vec!["R".to_string()],
        rarity: Some("common".to_string()),
        produced_mana: Vec::new(),
    }
}

#[tokio::test]
async fn upsert_then_load_round_trips() {
    let pool = common::memory_pool().await;

    let cards = vec![
        identity(1, "Lightning Bolt", Some(1001)),
        identity(2, "Shock", Some(2002)),
    ];
    CardRepo::upsert_batch(&pool, &cards).await.expect("upsert");

    let loaded = CardRepo::load_all(&pool).await.expect("load");
    assert_eq!(loaded.len(), 2);
    let back: Vec<CardIdentity> = loaded.into_iter().map(Into::into).collect();
    assert_eq!(back, cards);
}

#[tokio::test]
async fn upsert_is_idempotent_and_refining() {
    let pool = common::memory_pool().await;

    let first = identity(1, "Lightning Bolt", None);
    CardRepo::upsert_batch(&pool, &[first]).await.expect("first upsert");

    // The same identity, refined with an arena id, replaces the row.
    let refined = identity(1, "Lightning Bolt", Some(1001));
    CardRepo::upsert_batch(&pool, std::slice::from_ref(&refined))
        .await
        .expect("second upsert");

    assert_eq!(CardRepo::count(&pool).await.expect("count"), 1);
    let loaded = CardRepo::load_all(&pool).await.expect("load");
    assert_eq!(CardIdentity::from(loaded[0].clone()), refined);
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let pool = common::memory_pool().await;
    CardRepo::upsert_batch(&pool, &[]).await.expect("empty upsert");
    assert_eq!(CardRepo::count(&pool).await.expect("count"), 0);
}

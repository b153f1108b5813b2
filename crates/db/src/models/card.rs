//! Canonical card identity rows.

use arenatrack_core::cards::{CanonicalId, CardIdentity};
use sqlx::FromRow;

/// A row from the `cards` table.
///
/// Symbol lists (`colors`, `produced_mana`) are stored comma-joined;
/// conversion to and from [`CardIdentity`] handles the packing.
#[derive(Debug, Clone, FromRow)]
pub struct CardRecord {
    pub canonical_id: CanonicalId,
    pub name: String,
    pub set_code: String,
    pub arena_id: Option<i64>,
    pub external_id: Option<String>,
    pub mana_value: Option<f64>,
    pub type_line: Option<String>,
    pub colors: String,
    pub rarity: Option<String>,
    pub produced_mana: String,
}

impl From<CardRecord> for CardIdentity {
    fn from(record: CardRecord) -> Self {
        Self {
            canonical_id: record.canonical_id,
            name: record.name,
            set_code: record.set_code,
            arena_id: record.arena_id,
            external_id: record.external_id,
            mana_value: record.mana_value,
            type_line: record.type_line,
            colors: split_symbols(&record.colors),
            rarity: record.rarity,
            produced_mana: split_symbols(&record.produced_mana),
        }
    }
}

impl From<&CardIdentity> for CardRecord {
    fn from(card: &CardIdentity) -> Self {
        Self {
            canonical_id: card.canonical_id,
            name: card.name.clone(),
            set_code: card.set_code.clone(),
            arena_id: card.arena_id,
            external_id: card.external_id.clone(),
            mana_value: card.mana_value,
            type_line: card.type_line.clone(),
            colors: card.colors.join(","),
            rarity: card.rarity.clone(),
            produced_mana: card.produced_mana.join(","),
        }
    }
}

fn split_symbols(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

//! Deck and deck-entry rows.

use arenatrack_core::deck::{DeckSource, Section};
use arenatrack_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `decks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeckRow {
    pub id: DbId,
    pub name: String,
    pub source: String,
    pub format: Option<String>,
    pub url: Option<String>,
    pub added_at: Timestamp,
}

/// A row from the `deck_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeckEntryRow {
    pub id: DbId,
    pub deck_id: DbId,
    pub card_reference: String,
    pub section: String,
    pub quantity: i64,
}

/// Input for creating a deck. Identity fields are immutable afterwards.
#[derive(Debug, Clone)]
pub struct CreateDeck {
    pub name: String,
    pub source: DeckSource,
    pub format: Option<String>,
    pub url: Option<String>,
}

/// One entry of a deck being created or replaced.
#[derive(Debug, Clone)]
pub struct NewDeckEntry {
    pub card_reference: String,
    pub section: Section,
    pub quantity: u32,
}

//! Repository for the `decks` and `deck_entries` tables.

use arenatrack_core::types::{DbId, Timestamp};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{CreateDeck, DeckEntryRow, DeckRow, NewDeckEntry};

const DECK_COLUMNS: &str = "id, name, source, format, url, added_at";
const ENTRY_COLUMNS: &str = "id, deck_id, card_reference, section, quantity";

/// Provides CRUD for decks plus their owned entries.
pub struct DeckRepo;

impl DeckRepo {
    /// Insert a deck with its entries in one transaction, returning the
    /// created row.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateDeck,
        entries: &[NewDeckEntry],
    ) -> Result<DeckRow, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let added_at: Timestamp = Utc::now();

        let query = format!(
            "INSERT INTO decks (name, source, format, url, added_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {DECK_COLUMNS}"
        );
        let deck = sqlx::query_as::<_, DeckRow>(&query)
            .bind(&input.name)
            .bind(input.source.as_str())
            .bind(&input.format)
            .bind(&input.url)
            .bind(added_at)
            .fetch_one(&mut *tx)
            .await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO deck_entries (deck_id, card_reference, section, quantity)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(deck.id)
            .bind(&entry.card_reference)
            .bind(entry.section.as_str())
            .bind(entry.quantity as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(deck)
    }

    /// Replace a deck's entry set in one transaction. The deck's identity
    /// fields are untouched.
    pub async fn replace_entries(
        pool: &SqlitePool,
        deck_id: DbId,
        entries: &[NewDeckEntry],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM deck_entries WHERE deck_id = ?")
            .bind(deck_id)
            .execute(&mut *tx)
            .await?;
        for entry in entries {
            sqlx::query(
                "INSERT INTO deck_entries (deck_id, card_reference, section, quantity)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(deck_id)
            .bind(&entry.card_reference)
            .bind(entry.section.as_str())
            .bind(entry.quantity as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    /// Find a deck by id.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<DeckRow>, sqlx::Error> {
        let query = format!("SELECT {DECK_COLUMNS} FROM decks WHERE id = ?");
        sqlx::query_as::<_, DeckRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Entries of one deck, in insertion order.
    pub async fn entries(
        pool: &SqlitePool,
        deck_id: DbId,
    ) -> Result<Vec<DeckEntryRow>, sqlx::Error> {
        let query = format!("SELECT {ENTRY_COLUMNS} FROM deck_entries WHERE deck_id = ? ORDER BY id");
        sqlx::query_as::<_, DeckEntryRow>(&query)
            .bind(deck_id)
            .fetch_all(pool)
            .await
    }

    /// All decks, most recently added first.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<DeckRow>, sqlx::Error> {
        let query = format!("SELECT {DECK_COLUMNS} FROM decks ORDER BY added_at DESC, id DESC");
        sqlx::query_as::<_, DeckRow>(&query).fetch_all(pool).await
    }

    /// Delete a deck; its entries cascade. Returns `true` if a row went.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM decks WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

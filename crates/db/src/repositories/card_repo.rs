//! Repository for the `cards` table.

use arenatrack_core::cards::CardIdentity;
use sqlx::SqlitePool;

use crate::models::CardRecord;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "canonical_id, name, set_code, arena_id, external_id, mana_value, \
                       type_line, colors, rarity, produced_mana";

/// Persists canonical card identities.
pub struct CardRepo;

impl CardRepo {
    /// Load every stored identity, ordered by canonical id. Seeds the
    /// in-memory index at startup.
    pub async fn load_all(pool: &SqlitePool) -> Result<Vec<CardRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cards ORDER BY canonical_id");
        sqlx::query_as::<_, CardRecord>(&query).fetch_all(pool).await
    }

    /// Write a committed ingest batch in one transaction.
    ///
    /// Rows are upserted by canonical id so refined identities replace
    /// their previous attributes; the batch is all-or-nothing, mirroring
    /// the in-memory commit it persists.
    pub async fn upsert_batch(
        pool: &SqlitePool,
        cards: &[CardIdentity],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        for card in cards {
            let record = CardRecord::from(card);
            sqlx::query(
                "INSERT INTO cards (canonical_id, name, set_code, arena_id, external_id, \
                                    mana_value, type_line, colors, rarity, produced_mana)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(canonical_id) DO UPDATE SET
                     name = excluded.name,
                     set_code = excluded.set_code,
                     arena_id = excluded.arena_id,
                     external_id = excluded.external_id,
                     mana_value = excluded.mana_value,
                     type_line = excluded.type_line,
                     colors = excluded.colors,
                     rarity = excluded.rarity,
                     produced_mana = excluded.produced_mana",
            )
            .bind(record.canonical_id)
            .bind(&record.name)
            .bind(&record.set_code)
            .bind(record.arena_id)
            .bind(&record.external_id)
            .bind(record.mana_value)
            .bind(&record.type_line)
            .bind(&record.colors)
            .bind(&record.rarity)
            .bind(&record.produced_mana)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    /// Number of stored identities.
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM cards")
            .fetch_one(pool)
            .await
    }
}

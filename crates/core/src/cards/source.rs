//! Per-source row adapters.
//!
//! Each external card dataset has its own column set, and those columns
//! drift over time (`produced_mana` was added to the bulk export well
//! after the rest). Rows are modeled as a tagged union and consumed only
//! through a narrow adapter producing the common [`CardRow`]; the index
//! itself never branches on source identity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Source tag for the bulk "all printings" export.
pub const SOURCE_ALL_PRINTINGS: &str = "all_printings";

/// Source tag for the community card-list export.
pub const SOURCE_CARD_LIST: &str = "card_list";

/// One row from any supported card dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceRow {
    AllPrintings(AllPrintingsRow),
    CardList(CardListRow),
}

/// Row shape of the bulk "all printings" export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllPrintingsRow {
    /// Source-specific string id.
    pub id: String,
    pub name: String,
    /// Set code, e.g. `"m10"`.
    pub set: String,
    #[serde(default)]
    pub arena_id: Option<i64>,
    #[serde(default)]
    pub cmc: Option<f64>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    /// Absent in older dumps.
    #[serde(default)]
    pub produced_mana: Vec<String>,
    /// Columns this adapter does not consume.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Row shape of the community card-list export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardListRow {
    /// This export's `id` column is the arena id.
    pub id: i64,
    pub name: String,
    pub expansion: String,
    #[serde(default)]
    pub rarity: Option<String>,
    /// Concatenated color symbols, e.g. `"WU"`.
    #[serde(default)]
    pub color_identity: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The common internal shape every adapter produces.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRow {
    pub name: String,
    pub set_code: String,
    pub arena_id: Option<i64>,
    pub external_id: Option<String>,
    pub mana_value: Option<f64>,
    pub type_line: Option<String>,
    pub colors: Vec<String>,
    pub rarity: Option<String>,
    pub produced_mana: Vec<String>,
}

impl SourceRow {
    /// The tag used in logs and reports for this row's dataset.
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::AllPrintings(_) => SOURCE_ALL_PRINTINGS,
            Self::CardList(_) => SOURCE_CARD_LIST,
        }
    }

    /// Adapt this row to the common shape.
    ///
    /// Returns `None` when the row lacks the minimum the index requires
    /// (a display name and a set code); such rows are counted as skipped
    /// by the ingest, never guessed at.
    pub fn into_card_row(self) -> Option<CardRow> {
        match self {
            Self::AllPrintings(row) => {
                if row.name.trim().is_empty() || row.set.trim().is_empty() {
                    return None;
                }
                Some(CardRow {
                    name: row.name,
                    set_code: row.set,
                    arena_id: row.arena_id,
                    external_id: Some(row.id),
                    mana_value: row.cmc,
                    type_line: row.type_line,
                    colors: row.colors,
                    rarity: row.rarity,
                    produced_mana: row.produced_mana,
                })
            }
            Self::CardList(row) => {
                if row.name.trim().is_empty() || row.expansion.trim().is_empty() {
                    return None;
                }
                let colors = row
                    .color_identity
                    .map(|ci| {
                        ci.chars()
                            .filter(|c| c.is_ascii_alphabetic())
                            .map(|c| c.to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                Some(CardRow {
                    name: row.name,
                    set_code: row.expansion,
                    arena_id: Some(row.id),
                    external_id: None,
                    mana_value: None,
                    type_line: None,
                    colors,
                    rarity: row.rarity,
                    produced_mana: Vec::new(),
                })
            }
        }
    }
}

//! Card identity model.
//!
//! A [`CardIdentity`] is the single canonical record for one physical card
//! printing, no matter which external source referenced it. References
//! arrive as [`CardRef`]s -- an arena-internal integer id, a third-party
//! string id, or a `(name, set)` pair -- and are resolved through the
//! [`CardIndex`](index::CardIndex).

pub mod index;
pub mod source;
pub mod typeline;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Stable internal key for one canonical card identity.
pub type CanonicalId = DbId;

/// Canonical card record unifying identities across sources.
///
/// Within one canonical identity, every known source id maps to exactly
/// this record; a given source id maps to at most one canonical identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardIdentity {
    pub canonical_id: CanonicalId,
    pub name: String,
    /// Set / expansion code, lowercase (e.g. `"m10"`).
    pub set_code: String,
    /// Arena-internal integer id, once any source has revealed it.
    pub arena_id: Option<i64>,
    /// Third-party string id from the bulk "all printings" export.
    pub external_id: Option<String>,
    pub mana_value: Option<f64>,
    pub type_line: Option<String>,
    /// Color symbols, e.g. `["W", "U"]`.
    pub colors: Vec<String>,
    pub rarity: Option<String>,
    /// Colors of mana this card can produce (lands, mana rocks).
    pub produced_mana: Vec<String>,
}

/// A reference to a card as it appears in events or deck text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardRef {
    /// Arena-internal integer id.
    Arena(i64),
    /// Third-party string id.
    External(String),
    /// Display name plus set code.
    NameSet { name: String, set_code: String },
}

impl std::fmt::Display for CardRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arena(id) => write!(f, "arena:{id}"),
            Self::External(id) => write!(f, "external:{id}"),
            Self::NameSet { name, set_code } => write!(f, "{name} ({set_code})"),
        }
    }
}

/// A card reference the index does not (yet) know.
///
/// Unresolved references are expected during initial catch-up, so this is
/// a typed miss rather than an abort.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("card reference not found: {reference}")]
pub struct NotFound {
    pub reference: CardRef,
}

/// Errors raised while merging a batch of source rows into the index.
///
/// Any error aborts the whole batch; no partial state is ever applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    /// Sources disagree about an identity-bearing id for the same card.
    /// Surfaced to the caller, never merged arbitrarily.
    #[error(
        "ambiguous identity for '{name}' ({set_code}): \
         {field} {existing} conflicts with {incoming} from source '{source_name}'"
    )]
    ResolutionAmbiguity {
        name: String,
        set_code: String,
        field: &'static str,
        existing: String,
        incoming: String,
        source_name: String,
    },
}

/// Normalize a card name for `(name, set)` lookups.
///
/// Case-folded with common Latin diacritics stripped, so minor source
/// spelling differences ("Lorien" vs "Lórien") still match exactly.
/// No fuzzy matching happens anywhere: two names either normalize to the
/// same string or they do not match.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        match fold_diacritic(c) {
            Some(folded) => out.push_str(folded),
            None => out.extend(c.to_lowercase()),
        }
    }
    out
}

/// Normalize a set / expansion code for lookups.
pub fn normalize_set(set_code: &str) -> String {
    set_code.trim().to_ascii_lowercase()
}

/// Fold the Latin diacritics that actually occur in card names.
fn fold_diacritic(c: char) -> Option<&'static str> {
    Some(match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => "a",
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => "e",
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => "i",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => "o",
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => "u",
        'ý' | 'Ý' => "y",
        'ñ' | 'Ñ' => "n",
        'ç' | 'Ç' => "c",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        'ß' => "ss",
        _ => return None,
    })
}

//! Rank stored decks against the cards observed in play.

use std::collections::HashSet;

use crate::cards::normalize_name;
use crate::types::DbId;

/// Card names of one stored deck, as loaded from storage.
#[derive(Debug, Clone)]
pub struct DeckCards {
    pub deck_id: DbId,
    pub card_names: Vec<String>,
}

/// Match strength of one stored deck against the observed cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckMatch {
    pub deck_id: DbId,
    /// Distinct observed names present in the deck.
    pub matched: usize,
    /// Distinct names in the deck.
    pub total: usize,
}

/// Rank decks by how many distinct observed card names they contain.
///
/// Ordered by match count descending, then deck id ascending for a
/// deterministic result; decks with zero overlap are omitted. Names are
/// compared normalized, the same way the identity index matches them.
pub fn rank_decks(observed: &[String], decks: &[DeckCards]) -> Vec<DeckMatch> {
    let observed: HashSet<String> = observed.iter().map(|name| normalize_name(name)).collect();

    let mut matches = Vec::new();
    for deck in decks {
        let names: HashSet<String> = deck
            .card_names
            .iter()
            .map(|name| normalize_name(name))
            .collect();
        let matched = names.intersection(&observed).count();
        if matched > 0 {
            matches.push(DeckMatch {
                deck_id: deck.deck_id,
                matched,
                total: names.len(),
            });
        }
    }

    matches.sort_by(|a, b| b.matched.cmp(&a.matched).then(a.deck_id.cmp(&b.deck_id)));
    matches
}

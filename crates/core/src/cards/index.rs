//! Three-keyed in-memory card identity index.
//!
//! [`CardIndex`] maintains lookup tables keyed by arena id, external id,
//! and normalized `(name, set)`. Batches of source rows are merged with
//! [`CardIndex::ingest`]: the whole batch is validated against a staged
//! overlay first and applied only when no row conflicts, so readers never
//! observe a partial ingest. Reads vastly outnumber writes; the interior
//! `RwLock` admits any number of concurrent readers.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::cards::source::{CardRow, SourceRow};
use crate::cards::{
    normalize_name, normalize_set, CanonicalId, CardIdentity, CardRef, IngestError, NotFound,
};

/// Outcome of one [`CardIndex::ingest`] batch.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// New canonical identities created by this batch.
    pub created: usize,
    /// Existing identities that gained an id or a blank attribute.
    pub refined: usize,
    /// Rows that matched an identity and changed nothing.
    pub unchanged: usize,
    /// Rows missing the minimum fields (name + set); reported, not guessed.
    pub skipped: usize,
    /// Every identity this batch created or refined, for persistence.
    pub committed: Vec<CardIdentity>,
}

/// In-memory identity index shared across the application.
#[derive(Default)]
pub struct CardIndex {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    cards: HashMap<CanonicalId, CardIdentity>,
    by_arena: HashMap<i64, CanonicalId>,
    by_external: HashMap<String, CanonicalId>,
    by_name_set: HashMap<(String, String), CanonicalId>,
    next_id: CanonicalId,
}

impl CardIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of canonical identities currently indexed.
    pub fn len(&self) -> usize {
        self.read().cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a reference to its canonical identity.
    ///
    /// An exact normalized `(name, set)` match is the only name-based
    /// lookup; no fuzzy matching is performed. Unknown references come
    /// back as a typed [`NotFound`] miss.
    pub fn resolve(&self, reference: &CardRef) -> Result<CardIdentity, NotFound> {
        let inner = self.read();
        let id = match reference {
            CardRef::Arena(arena_id) => inner.by_arena.get(arena_id),
            CardRef::External(external_id) => inner.by_external.get(external_id),
            CardRef::NameSet { name, set_code } => inner
                .by_name_set
                .get(&(normalize_name(name), normalize_set(set_code))),
        };
        id.and_then(|id| inner.cards.get(id))
            .cloned()
            .ok_or_else(|| NotFound {
                reference: reference.clone(),
            })
    }

    /// Rebuild the index from previously persisted identities.
    ///
    /// Used once at startup; replaces the current contents.
    pub fn seed(&self, cards: Vec<CardIdentity>) {
        let mut inner = self.write();
        *inner = Inner::default();
        for card in cards {
            inner.next_id = inner.next_id.max(card.canonical_id);
            inner.link(&card);
            inner.cards.insert(card.canonical_id, card);
        }
    }

    /// Merge a batch of source rows into the index.
    ///
    /// Idempotent: re-ingesting identical rows reports every row as
    /// unchanged and alters nothing. All-or-nothing: a single conflicting
    /// row aborts the batch before anything becomes visible.
    pub fn ingest(&self, source: &str, rows: Vec<SourceRow>) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport::default();
        let mut adapted = Vec::with_capacity(rows.len());
        for row in rows {
            match row.into_card_row() {
                Some(card_row) => adapted.push(card_row),
                None => report.skipped += 1,
            }
        }

        let mut inner = self.write();
        let mut stage = Stage::new(inner.next_id);
        for row in &adapted {
            stage.merge(&inner, source, row)?;
        }

        report.created = stage.created;
        report.refined = stage.refined;
        report.unchanged = stage.unchanged;
        report.committed = stage.committed();
        inner.apply(stage);

        tracing::debug!(
            source,
            created = report.created,
            refined = report.refined,
            unchanged = report.unchanged,
            skipped = report.skipped,
            "Ingest batch committed"
        );
        Ok(report)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    /// Register a card under every id it carries.
    fn link(&mut self, card: &CardIdentity) {
        if let Some(arena_id) = card.arena_id {
            self.by_arena.insert(arena_id, card.canonical_id);
        }
        if let Some(external_id) = &card.external_id {
            self.by_external.insert(external_id.clone(), card.canonical_id);
        }
        self.by_name_set.insert(
            (normalize_name(&card.name), normalize_set(&card.set_code)),
            card.canonical_id,
        );
    }

    fn apply(&mut self, stage: Stage) {
        self.by_arena.extend(stage.by_arena);
        self.by_external.extend(stage.by_external);
        self.by_name_set.extend(stage.by_name_set);
        self.cards.extend(stage.cards);
        self.next_id = stage.next_id;
    }
}

/// Uncommitted overlay for one ingest batch.
///
/// Lookups consult the overlay before the base index so rows within one
/// batch see each other; nothing touches the base until the whole batch
/// has merged cleanly.
struct Stage {
    cards: HashMap<CanonicalId, CardIdentity>,
    by_arena: HashMap<i64, CanonicalId>,
    by_external: HashMap<String, CanonicalId>,
    by_name_set: HashMap<(String, String), CanonicalId>,
    next_id: CanonicalId,
    created: usize,
    refined: usize,
    unchanged: usize,
    touched: Vec<CanonicalId>,
}

impl Stage {
    fn new(next_id: CanonicalId) -> Self {
        Self {
            cards: HashMap::new(),
            by_arena: HashMap::new(),
            by_external: HashMap::new(),
            by_name_set: HashMap::new(),
            next_id,
            created: 0,
            refined: 0,
            unchanged: 0,
            touched: Vec::new(),
        }
    }

    fn merge(&mut self, base: &Inner, source: &str, row: &CardRow) -> Result<(), IngestError> {
        let key = (normalize_name(&row.name), normalize_set(&row.set_code));

        let by_arena = row
            .arena_id
            .and_then(|id| self.lookup(&self.by_arena, &base.by_arena, &id));
        let by_external = row
            .external_id
            .as_ref()
            .and_then(|id| self.lookup(&self.by_external, &base.by_external, id));
        let by_name = self.lookup(&self.by_name_set, &base.by_name_set, &key);

        // The row's ids must all agree on one canonical identity.
        let mut target: Option<CanonicalId> = None;
        for candidate in [by_arena, by_external, by_name].into_iter().flatten() {
            match target {
                None => target = Some(candidate),
                Some(existing) if existing != candidate => {
                    return Err(IngestError::ResolutionAmbiguity {
                        name: row.name.clone(),
                        set_code: row.set_code.clone(),
                        field: "identity",
                        existing: format!("#{existing}"),
                        incoming: format!("#{candidate}"),
                        source_name: source.to_string(),
                    });
                }
                Some(_) => {}
            }
        }

        match target {
            None => self.create(row, key),
            Some(id) => self.refine(base, source, id, row, key)?,
        }
        Ok(())
    }

    fn create(&mut self, row: &CardRow, key: (String, String)) {
        self.next_id += 1;
        let card = CardIdentity {
            canonical_id: self.next_id,
            name: row.name.clone(),
            set_code: row.set_code.clone(),
            arena_id: row.arena_id,
            external_id: row.external_id.clone(),
            mana_value: row.mana_value,
            type_line: row.type_line.clone(),
            colors: row.colors.clone(),
            rarity: row.rarity.clone(),
            produced_mana: row.produced_mana.clone(),
        };
        if let Some(arena_id) = card.arena_id {
            self.by_arena.insert(arena_id, card.canonical_id);
        }
        if let Some(external_id) = &card.external_id {
            self.by_external.insert(external_id.clone(), card.canonical_id);
        }
        self.by_name_set.insert(key, card.canonical_id);
        self.touched.push(card.canonical_id);
        self.cards.insert(card.canonical_id, card);
        self.created += 1;
    }

    /// Merge a row into an existing identity: fill blank attributes and
    /// register newly revealed ids. Populated fields are kept as-is;
    /// only identity-bearing ids in true conflict abort the batch.
    fn refine(
        &mut self,
        base: &Inner,
        source: &str,
        id: CanonicalId,
        row: &CardRow,
        key: (String, String),
    ) -> Result<(), IngestError> {
        let card = match self.cards.get(&id) {
            Some(staged) => staged.clone(),
            None => match base.cards.get(&id) {
                Some(existing) => existing.clone(),
                // Lookup tables only ever point at stored cards.
                None => return Ok(()),
            },
        };

        if let (Some(existing), Some(incoming)) = (card.arena_id, row.arena_id) {
            if existing != incoming {
                return Err(IngestError::ResolutionAmbiguity {
                    name: card.name.clone(),
                    set_code: card.set_code.clone(),
                    field: "arena_id",
                    existing: existing.to_string(),
                    incoming: incoming.to_string(),
                    source_name: source.to_string(),
                });
            }
        }
        if let (Some(existing), Some(incoming)) = (&card.external_id, &row.external_id) {
            if existing != incoming {
                return Err(IngestError::ResolutionAmbiguity {
                    name: card.name.clone(),
                    set_code: card.set_code.clone(),
                    field: "external_id",
                    existing: existing.clone(),
                    incoming: incoming.clone(),
                    source_name: source.to_string(),
                });
            }
        }

        let mut card = card;
        let mut changed = false;

        if card.arena_id.is_none() {
            if let Some(arena_id) = row.arena_id {
                card.arena_id = Some(arena_id);
                self.by_arena.insert(arena_id, id);
                changed = true;
            }
        }
        if card.external_id.is_none() {
            if let Some(external_id) = &row.external_id {
                card.external_id = Some(external_id.clone());
                self.by_external.insert(external_id.clone(), id);
                changed = true;
            }
        }
        if card.mana_value.is_none() && row.mana_value.is_some() {
            card.mana_value = row.mana_value;
            changed = true;
        }
        if card.type_line.is_none() && row.type_line.is_some() {
            card.type_line = row.type_line.clone();
            changed = true;
        }
        if card.rarity.is_none() && row.rarity.is_some() {
            card.rarity = row.rarity.clone();
            changed = true;
        }
        if card.colors.is_empty() && !row.colors.is_empty() {
            card.colors = row.colors.clone();
            changed = true;
        }
        if card.produced_mana.is_empty() && !row.produced_mana.is_empty() {
            card.produced_mana = row.produced_mana.clone();
            changed = true;
        }

        // A row can reach a card through an id while carrying a spelling
        // the index has not seen; register the additional name key.
        let known_key = self
            .lookup(&self.by_name_set, &base.by_name_set, &key)
            .is_some();
        if !known_key {
            self.by_name_set.insert(key, id);
            changed = true;
        }

        if changed {
            self.touched.push(id);
            self.cards.insert(id, card);
            self.refined += 1;
        } else {
            self.unchanged += 1;
        }
        Ok(())
    }

    fn lookup<K: std::hash::Hash + Eq>(
        &self,
        staged: &HashMap<K, CanonicalId>,
        base: &HashMap<K, CanonicalId>,
        key: &K,
    ) -> Option<CanonicalId> {
        staged.get(key).or_else(|| base.get(key)).copied()
    }

    /// Created or refined identities in deterministic order.
    fn committed(&self) -> Vec<CardIdentity> {
        let mut ids = self.touched.clone();
        ids.sort_unstable();
        ids.dedup();
        ids.iter()
            .filter_map(|id| self.cards.get(id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::source::{AllPrintingsRow, CardListRow};
    use assert_matches::assert_matches;

    fn bulk_row(id: &str, name: &str, set: &str, arena_id: Option<i64>) -> SourceRow {
        SourceRow::AllPrintings(AllPrintingsRow {
            id: id.to_string(),
            name: name.to_string(),
            set: set.to_string(),
            arena_id,
            cmc: None,
            type_line: None,
            colors: Vec::new(),
            rarity: None,
            produced_mana: Vec::new(),
            extra: Default::default(),
        })
    }

    fn list_row(id: i64, name: &str, expansion: &str) -> SourceRow {
        SourceRow::CardList(CardListRow {
            id,
            name: name.to_string(),
            expansion: expansion.to_string(),
            rarity: None,
            color_identity: None,
            extra: Default::default(),
        })
    }

    /// Two sources each reveal one id for the same name+set; all three
    /// reference styles resolve to the same canonical identity.
    #[test]
    fn identities_unify_across_sources() {
        let index = CardIndex::new();
        index
            .ingest("a", vec![list_row(1001, "Bolt", "M10")])
            .expect("batch should commit");
        index
            .ingest("b", vec![bulk_row("e55", "Bolt", "M10", None)])
            .expect("batch should commit");

        let by_arena = index.resolve(&CardRef::Arena(1001)).expect("arena id known");
        let by_external = index
            .resolve(&CardRef::External("e55".into()))
            .expect("external id known");
        let by_name = index
            .resolve(&CardRef::NameSet {
                name: "Bolt".into(),
                set_code: "M10".into(),
            })
            .expect("name+set known");

        assert_eq!(by_arena.canonical_id, by_external.canonical_id);
        assert_eq!(by_arena.canonical_id, by_name.canonical_id);
        assert_eq!(by_arena.arena_id, Some(1001));
        assert_eq!(by_arena.external_id.as_deref(), Some("e55"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn conflicting_arena_ids_raise_ambiguity() {
        let index = CardIndex::new();
        index
            .ingest("a", vec![list_row(2002, "Shock", "M10")])
            .expect("batch should commit");

        let err = index
            .ingest("b", vec![list_row(2003, "Shock", "M10")])
            .expect_err("conflicting arena id must not merge");
        assert_matches!(
            err,
            IngestError::ResolutionAmbiguity { field: "arena_id", .. }
        );

        // The original mapping is untouched.
        assert_eq!(
            index
                .resolve(&CardRef::Arena(2002))
                .expect("original id still resolves")
                .name,
            "Shock"
        );
        assert!(index.resolve(&CardRef::Arena(2003)).is_err());
    }

    #[test]
    fn ingest_is_idempotent() {
        let index = CardIndex::new();
        let rows = vec![
            bulk_row("e1", "Island", "m10", Some(1)),
            bulk_row("e2", "Mountain", "m10", Some(2)),
        ];
        let first = index.ingest("bulk", rows.clone()).expect("first ingest");
        assert_eq!(first.created, 2);

        let second = index.ingest("bulk", rows).expect("second ingest");
        assert_eq!(second.created, 0);
        assert_eq!(second.refined, 0);
        assert_eq!(second.unchanged, 2);
        assert!(second.committed.is_empty());
        assert_eq!(index.len(), 2);
    }

    /// A conflicting row aborts the whole batch: the valid rows that came
    /// before it must not become visible.
    #[test]
    fn failed_batch_applies_nothing() {
        let index = CardIndex::new();
        index
            .ingest("a", vec![list_row(10, "Opt", "XLN")])
            .expect("seed batch");

        let err = index.ingest(
            "b",
            vec![
                list_row(20, "Duress", "XLN"),
                list_row(11, "Opt", "XLN"), // conflicts with arena id 10
            ],
        );
        assert!(err.is_err());
        assert!(index.resolve(&CardRef::Arena(20)).is_err());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn name_matching_ignores_case_and_diacritics() {
        let index = CardIndex::new();
        index
            .ingest("a", vec![bulk_row("e9", "Lórien Revealed", "LTR", Some(77))])
            .expect("batch should commit");

        let report = index
            .ingest("b", vec![list_row(77, "LORIEN REVEALED", "ltr")])
            .expect("spelling variant should match, not duplicate");
        assert_eq!(report.created, 0);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn later_ingests_refine_blank_attributes_only() {
        let index = CardIndex::new();
        index
            .ingest("a", vec![list_row(5, "Negate", "FDN")])
            .expect("batch should commit");

        let mut full = match bulk_row("e5", "Negate", "FDN", Some(5)) {
            SourceRow::AllPrintings(row) => row,
            SourceRow::CardList(_) => unreachable!(),
        };
        full.cmc = Some(2.0);
        full.type_line = Some("Instant".to_string());
        index
            .ingest("b", vec![SourceRow::AllPrintings(full)])
            .expect("refinement should commit");

        let card = index.resolve(&CardRef::Arena(5)).expect("card resolves");
        assert_eq!(card.mana_value, Some(2.0));
        assert_eq!(card.type_line.as_deref(), Some("Instant"));
        assert_eq!(card.external_id.as_deref(), Some("e5"));

        // A third source with a different mana value does not overwrite.
        let mut drifted = match bulk_row("e5", "Negate", "FDN", Some(5)) {
            SourceRow::AllPrintings(row) => row,
            SourceRow::CardList(_) => unreachable!(),
        };
        drifted.cmc = Some(3.0);
        index
            .ingest("c", vec![SourceRow::AllPrintings(drifted)])
            .expect("non-identity drift is tolerated");
        let card = index.resolve(&CardRef::Arena(5)).expect("card resolves");
        assert_eq!(card.mana_value, Some(2.0));
    }

    #[test]
    fn skipped_rows_are_reported() {
        let index = CardIndex::new();
        let report = index
            .ingest(
                "a",
                vec![list_row(1, "Opt", "XLN"), list_row(2, "", "XLN")],
            )
            .expect("batch should commit");
        assert_eq!(report.created, 1);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn seed_rebuilds_lookup_tables() {
        let index = CardIndex::new();
        index.seed(vec![CardIdentity {
            canonical_id: 42,
            name: "Opt".into(),
            set_code: "xln".into(),
            arena_id: Some(650),
            external_id: Some("opt-1".into()),
            mana_value: Some(1.0),
            type_line: Some("Instant".into()),
            colors: vec!["U".into()],
            rarity: Some("common".into()),
            produced_mana: Vec::new(),
        }]);

        assert_eq!(index.len(), 1);
        assert_eq!(
            index
                .resolve(&CardRef::External("opt-1".into()))
                .expect("seeded id resolves")
                .canonical_id,
            42
        );

        // New identities must not collide with seeded ids.
        let report = index
            .ingest("a", vec![list_row(651, "Duress", "xln")])
            .expect("batch should commit");
        assert_eq!(report.committed[0].canonical_id, 43);
    }

    #[test]
    fn resolve_miss_is_a_typed_not_found() {
        let index = CardIndex::new();
        let err = index
            .resolve(&CardRef::Arena(999))
            .expect_err("empty index resolves nothing");
        assert_eq!(err.reference, CardRef::Arena(999));
    }
}

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::iri::Iri;
use crate::match_type::IoMatchType;
use crate::result::MatchResult;

/// Origin × destination table of pairwise results.
///
/// Produced by cross-product matching; callers rely on every requested pair
/// being present, `Fail` entries included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchTable {
    rows: BTreeMap<Iri, BTreeMap<Iri, MatchResult>>,
}

impl MatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, origin: Iri, destination: Iri, result: MatchResult) {
        self.rows.entry(origin).or_default().insert(destination, result);
    }

    pub fn get(&self, origin: &Iri, destination: &Iri) -> Option<&MatchResult> {
        self.rows.get(origin)?.get(destination)
    }

    pub fn degree(&self, origin: &Iri, destination: &Iri) -> Option<IoMatchType> {
        self.get(origin, destination).map(MatchResult::match_type)
    }

    /// Results for one origin, keyed by destination.
    pub fn row(&self, origin: &Iri) -> Option<&BTreeMap<Iri, MatchResult>> {
        self.rows.get(origin)
    }

    /// Results for one destination, keyed by origin.
    pub fn column(&self, destination: &Iri) -> BTreeMap<&Iri, &MatchResult> {
        self.rows
            .iter()
            .filter_map(|(origin, row)| row.get(destination).map(|r| (origin, r)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(origin, destination, result)` in origin-then-destination order.
    pub fn iter(&self) -> impl Iterator<Item = (&Iri, &Iri, &MatchResult)> {
        self.rows
            .iter()
            .flat_map(|(origin, row)| row.iter().map(move |(dest, r)| (origin, dest, r)))
    }

    /// Whether every pair of `origins × destinations` has an entry.
    pub fn is_complete_for(&self, origins: &BTreeSet<Iri>, destinations: &BTreeSet<Iri>) -> bool {
        origins
            .iter()
            .all(|o| destinations.iter().all(|d| self.get(o, d).is_some()))
    }

    /// Strongest degree in the table for any origin against `destination`.
    pub fn best_for_destination(&self, destination: &Iri) -> Option<IoMatchType> {
        self.column(destination)
            .values()
            .map(|r| r.match_type())
            .max()
    }
}

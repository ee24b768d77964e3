use std::collections::BTreeMap;

use crate::combinator::{merge_group, Combinator};
use crate::iri::Iri;
use crate::result::MatchResult;

/// Resource → many results, as accumulated by discovery queries.
pub type MatchMultimap = BTreeMap<Iri, Vec<MatchResult>>;

/// Collapses a [`MatchMultimap`] into one (possibly composite) result per
/// resource in a single pass.
///
/// Results filed under a key they do not describe are dropped before
/// merging, so a key left with one result keeps it unchanged. A key whose
/// values are all foreign, or that has no values at all, disappears from the
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultimapMerger {
    combinator: Combinator,
}

impl MultimapMerger {
    pub const fn new(combinator: Combinator) -> Self {
        Self { combinator }
    }

    pub const fn union() -> Self {
        Self::new(Combinator::Union)
    }

    pub const fn intersection() -> Self {
        Self::new(Combinator::Intersection)
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn merge(&self, multimap: MatchMultimap) -> BTreeMap<Iri, MatchResult> {
        multimap
            .into_iter()
            .filter_map(|(resource, mut group)| {
                group.retain(|m| m.matched_resource() == &resource);
                merge_group(resource.clone(), group, self.combinator).map(|m| (resource, m))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_type::IoMatchType::*;

    fn m(op: &str, concept: &str, degree: crate::IoMatchType) -> MatchResult {
        MatchResult::atomic(op, concept, degree, "test")
    }

    #[test]
    fn merges_each_key_with_configured_combinator() {
        let mut multimap = MatchMultimap::new();
        multimap.insert(
            Iri::new("urn:op1"),
            vec![m("urn:op1", "urn:a", Exact), m("urn:op1", "urn:b", Fail)],
        );
        multimap.insert(Iri::new("urn:op2"), vec![m("urn:op2", "urn:a", Subsume)]);

        let union = MultimapMerger::union().merge(multimap.clone());
        assert_eq!(union[&Iri::new("urn:op1")].match_type(), Exact);
        assert_eq!(union[&Iri::new("urn:op2")].match_type(), Subsume);

        let inter = MultimapMerger::intersection().merge(multimap);
        assert_eq!(inter[&Iri::new("urn:op1")].match_type(), PartialPlugin);
        assert!(!inter[&Iri::new("urn:op2")].is_composite());
    }

    #[test]
    fn empty_and_foreign_groups_vanish() {
        let mut multimap = MatchMultimap::new();
        multimap.insert(Iri::new("urn:empty"), vec![]);
        multimap.insert(Iri::new("urn:op1"), vec![m("urn:elsewhere", "urn:a", Exact)]);
        multimap.insert(
            Iri::new("urn:op2"),
            vec![m("urn:elsewhere", "urn:a", Exact), m("urn:elsewhere", "urn:b", Exact)],
        );
        assert!(MultimapMerger::union().merge(multimap).is_empty());
    }

    #[test]
    fn lone_own_result_among_foreign_ones_stays_atomic() {
        let mut multimap = MatchMultimap::new();
        let own = m("urn:op1", "urn:a", Plugin);
        multimap.insert(
            Iri::new("urn:op1"),
            vec![own.clone(), m("urn:elsewhere", "urn:b", Exact)],
        );
        for merger in [MultimapMerger::union(), MultimapMerger::intersection()] {
            let merged = merger.merge(multimap.clone());
            assert_eq!(merged[&Iri::new("urn:op1")], own);
            assert!(!merged[&Iri::new("urn:op1")].is_composite());
        }
    }
}

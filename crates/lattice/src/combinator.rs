//! UNION / INTERSECTION merging of match results keyed by matched resource.
//!
//! Inputs are grouped by `matched_resource` in IRI order, so the output of
//! every function here is independent of input order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CombinatorError;
use crate::iri::Iri;
use crate::match_type::IoMatchType;
use crate::result::{CompositeMatch, MatchResult};

/// Merge rule applied to a group of results about the same resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    /// Strongest evidence wins.
    Union,
    /// Evidence must hold across all criteria; see [`IoMatchType::intersection`].
    Intersection,
}

impl Combinator {
    /// Verdict for a group of degrees. `None` for an empty group.
    pub fn degree(self, degrees: impl IntoIterator<Item = IoMatchType>) -> Option<IoMatchType> {
        let mut iter = degrees.into_iter();
        let first = iter.next()?;
        let (best, worst) = iter.fold((first, first), |(best, worst), d| (best.max(d), worst.min(d)));
        Some(match self {
            Combinator::Union => best,
            Combinator::Intersection => IoMatchType::intersection(best, worst),
        })
    }

    /// Derived score over the scored members of a group.
    pub fn score(self, scores: impl IntoIterator<Item = f64>) -> Option<f64> {
        let fold: fn(f64, f64) -> f64 = match self {
            Combinator::Union => f64::max,
            Combinator::Intersection => f64::min,
        };
        scores.into_iter().reduce(fold)
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::Union => f.write_str("UNION"),
            Combinator::Intersection => f.write_str("INTERSECTION"),
        }
    }
}

/// Group `results` by matched resource and merge each group.
///
/// Single-member groups pass through unchanged. An empty input yields an
/// empty map.
pub fn combine(
    results: impl IntoIterator<Item = MatchResult>,
    combinator: Combinator,
) -> BTreeMap<Iri, MatchResult> {
    let mut groups: BTreeMap<Iri, Vec<MatchResult>> = BTreeMap::new();
    for result in results {
        groups
            .entry(result.matched_resource().clone())
            .or_default()
            .push(result);
    }
    groups
        .into_iter()
        .filter_map(|(resource, group)| {
            merge_group(resource.clone(), group, combinator).map(|merged| (resource, merged))
        })
        .collect()
}

/// Merge results that the caller asserts all describe `resource`.
///
/// Unlike [`combine`], a result about any other resource is a contract
/// violation and is reported instead of dropped.
pub fn combine_single(
    resource: &Iri,
    results: Vec<MatchResult>,
    combinator: Combinator,
) -> Result<MatchResult, CombinatorError> {
    if results.is_empty() {
        return Err(CombinatorError::Empty);
    }
    if let Some(stray) = results.iter().find(|r| r.matched_resource() != resource) {
        return Err(CombinatorError::MixedResources {
            expected: resource.clone(),
            found: stray.matched_resource().clone(),
        });
    }
    merge_group(resource.clone(), results, combinator).ok_or(CombinatorError::Empty)
}

pub(crate) fn merge_group(
    resource: Iri,
    mut group: Vec<MatchResult>,
    combinator: Combinator,
) -> Option<MatchResult> {
    match group.len() {
        0 => None,
        1 => group.pop(),
        _ => CompositeMatch::new(resource, group, combinator).map(MatchResult::from),
    }
}

use std::collections::{BTreeMap, BTreeSet};

use lattice::{IoMatchType, Iri, MatchResult};
use matcher::{ConceptMatcher, MatchError};

/// Request-local memo of pairwise matches. Never shared between requests.
pub(crate) struct PairCache<'a> {
    matcher: &'a dyn ConceptMatcher,
    memo: BTreeMap<(Iri, Iri), MatchResult>,
    hits: usize,
}

impl<'a> PairCache<'a> {
    pub(crate) fn new(matcher: &'a dyn ConceptMatcher) -> Self {
        Self {
            matcher,
            memo: BTreeMap::new(),
            hits: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.memo.len()
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits
    }

    pub(crate) async fn pair(
        &mut self,
        origin: &Iri,
        destination: &Iri,
    ) -> Result<MatchResult, MatchError> {
        let key = (origin.clone(), destination.clone());
        if let Some(cached) = self.memo.get(&key) {
            self.hits += 1;
            return Ok(cached.clone());
        }
        let result = self.matcher.match_concepts(origin, destination).await?;
        self.memo.insert(key, result.clone());
        Ok(result)
    }

    /// Strongest `match(o, destination)` over `origins` reaching `threshold`.
    /// Ties keep the first origin in IRI order.
    pub(crate) async fn best_origin_for(
        &mut self,
        origins: &BTreeSet<Iri>,
        destination: &Iri,
        threshold: IoMatchType,
    ) -> Result<Option<MatchResult>, MatchError> {
        let mut best: Option<MatchResult> = None;
        for origin in origins {
            let result = self.pair(origin, destination).await?;
            if improves(&best, &result, threshold) {
                let exact = result.match_type() == IoMatchType::Exact;
                best = Some(result);
                if exact {
                    break;
                }
            }
        }
        Ok(best)
    }

    /// Strongest `match(origin, d)` over `destinations` reaching `threshold`.
    pub(crate) async fn best_destination_for(
        &mut self,
        origin: &Iri,
        destinations: &BTreeSet<Iri>,
        threshold: IoMatchType,
    ) -> Result<Option<MatchResult>, MatchError> {
        let mut best: Option<MatchResult> = None;
        for destination in destinations {
            let result = self.pair(origin, destination).await?;
            if improves(&best, &result, threshold) {
                let exact = result.match_type() == IoMatchType::Exact;
                best = Some(result);
                if exact {
                    break;
                }
            }
        }
        Ok(best)
    }
}

fn improves(best: &Option<MatchResult>, candidate: &MatchResult, threshold: IoMatchType) -> bool {
    candidate.match_type() >= threshold
        && best
            .as_ref()
            .map_or(true, |b| candidate.match_type() > b.match_type())
}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use lattice::{IoMatchType, Iri, MatchMultimap, MatchResult, MultimapMerger};
use matcher::ConceptMatcher;
use oracle::{ConceptRole, OperationCatalogue, SubsumptionOracle};
use tracing::debug;

use crate::cache::PairCache;
use crate::types::{DiscoveryConfig, DiscoveryError, DiscoveryMode, INVOCABILITY_THRESHOLD};

/// Finds operations by their annotations, either directly
/// ([`discover_operations`](Self::discover_operations) and the `find_*`
/// helpers) or by forward chaining
/// ([`discover_reachable_operations`](Self::discover_reachable_operations)).
///
/// All collaborators are injected; the discoverer itself is immutable and
/// may be shared between concurrent requests.
#[derive(Clone)]
pub struct OperationDiscoverer {
    pub(crate) matcher: Arc<dyn ConceptMatcher>,
    pub(crate) oracle: Arc<dyn SubsumptionOracle>,
    pub(crate) catalogue: Arc<dyn OperationCatalogue>,
    pub(crate) config: DiscoveryConfig,
}

impl OperationDiscoverer {
    pub fn new(
        matcher: Arc<dyn ConceptMatcher>,
        oracle: Arc<dyn SubsumptionOracle>,
        catalogue: Arc<dyn OperationCatalogue>,
        config: DiscoveryConfig,
    ) -> Result<Self, DiscoveryError> {
        config.validate()?;
        Ok(Self {
            matcher,
            oracle,
            catalogue,
            config,
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn matcher(&self) -> &Arc<dyn ConceptMatcher> {
        &self.matcher
    }

    pub fn catalogue(&self) -> &Arc<dyn OperationCatalogue> {
        &self.catalogue
    }

    pub async fn find_operations_consuming_all(
        &self,
        concepts: &BTreeSet<Iri>,
    ) -> Result<BTreeMap<Iri, MatchResult>, DiscoveryError> {
        self.discover_operations(concepts, DiscoveryMode::ConsumingAll)
            .await
    }

    pub async fn find_operations_consuming_some(
        &self,
        concepts: &BTreeSet<Iri>,
    ) -> Result<BTreeMap<Iri, MatchResult>, DiscoveryError> {
        self.discover_operations(concepts, DiscoveryMode::ConsumingSome)
            .await
    }

    pub async fn find_operations_producing_all(
        &self,
        concepts: &BTreeSet<Iri>,
    ) -> Result<BTreeMap<Iri, MatchResult>, DiscoveryError> {
        self.discover_operations(concepts, DiscoveryMode::ProducingAll)
            .await
    }

    pub async fn find_operations_producing_some(
        &self,
        concepts: &BTreeSet<Iri>,
    ) -> Result<BTreeMap<Iri, MatchResult>, DiscoveryError> {
        self.discover_operations(concepts, DiscoveryMode::ProducingSome)
            .await
    }

    pub async fn find_operations_classified_by_all(
        &self,
        categories: &BTreeSet<Iri>,
    ) -> Result<BTreeMap<Iri, MatchResult>, DiscoveryError> {
        self.discover_operations(categories, DiscoveryMode::ClassifiedByAll)
            .await
    }

    pub async fn find_operations_classified_by_some(
        &self,
        categories: &BTreeSet<Iri>,
    ) -> Result<BTreeMap<Iri, MatchResult>, DiscoveryError> {
        self.discover_operations(categories, DiscoveryMode::ClassifiedBySome)
            .await
    }

    /// Direct query over one annotation role.
    ///
    /// - *Consuming*: concept `c` is handled by input `i` when
    ///   `match(c, i) >= Plugin`.
    /// - *Producing* / *ClassifiedBy*: annotation `a` answers `c` when
    ///   `match(a, c) >= Plugin`.
    ///
    /// *All* modes keep an operation only when every concept is answered and
    /// merge the per-concept evidence with INTERSECTION; *Some* modes keep
    /// whatever is answered and merge with UNION. An empty concept set
    /// yields an empty map.
    pub async fn discover_operations(
        &self,
        concepts: &BTreeSet<Iri>,
        mode: DiscoveryMode,
    ) -> Result<BTreeMap<Iri, MatchResult>, DiscoveryError> {
        if concepts.is_empty() {
            return Ok(BTreeMap::new());
        }
        let role = role_of(mode);
        let mut cache = PairCache::new(self.matcher.as_ref());
        let candidates = self.candidates(concepts, role).await?;

        let mut evidence = MatchMultimap::new();
        for operation in &candidates {
            let annotations = self
                .oracle
                .resolve_concepts_for_operation(operation, role)
                .await
                .map_err(DiscoveryError::catalogue(0))?;

            let mut answered = Vec::with_capacity(concepts.len());
            let mut complete = true;
            for concept in concepts {
                let best = match role {
                    ConceptRole::Input => {
                        cache
                            .best_destination_for(concept, &annotations, INVOCABILITY_THRESHOLD)
                            .await
                    }
                    ConceptRole::Output | ConceptRole::Classification => {
                        cache
                            .best_origin_for(&annotations, concept, INVOCABILITY_THRESHOLD)
                            .await
                    }
                }
                .map_err(DiscoveryError::matcher(0))?;

                match best {
                    Some(pair) => answered.push(lift(operation, concept, role, &pair)),
                    None => complete = false,
                }
            }

            if answered.is_empty() || (mode.requires_all() && !complete) {
                continue;
            }
            evidence.insert(operation.clone(), answered);
        }

        let merger = if mode.requires_all() {
            MultimapMerger::intersection()
        } else {
            MultimapMerger::union()
        };
        let merged = merger.merge(evidence);
        debug!(
            mode = %mode,
            concepts = concepts.len(),
            candidates = candidates.len(),
            matched = merged.len(),
            pairs_evaluated = cache.len(),
            "direct_discovery"
        );
        Ok(merged)
    }

    /// Over-inclusive candidate set: operations annotated (for `role`) with
    /// any concept in the matcher's neighbourhood of the query concepts.
    async fn candidates(
        &self,
        concepts: &BTreeSet<Iri>,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, DiscoveryError> {
        let mut neighbourhood = BTreeSet::new();
        for concept in concepts {
            let related = match role {
                // c ⊑ x
                ConceptRole::Input => {
                    self.matcher
                        .list_matches_at_least(concept, INVOCABILITY_THRESHOLD)
                        .await
                }
                // x ⊑ c shows up as Subsume or Exact from c's side
                ConceptRole::Output | ConceptRole::Classification => {
                    self.matcher
                        .list_matches_at_least(concept, IoMatchType::Subsume)
                        .await
                }
            }
            .map_err(DiscoveryError::matcher(0))?;
            neighbourhood.extend(
                related
                    .into_iter()
                    .filter(|(_, m)| role == ConceptRole::Input || m.match_type() != IoMatchType::Plugin)
                    .map(|(iri, _)| iri),
            );
            neighbourhood.insert(concept.clone());
        }

        let mut operations = BTreeSet::new();
        for concept in &neighbourhood {
            let referencing = self
                .oracle
                .find_operations_referencing(concept, role)
                .await
                .map_err(DiscoveryError::catalogue(0))?;
            operations.extend(referencing);
        }
        Ok(operations)
    }
}

pub(crate) const fn role_of(mode: DiscoveryMode) -> ConceptRole {
    match mode {
        DiscoveryMode::ConsumingAll | DiscoveryMode::ConsumingSome => ConceptRole::Input,
        DiscoveryMode::ProducingAll | DiscoveryMode::ProducingSome => ConceptRole::Output,
        DiscoveryMode::ClassifiedByAll | DiscoveryMode::ClassifiedBySome => {
            ConceptRole::Classification
        }
    }
}

/// Re-key a concept-level match as evidence about `operation`.
fn lift(operation: &Iri, concept: &Iri, role: ConceptRole, pair: &MatchResult) -> MatchResult {
    let annotation = match role {
        ConceptRole::Input => pair.resource_to_match(),
        ConceptRole::Output | ConceptRole::Classification => pair.matched_resource(),
    };
    MatchResult::atomic(
        operation.clone(),
        concept.clone(),
        pair.match_type(),
        format!("{role} {annotation}: {}", pair.explanation()),
    )
}

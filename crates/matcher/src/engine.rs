use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use lattice::{IoMatchType, Iri, MatchResult, MatchTable};
use oracle::SubsumptionOracle;
use tracing::{debug, warn};

use crate::metrics::metrics_recorder;
use crate::types::{DegreeRange, MatchError};


/// Decides match degrees between ontology concepts.
///
/// `match_concepts(origin, destination)` answers how well `origin` can stand
/// in for `destination`: `Plugin` means `origin` is a strict subclass of
/// `destination`.
#[async_trait]
pub trait ConceptMatcher: Send + Sync {
    async fn match_concepts(
        &self,
        origin: &Iri,
        destination: &Iri,
    ) -> Result<MatchResult, MatchError>;

    /// Every known concept `x` whose degree `match_concepts(concept, x)` lies
    /// in `worst..=best`. An inverted range yields an empty map.
    async fn list_matches_within_range(
        &self,
        concept: &Iri,
        worst: IoMatchType,
        best: IoMatchType,
    ) -> Result<BTreeMap<Iri, MatchResult>, MatchError>;

    /// Full cross product. The table always holds
    /// `origins.len() * destinations.len()` entries, `Fail` included.
    async fn match_sets(
        &self,
        origins: &BTreeSet<Iri>,
        destinations: &BTreeSet<Iri>,
    ) -> Result<MatchTable, MatchError> {
        let mut table = MatchTable::new();
        for origin in origins {
            for destination in destinations {
                let result = self.match_concepts(origin, destination).await?;
                table.insert(origin.clone(), destination.clone(), result);
            }
        }
        Ok(table)
    }

    async fn list_matches_of_type(
        &self,
        concept: &Iri,
        degree: IoMatchType,
    ) -> Result<BTreeMap<Iri, MatchResult>, MatchError> {
        self.list_matches_within_range(concept, degree, degree).await
    }

    async fn list_matches_at_least(
        &self,
        concept: &Iri,
        worst: IoMatchType,
    ) -> Result<BTreeMap<Iri, MatchResult>, MatchError> {
        self.list_matches_within_range(concept, worst, IoMatchType::Exact)
            .await
    }

    async fn list_matches_at_most(
        &self,
        concept: &Iri,
        best: IoMatchType,
    ) -> Result<BTreeMap<Iri, MatchResult>, MatchError> {
        self.list_matches_within_range(concept, IoMatchType::Fail, best)
            .await
    }
}

/// [`ConceptMatcher`] backed by a [`SubsumptionOracle`].
///
/// Holds no mutable state; one instance can serve any number of concurrent
/// requests.
#[derive(Clone)]
pub struct SubsumptionMatcher {
    oracle: Arc<dyn SubsumptionOracle>,
}

impl SubsumptionMatcher {
    pub fn new(oracle: Arc<dyn SubsumptionOracle>) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &Arc<dyn SubsumptionOracle> {
        &self.oracle
    }

    async fn is_known(
        &self,
        concept: &Iri,
        origin: &Iri,
        destination: &Iri,
    ) -> Result<bool, MatchError> {
        self.oracle
            .is_known(concept)
            .await
            .map_err(|e| MatchError::pair(origin, destination, e))
    }

    async fn is_known_memo(
        &self,
        concept: &Iri,
        origin: &Iri,
        destination: &Iri,
        memo: &mut BTreeMap<Iri, bool>,
    ) -> Result<bool, MatchError> {
        if let Some(flag) = memo.get(concept) {
            return Ok(*flag);
        }
        let flag = self.is_known(concept, origin, destination).await?;
        memo.insert(concept.clone(), flag);
        Ok(flag)
    }

    /// Decide one pair once membership of both concepts is settled.
    async fn decide(
        &self,
        origin: &Iri,
        destination: &Iri,
        origin_known: bool,
        destination_known: bool,
    ) -> Result<MatchResult, MatchError> {
        if !origin_known || !destination_known {
            let unknown = if origin_known { destination } else { origin };
            return Ok(MatchResult::atomic(
                origin.clone(),
                destination.clone(),
                IoMatchType::Fail,
                format!("unknown concept {unknown}"),
            ));
        }
        if origin == destination {
            return Ok(MatchResult::atomic(
                origin.clone(),
                destination.clone(),
                IoMatchType::Exact,
                format!("{origin} is identical to {destination}"),
            ));
        }

        let origin_sub = self
            .oracle
            .is_subclass_of(origin, destination)
            .await
            .map_err(|e| MatchError::pair(origin, destination, e))?;
        let destination_sub = self
            .oracle
            .is_subclass_of(destination, origin)
            .await
            .map_err(|e| MatchError::pair(origin, destination, e))?;

        let degree = IoMatchType::from_subsumption(origin_sub, destination_sub);
        Ok(MatchResult::atomic(
            origin.clone(),
            destination.clone(),
            degree,
            explain(origin, destination, degree),
        ))
    }

    async fn timed<F>(
        &self,
        origin: &Iri,
        destination: &Iri,
        fut: F,
    ) -> Result<MatchResult, MatchError>
    where
        F: std::future::Future<Output = Result<MatchResult, MatchError>> + Send,
    {
        let start = Instant::now();
        let outcome = fut.await;
        let latency = start.elapsed();
        let recorder = metrics_recorder();
        match &outcome {
            Ok(result) => {
                debug!(
                    origin = %origin,
                    destination = %destination,
                    degree = %result.match_type(),
                    latency_us = latency.as_micros() as u64,
                    "concept_match"
                );
                if let Some(recorder) = recorder {
                    recorder.record_match(result.match_type(), latency);
                }
            }
            Err(err) => {
                warn!(
                    origin = %origin,
                    destination = %destination,
                    error = %err,
                    "concept_match_unavailable"
                );
                if let Some(recorder) = recorder {
                    recorder.record_unavailable(latency);
                }
            }
        }
        outcome
    }
}

fn explain(origin: &Iri, destination: &Iri, degree: IoMatchType) -> String {
    match degree {
        IoMatchType::Exact => format!("{origin} is equivalent to {destination}"),
        IoMatchType::Plugin => format!("{origin} is a subclass of {destination}"),
        IoMatchType::Subsume => format!("{destination} is a subclass of {origin}"),
        _ => format!("no subsumption between {origin} and {destination}"),
    }
}

#[async_trait]
impl ConceptMatcher for SubsumptionMatcher {
    async fn match_concepts(
        &self,
        origin: &Iri,
        destination: &Iri,
    ) -> Result<MatchResult, MatchError> {
        self.timed(origin, destination, async {
            let origin_known = self.is_known(origin, origin, destination).await?;
            let destination_known = if origin == destination {
                origin_known
            } else {
                self.is_known(destination, origin, destination).await?
            };
            self.decide(origin, destination, origin_known, destination_known)
                .await
        })
        .await
    }

    async fn match_sets(
        &self,
        origins: &BTreeSet<Iri>,
        destinations: &BTreeSet<Iri>,
    ) -> Result<MatchTable, MatchError> {
        let mut known: BTreeMap<Iri, bool> = BTreeMap::new();
        let mut table = MatchTable::new();
        for origin in origins {
            for destination in destinations {
                let result = self
                    .timed(origin, destination, async {
                        let origin_known = self
                            .is_known_memo(origin, origin, destination, &mut known)
                            .await?;
                        let destination_known = self
                            .is_known_memo(destination, origin, destination, &mut known)
                            .await?;
                        self.decide(origin, destination, origin_known, destination_known)
                            .await
                    })
                    .await?;
                table.insert(origin.clone(), destination.clone(), result);
            }
        }
        Ok(table)
    }

    async fn list_matches_within_range(
        &self,
        concept: &Iri,
        worst: IoMatchType,
        best: IoMatchType,
    ) -> Result<BTreeMap<Iri, MatchResult>, MatchError> {
        let range = DegreeRange::new(worst, best);
        let mut out = BTreeMap::new();
        if range.is_empty() {
            return Ok(out);
        }
        let unavailable = |e| MatchError::enumeration(concept, e);

        let concept_known = self.oracle.is_known(concept).await.map_err(unavailable)?;
        let (supers, subs) = if concept_known {
            let supers = self.oracle.superclasses_of(concept).await.map_err(unavailable)?;
            let subs = self.oracle.subclasses_of(concept).await.map_err(unavailable)?;
            if range.contains(IoMatchType::Exact) {
                out.insert(
                    concept.clone(),
                    MatchResult::atomic(
                        concept.clone(),
                        concept.clone(),
                        IoMatchType::Exact,
                        format!("{concept} is identical to {concept}"),
                    ),
                );
            }
            (supers, subs)
        } else {
            (BTreeSet::new(), BTreeSet::new())
        };

        for other in supers.union(&subs) {
            let degree = IoMatchType::from_subsumption(supers.contains(other), subs.contains(other));
            if range.contains(degree) {
                out.insert(
                    other.clone(),
                    MatchResult::atomic(
                        concept.clone(),
                        other.clone(),
                        degree,
                        explain(concept, other, degree),
                    ),
                );
            }
        }

        if range.contains(IoMatchType::Fail) {
            let known = self.oracle.known_concepts().await.map_err(unavailable)?;
            for other in known {
                if other == *concept || supers.contains(&other) || subs.contains(&other) {
                    continue;
                }
                let explanation = if concept_known {
                    explain(concept, &other, IoMatchType::Fail)
                } else {
                    format!("unknown concept {concept}")
                };
                out.insert(
                    other.clone(),
                    MatchResult::atomic(concept.clone(), other, IoMatchType::Fail, explanation),
                );
            }
        }

        debug!(
            concept = %concept,
            worst = %worst,
            best = %best,
            matches = out.len(),
            "concept_range_listed"
        );
        Ok(out)
    }
}

use std::collections::BTreeSet;
use std::time::Instant as StdInstant;

use lattice::{Iri, MatchMultimap, MatchResult, MultimapMerger};
use oracle::OperationEntry;
use tokio::time::Instant;
use tracing::{debug, info, warn, Instrument, Level};

use crate::cache::PairCache;
use crate::metrics::metrics_recorder;
use crate::operations::OperationDiscoverer;
use crate::types::{
    Completion, DiscoveryError, DiscoveryOutcome, IncompleteReason, PassSummary,
    INVOCABILITY_THRESHOLD,
};


/// The three sets carried between passes. Each pass consumes the old state
/// and produces the next; `available` and `discovered` only grow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryState {
    available: BTreeSet<Iri>,
    frontier: BTreeSet<Iri>,
    discovered: MatchMultimap,
}

/// Operations found by one pass and the outputs they contribute.
#[derive(Debug, Default)]
struct PassStep {
    found: MatchMultimap,
    outputs: BTreeSet<Iri>,
}

impl DiscoveryState {
    pub fn new(initial: BTreeSet<Iri>) -> Self {
        Self {
            frontier: initial.clone(),
            available: initial,
            discovered: MatchMultimap::new(),
        }
    }

    pub fn available(&self) -> &BTreeSet<Iri> {
        &self.available
    }

    pub fn frontier(&self) -> &BTreeSet<Iri> {
        &self.frontier
    }

    pub fn is_discovered(&self, operation: &Iri) -> bool {
        self.discovered.contains_key(operation)
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    /// Fixed point: nothing new to propagate.
    pub fn is_settled(&self) -> bool {
        self.frontier.is_empty()
    }

    fn advance(self, step: PassStep) -> (Self, BTreeSet<Iri>) {
        let DiscoveryState {
            mut available,
            frontier: _,
            mut discovered,
        } = self;
        let new_concepts: BTreeSet<Iri> = step.outputs.difference(&available).cloned().collect();
        available.extend(new_concepts.iter().cloned());
        discovered.extend(step.found);
        let next = DiscoveryState {
            available,
            frontier: new_concepts.clone(),
            discovered,
        };
        (next, new_concepts)
    }

    fn into_outcome(self, passes: Vec<PassSummary>, completion: Completion) -> DiscoveryOutcome {
        DiscoveryOutcome {
            operations: MultimapMerger::intersection().merge(self.discovered),
            available_concepts: self.available,
            passes,
            completion,
        }
    }
}

impl OperationDiscoverer {
    /// Forward-chain from `initial` until no operation becomes invocable.
    ///
    /// An operation is picked up in a pass when one of its inputs is served
    /// by the frontier and every input is served by the available set, both
    /// at [`INVOCABILITY_THRESHOLD`] or better. Operations without inputs are
    /// never picked up: they consume nothing.
    ///
    /// The deadline and pass limit are checked only between passes; a
    /// truncated run still returns everything found so far, tagged
    /// [`Completion::Incomplete`].
    pub async fn discover_reachable_operations(
        &self,
        initial: &BTreeSet<Iri>,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        let span = tracing::span!(
            Level::INFO,
            "discovery.reachable",
            initial = initial.len(),
            deadline_ms = self.config.deadline.map(|d| d.as_millis() as u64),
            max_passes = self.config.max_passes,
        );
        let start = StdInstant::now();
        let outcome = self.reachable_inner(initial).instrument(span).await;
        let latency = start.elapsed();

        let recorder = metrics_recorder();
        match &outcome {
            Ok(outcome) => {
                info!(
                    operations = outcome.operations.len(),
                    available = outcome.available_concepts.len(),
                    passes = outcome.passes.len(),
                    completion = %outcome.completion,
                    elapsed_micros = latency.as_micros() as u64,
                    "discovery_success"
                );
                if let Some(recorder) = recorder {
                    recorder.record_discovery(
                        latency,
                        outcome.passes.len(),
                        outcome.operations.len(),
                        &outcome.completion,
                    );
                }
            }
            Err(err) => {
                warn!(
                    error = %err,
                    pass = ?err.pass(),
                    elapsed_micros = latency.as_micros() as u64,
                    "discovery_failure"
                );
                if let Some(recorder) = recorder {
                    recorder.record_failure(latency, err.pass());
                }
            }
        }
        outcome
    }

    async fn reachable_inner(
        &self,
        initial: &BTreeSet<Iri>,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        let operations = self
            .catalogue
            .list_operations()
            .await
            .map_err(DiscoveryError::catalogue(0))?;
        // The budget covers the passes only; pass 1 always runs.
        let deadline = self.config.deadline.map(|d| Instant::now() + d);

        let mut cache = PairCache::new(self.matcher.as_ref());
        let mut state = DiscoveryState::new(initial.clone());
        let mut passes: Vec<PassSummary> = Vec::new();

        let completion = loop {
            if state.is_settled() {
                break Completion::Closed;
            }
            if !passes.is_empty() && deadline.is_some_and(|d| Instant::now() >= d) {
                break Completion::Incomplete {
                    reason: IncompleteReason::Deadline,
                    passes_completed: passes.len(),
                };
            }
            if self.config.max_passes.is_some_and(|max| passes.len() >= max) {
                break Completion::Incomplete {
                    reason: IncompleteReason::PassLimit,
                    passes_completed: passes.len(),
                };
            }

            let pass = passes.len() + 1;
            let step = run_pass(&state, &operations, &mut cache, pass).await?;
            let discovered: BTreeSet<Iri> = step.found.keys().cloned().collect();
            let frontier = state.frontier().clone();
            let (next, new_concepts) = state.advance(step);
            state = next;

            debug!(
                pass,
                frontier = frontier.len(),
                discovered = discovered.len(),
                new_concepts = new_concepts.len(),
                available = state.available().len(),
                "discovery_pass"
            );
            passes.push(PassSummary {
                pass,
                frontier,
                discovered,
                new_concepts,
                available_after: state.available().len(),
            });
        };

        debug!(
            pairs_evaluated = cache.len(),
            cache_hits = cache.hits(),
            "discovery_cache"
        );
        Ok(state.into_outcome(passes, completion))
    }
}

/// One pass: every undiscovered operation that consumes some of the
/// frontier and is invocable from the available set.
async fn run_pass(
    state: &DiscoveryState,
    operations: &[OperationEntry],
    cache: &mut PairCache<'_>,
    pass: usize,
) -> Result<PassStep, DiscoveryError> {
    let mut step = PassStep::default();
    for operation in operations {
        if operation.inputs.is_empty() || state.is_discovered(&operation.iri) {
            continue;
        }
        if !consumes_some(operation, state.frontier(), cache, pass).await? {
            continue;
        }
        if let Some(evidence) = invocable(operation, state.available(), cache, pass).await? {
            step.outputs.extend(operation.outputs.iter().cloned());
            step.found.insert(operation.iri.clone(), evidence);
        }
    }
    Ok(step)
}

async fn consumes_some(
    operation: &OperationEntry,
    frontier: &BTreeSet<Iri>,
    cache: &mut PairCache<'_>,
    pass: usize,
) -> Result<bool, DiscoveryError> {
    for input in &operation.inputs {
        let best = cache
            .best_origin_for(frontier, input, INVOCABILITY_THRESHOLD)
            .await
            .map_err(DiscoveryError::matcher(pass))?;
        if best.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Per-input evidence when every input is satisfied, `None` otherwise.
async fn invocable(
    operation: &OperationEntry,
    available: &BTreeSet<Iri>,
    cache: &mut PairCache<'_>,
    pass: usize,
) -> Result<Option<Vec<MatchResult>>, DiscoveryError> {
    let mut evidence = Vec::with_capacity(operation.inputs.len());
    for input in &operation.inputs {
        let best = cache
            .best_origin_for(available, input, INVOCABILITY_THRESHOLD)
            .await
            .map_err(DiscoveryError::matcher(pass))?;
        match best {
            Some(pair) => evidence.push(MatchResult::atomic(
                operation.iri.clone(),
                input.clone(),
                pair.match_type(),
                format!(
                    "input {input} satisfied by {}: {}",
                    pair.matched_resource(),
                    pair.explanation()
                ),
            )),
            None => return Ok(None),
        }
    }
    Ok(Some(evidence))
}

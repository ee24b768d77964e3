use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use lattice::{IoMatchType, Iri, MatchResult};
use matcher::MatchError;
use oracle::OracleError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Degree every mandatory input must reach for an operation to be invocable.
/// A fixed policy of the algorithm, not a tuning knob.
pub const INVOCABILITY_THRESHOLD: IoMatchType = IoMatchType::Plugin;

/// Per-request limits for reachability discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Wall-clock budget for the passes, checked before each pass after
    /// the first.
    #[serde(default, rename = "deadline_ms", with = "crate::serde_millis::option")]
    pub deadline: Option<Duration>,
    /// Upper bound on passes.
    #[serde(default)]
    pub max_passes: Option<usize>,
}

impl DiscoveryConfig {
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = Some(max_passes);
        self
    }

    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.deadline.is_some_and(|d| d.is_zero()) {
            return Err(DiscoveryError::InvalidConfig(
                "deadline must be greater than zero".into(),
            ));
        }
        if self.max_passes == Some(0) {
            return Err(DiscoveryError::InvalidConfig(
                "max_passes must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Direct (non-closure) query modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMode {
    ConsumingAll,
    ConsumingSome,
    ProducingAll,
    ProducingSome,
    ClassifiedByAll,
    ClassifiedBySome,
}

impl DiscoveryMode {
    pub const fn requires_all(self) -> bool {
        matches!(
            self,
            DiscoveryMode::ConsumingAll | DiscoveryMode::ProducingAll | DiscoveryMode::ClassifiedByAll
        )
    }
}

impl fmt::Display for DiscoveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiscoveryMode::ConsumingAll => "consuming_all",
            DiscoveryMode::ConsumingSome => "consuming_some",
            DiscoveryMode::ProducingAll => "producing_all",
            DiscoveryMode::ProducingSome => "producing_some",
            DiscoveryMode::ClassifiedByAll => "classified_by_all",
            DiscoveryMode::ClassifiedBySome => "classified_by_some",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncompleteReason {
    Deadline,
    PassLimit,
}

/// Whether the fixed point was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Completion {
    /// No further operation can become invocable.
    Closed,
    /// Stopped early; results are a sound but possibly partial closure.
    Incomplete {
        reason: IncompleteReason,
        passes_completed: usize,
    },
}

impl Completion {
    pub fn is_closed(&self) -> bool {
        matches!(self, Completion::Closed)
    }
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::Closed => f.write_str("closed"),
            Completion::Incomplete {
                reason: IncompleteReason::Deadline,
                passes_completed,
            } => write!(f, "incomplete (deadline after {passes_completed} passes)"),
            Completion::Incomplete {
                reason: IncompleteReason::PassLimit,
                passes_completed,
            } => write!(f, "incomplete (pass limit after {passes_completed} passes)"),
        }
    }
}

/// What one pass of the fixed-point loop did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    /// 1-based pass number.
    pub pass: usize,
    pub frontier: BTreeSet<Iri>,
    pub discovered: BTreeSet<Iri>,
    pub new_concepts: BTreeSet<Iri>,
    pub available_after: usize,
}

/// Result of reachability discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    /// Every discovered operation with the INTERSECTION composite explaining
    /// how its inputs were satisfied.
    pub operations: BTreeMap<Iri, MatchResult>,
    pub available_concepts: BTreeSet<Iri>,
    pub passes: Vec<PassSummary>,
    pub completion: Completion,
}

impl DiscoveryOutcome {
    pub fn operation_iris(&self) -> BTreeSet<Iri> {
        self.operations.keys().cloned().collect()
    }
}

/// Errors surfaced by discovery. `pass` is `0` for work done outside the
/// fixed-point loop.
#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    #[error("matcher failed during pass {pass}: {source}")]
    Matcher {
        pass: usize,
        #[source]
        source: MatchError,
    },
    #[error("catalogue failed during pass {pass}: {source}")]
    Catalogue {
        pass: usize,
        #[source]
        source: OracleError,
    },
    #[error("invalid discovery config: {0}")]
    InvalidConfig(String),
}

impl DiscoveryError {
    pub(crate) fn matcher(pass: usize) -> impl Fn(MatchError) -> Self {
        move |source| DiscoveryError::Matcher { pass, source }
    }

    pub(crate) fn catalogue(pass: usize) -> impl Fn(OracleError) -> Self {
        move |source| DiscoveryError::Catalogue { pass, source }
    }

    pub fn pass(&self) -> Option<usize> {
        match self {
            DiscoveryError::Matcher { pass, .. } | DiscoveryError::Catalogue { pass, .. } => {
                Some(*pass)
            }
            DiscoveryError::InvalidConfig(_) => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            DiscoveryError::Matcher { source, .. } => source.is_transient(),
            DiscoveryError::Catalogue { source, .. } => source.is_transient(),
            DiscoveryError::InvalidConfig(_) => false,
        }
    }
}

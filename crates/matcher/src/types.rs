use lattice::{IoMatchType, Iri};
use oracle::OracleError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive degree range for enumeration queries, given worst..best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeRange {
    pub worst: IoMatchType,
    pub best: IoMatchType,
}

impl DegreeRange {
    pub const fn new(worst: IoMatchType, best: IoMatchType) -> Self {
        Self { worst, best }
    }

    pub const fn exactly(degree: IoMatchType) -> Self {
        Self::new(degree, degree)
    }

    pub const fn at_least(worst: IoMatchType) -> Self {
        Self::new(worst, IoMatchType::Exact)
    }

    pub const fn at_most(best: IoMatchType) -> Self {
        Self::new(IoMatchType::Fail, best)
    }

    /// An inverted range (worst stronger than best) contains nothing.
    pub fn is_empty(&self) -> bool {
        self.worst > self.best
    }

    pub fn contains(&self, degree: IoMatchType) -> bool {
        degree.within(self.worst, self.best)
    }
}

/// Errors produced by the matching layer.
///
/// An unknown concept never shows up here; it is `Fail` evidence.
#[derive(Debug, Clone, Error)]
pub enum MatchError {
    /// The oracle failed while deciding one concept pair.
    #[error("matcher unavailable while matching {origin} against {destination}: {source}")]
    MatcherUnavailable {
        origin: Iri,
        destination: Iri,
        #[source]
        source: OracleError,
    },
    /// The oracle failed while enumerating the neighbourhood of a concept.
    #[error("matcher unavailable while enumerating matches of {concept}: {source}")]
    EnumerationUnavailable {
        concept: Iri,
        #[source]
        source: OracleError,
    },
}

impl MatchError {
    pub(crate) fn pair(origin: &Iri, destination: &Iri, source: OracleError) -> Self {
        MatchError::MatcherUnavailable {
            origin: origin.clone(),
            destination: destination.clone(),
            source,
        }
    }

    pub(crate) fn enumeration(concept: &Iri, source: OracleError) -> Self {
        MatchError::EnumerationUnavailable {
            concept: concept.clone(),
            source,
        }
    }

    /// The underlying oracle failure.
    pub fn oracle_error(&self) -> &OracleError {
        match self {
            MatchError::MatcherUnavailable { source, .. }
            | MatchError::EnumerationUnavailable { source, .. } => source,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.oracle_error().is_transient()
    }
}

use thiserror::Error;

use crate::iri::Iri;

/// Contract violations when merging results that must describe one resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombinatorError {
    #[error("invalid combinator input: no results to merge")]
    Empty,
    #[error("invalid combinator input: expected results for {expected}, found {found}")]
    MixedResources { expected: Iri, found: Iri },
}

/// A result's score was assigned a second time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("score already assigned for {0}")]
pub struct ScoreAlreadySet(pub Iri);

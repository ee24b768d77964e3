//! Match results: the atomic pairwise verdict and the composite that
//! aggregates several verdicts about the same matched resource.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combinator::Combinator;
use crate::error::{CombinatorError, ScoreAlreadySet};
use crate::iri::Iri;
use crate::match_type::IoMatchType;

/// A single directed pairing produced by one matcher invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomicMatch {
    matched_resource: Iri,
    resource_to_match: Iri,
    match_type: IoMatchType,
    score: Option<f64>,
    explanation: String,
}

/// A verdict derived from a non-empty set of inner results that all refer to
/// the same `matched_resource`.
///
/// Deserialization rebuilds the composite from its inner results, so the
/// degree and explanation are always derived, never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CompositeDocument")]
pub struct CompositeMatch {
    matched_resource: Iri,
    combinator: Combinator,
    match_type: IoMatchType,
    score: Option<f64>,
    explanation: String,
    inner: Vec<MatchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchResult {
    Atomic(AtomicMatch),
    Composite(CompositeMatch),
}

impl MatchResult {
    pub fn atomic(
        matched_resource: impl Into<Iri>,
        resource_to_match: impl Into<Iri>,
        match_type: IoMatchType,
        explanation: impl Into<String>,
    ) -> Self {
        MatchResult::Atomic(AtomicMatch {
            matched_resource: matched_resource.into(),
            resource_to_match: resource_to_match.into(),
            match_type,
            score: None,
            explanation: explanation.into(),
        })
    }

    pub fn matched_resource(&self) -> &Iri {
        match self {
            MatchResult::Atomic(m) => &m.matched_resource,
            MatchResult::Composite(c) => &c.matched_resource,
        }
    }

    /// The resource this result was matched against. For a composite this is
    /// the resource of its first inner match (inner matches are kept sorted).
    pub fn resource_to_match(&self) -> &Iri {
        match self {
            MatchResult::Atomic(m) => &m.resource_to_match,
            MatchResult::Composite(c) => c
                .inner
                .first()
                .map_or(&c.matched_resource, MatchResult::resource_to_match),
        }
    }

    pub fn match_type(&self) -> IoMatchType {
        match self {
            MatchResult::Atomic(m) => m.match_type,
            MatchResult::Composite(c) => c.match_type,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            MatchResult::Atomic(m) => m.score,
            MatchResult::Composite(c) => c.score,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            MatchResult::Atomic(m) => &m.explanation,
            MatchResult::Composite(c) => &c.explanation,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, MatchResult::Composite(_))
    }

    /// Inner matches of a composite; empty for an atomic result.
    pub fn inner_matches(&self) -> &[MatchResult] {
        match self {
            MatchResult::Atomic(_) => &[],
            MatchResult::Composite(c) => &c.inner,
        }
    }

    /// Assign the score. Only the first call succeeds.
    pub fn set_score(&mut self, score: f64) -> Result<(), ScoreAlreadySet> {
        let (slot, resource) = match self {
            MatchResult::Atomic(m) => (&mut m.score, &m.matched_resource),
            MatchResult::Composite(c) => (&mut c.score, &c.matched_resource),
        };
        if slot.is_some() {
            return Err(ScoreAlreadySet(resource.clone()));
        }
        *slot = Some(score);
        Ok(())
    }

    /// Builder-style variant of [`set_score`](Self::set_score).
    pub fn with_score(mut self, score: f64) -> Result<Self, ScoreAlreadySet> {
        self.set_score(score)?;
        Ok(self)
    }

    fn sort_key(&self) -> (&Iri, std::cmp::Reverse<IoMatchType>) {
        (self.resource_to_match(), std::cmp::Reverse(self.match_type()))
    }
}

impl CompositeMatch {
    /// Build a composite for `matched_resource` from `inner`.
    ///
    /// Inner results about another resource are dropped (a caller bug, not a
    /// runtime fault). Returns `None` when nothing is left.
    pub fn new(
        matched_resource: Iri,
        inner: Vec<MatchResult>,
        combinator: Combinator,
    ) -> Option<Self> {
        let before = inner.len();
        let mut inner: Vec<MatchResult> = inner
            .into_iter()
            .filter(|m| m.matched_resource() == &matched_resource)
            .collect();
        if inner.len() != before {
            debug!(
                matched = %matched_resource,
                dropped = before - inner.len(),
                "composite_dropped_foreign_inner"
            );
        }
        if inner.is_empty() {
            return None;
        }
        inner.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let match_type = combinator.degree(inner.iter().map(MatchResult::match_type))?;
        let score = combinator.score(inner.iter().filter_map(MatchResult::score));
        let explanation = format!(
            "{} of {} matches for {}: [{}]",
            combinator,
            inner.len(),
            matched_resource.local_name(),
            inner
                .iter()
                .map(|m| format!("{}={}", m.resource_to_match().local_name(), m.match_type()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Some(Self {
            matched_resource,
            combinator,
            match_type,
            score,
            explanation,
            inner,
        })
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn inner(&self) -> &[MatchResult] {
        &self.inner
    }
}

/// Wire form of a composite. Derived fields are ignored on input.
#[derive(Deserialize)]
struct CompositeDocument {
    matched_resource: Iri,
    combinator: Combinator,
    #[serde(default)]
    score: Option<f64>,
    inner: Vec<MatchResult>,
}

impl TryFrom<CompositeDocument> for CompositeMatch {
    type Error = CombinatorError;

    fn try_from(doc: CompositeDocument) -> Result<Self, Self::Error> {
        if let Some(foreign) = doc
            .inner
            .iter()
            .find(|m| m.matched_resource() != &doc.matched_resource)
        {
            return Err(CombinatorError::MixedResources {
                expected: doc.matched_resource.clone(),
                found: foreign.matched_resource().clone(),
            });
        }
        let mut composite = CompositeMatch::new(doc.matched_resource, doc.inner, doc.combinator)
            .ok_or(CombinatorError::Empty)?;
        if doc.score.is_some() {
            composite.score = doc.score;
        }
        Ok(composite)
    }
}

impl From<CompositeMatch> for MatchResult {
    fn from(value: CompositeMatch) -> Self {
        MatchResult::Composite(value)
    }
}

impl From<AtomicMatch> for MatchResult {
    fn from(value: AtomicMatch) -> Self {
        MatchResult::Atomic(value)
    }
}

use std::cmp::Ordering;
use std::collections::BTreeMap;

use lattice::{IoMatchType, Iri, MatchResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Assigns a numeric score to a discovery result.
pub trait Scorer: Send + Sync {
    fn score(&self, result: &MatchResult) -> f64;
}

/// Score by degree alone, one weight per lattice element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DegreeScorer {
    pub exact: f64,
    pub plugin: f64,
    pub subsume: f64,
    pub partial_plugin: f64,
    pub partial_subsume: f64,
    pub fail: f64,
}

impl Default for DegreeScorer {
    fn default() -> Self {
        Self {
            exact: 1.0,
            plugin: 0.8,
            subsume: 0.6,
            partial_plugin: 0.4,
            partial_subsume: 0.2,
            fail: 0.0,
        }
    }
}

impl DegreeScorer {
    pub fn weight(&self, degree: IoMatchType) -> f64 {
        match degree {
            IoMatchType::Exact => self.exact,
            IoMatchType::Plugin => self.plugin,
            IoMatchType::Subsume => self.subsume,
            IoMatchType::PartialPlugin => self.partial_plugin,
            IoMatchType::PartialSubsume => self.partial_subsume,
            IoMatchType::Fail => self.fail,
        }
    }

    /// Weights must be finite and non-negative.
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("exact", self.exact),
            ("plugin", self.plugin),
            ("subsume", self.subsume),
            ("partial_plugin", self.partial_plugin),
            ("partial_subsume", self.partial_subsume),
            ("fail", self.fail),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(format!("ranking weight `{name}` must be a finite value >= 0.0"));
            }
        }
        Ok(())
    }
}

impl Scorer for DegreeScorer {
    fn score(&self, result: &MatchResult) -> f64 {
        self.weight(result.match_type())
    }
}

/// Score every result and order them best first: by score, then degree,
/// then ascending resource IRI. Results that already carry a score keep it.
pub fn rank<S>(results: impl IntoIterator<Item = MatchResult>, scorer: &S) -> Vec<MatchResult>
where
    S: Scorer + ?Sized,
{
    let mut ranked: Vec<MatchResult> = results
        .into_iter()
        .map(|mut result| {
            if result.score().is_none() {
                let score = scorer.score(&result);
                if let Err(err) = result.set_score(score) {
                    debug!(resource = %err.0, "rank_score_already_set");
                }
            }
            result
        })
        .collect();
    ranked.sort_by(compare_ranked);
    ranked
}

fn compare_ranked(a: &MatchResult, b: &MatchResult) -> Ordering {
    let score_a = a.score().unwrap_or(0.0);
    let score_b = b.score().unwrap_or(0.0);
    score_b
        .total_cmp(&score_a)
        .then_with(|| b.match_type().cmp(&a.match_type()))
        .then_with(|| a.matched_resource().cmp(b.matched_resource()))
}

/// Drop results weaker than `worst`.
pub fn filter_at_least(
    results: BTreeMap<Iri, MatchResult>,
    worst: IoMatchType,
) -> BTreeMap<Iri, MatchResult> {
    results
        .into_iter()
        .filter(|(_, result)| result.match_type() >= worst)
        .collect()
}

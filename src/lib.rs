//! Workspace umbrella crate for semantic service discovery.
//!
//! The member crates do the work:
//!
//! - `lattice`: match degrees, match results and the combinators over them.
//! - `oracle`: the subsumption oracle and operation catalogue interfaces,
//!   plus an in-memory knowledge base loadable from snapshots.
//! - `matcher`: subsumption-based concept matching.
//! - `discovery`: direct and forward-chaining operation and service
//!   discovery, and ranking.
//!
//! This crate re-exports their public surface and adds a [`DiscoveryEngine`]
//! that wires them together from a [`SemdiscConfig`], a retry layer for
//! remote oracles ([`RetryingOracle`]), and the YAML config loader.
//!
//! ```no_run
//! use std::collections::BTreeSet;
//! use semdisc::{DiscoveryEngine, Iri, SemdiscConfig};
//!
//! # async fn run() -> Result<(), semdisc::EngineError> {
//! let config = SemdiscConfig::from_file("semdisc.yaml")?;
//! let engine = DiscoveryEngine::from_config(&config)?;
//! let start: BTreeSet<Iri> = [Iri::new("urn:Car")].into_iter().collect();
//! let outcome = engine.reachable_operations(&start).await?;
//! for result in engine.rank(outcome.operations.into_values()) {
//!     println!("{} {}", result.matched_resource(), result.match_type());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod resilience;

pub use crate::config::{
    ConfigLoadError, LoggingYamlConfig, OracleYamlConfig, SemdiscConfig,
};
pub use crate::resilience::{RetryConfig, RetryingOracle};

pub use discovery::{
    filter_at_least, rank, set_discovery_metrics, Completion, DegreeScorer, DiscoveryConfig,
    DiscoveryError, DiscoveryMetrics, DiscoveryMode, DiscoveryOutcome, DiscoveryState,
    IncompleteReason, OperationDiscoverer, PassSummary, Scorer, ServiceDiscoverer,
    ServiceDiscoveryOutcome, INVOCABILITY_THRESHOLD,
};
pub use lattice::{
    combine, combine_single, AtomicMatch, ClassMatchType, Combinator, CombinatorError,
    CompositeMatch, IoMatchType, Iri, MatchMultimap, MatchResult, MatchTable, MultimapMerger,
    ScoreAlreadySet,
};
pub use matcher::{
    classify_categories, set_match_metrics, ConceptMatcher, DegreeRange, MatchError,
    MatchMetrics, SubsumptionMatcher, CATEGORY_COVER_THRESHOLD,
};
pub use oracle::{
    ConceptRole, InMemoryKnowledgeBase, KnowledgeBaseBuilder, KnowledgeBaseConfig,
    KnowledgeBaseSnapshot, OperationCatalogue, OperationEntry, OracleError, ServiceEntry,
    SubsumptionOracle, TimeoutOracle,
};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

/// Any failure surfaced by the engine facade.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("match error: {0}")]
    Match(#[from] MatchError),

    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("combinator error: {0}")]
    Combinator(#[from] CombinatorError),
}

impl EngineError {
    /// Whether retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            EngineError::Oracle(err) => err.is_transient(),
            EngineError::Match(err) => err.is_transient(),
            EngineError::Discovery(err) => err.is_transient(),
            EngineError::Config(_) | EngineError::Combinator(_) => false,
        }
    }
}

/// Matcher, discoverers and ranking policy over one oracle and catalogue.
///
/// Cheap to clone and safe to share: every request builds its own working
/// state and the collaborators are read-only.
#[derive(Clone)]
pub struct DiscoveryEngine {
    matcher: Arc<dyn ConceptMatcher>,
    services: ServiceDiscoverer,
    scorer: DegreeScorer,
}

impl DiscoveryEngine {
    pub fn new(
        oracle: Arc<dyn SubsumptionOracle>,
        catalogue: Arc<dyn OperationCatalogue>,
        config: DiscoveryConfig,
        scorer: DegreeScorer,
    ) -> Result<Self, EngineError> {
        scorer.validate().map_err(ConfigLoadError::Validation)?;
        let matcher: Arc<dyn ConceptMatcher> = Arc::new(SubsumptionMatcher::new(oracle.clone()));
        let operations = OperationDiscoverer::new(matcher.clone(), oracle, catalogue, config)?;
        Ok(Self {
            matcher,
            services: ServiceDiscoverer::new(operations),
            scorer,
        })
    }

    /// Engine over a knowledge base that serves as both oracle and catalogue.
    pub fn from_knowledge_base(
        kb: Arc<InMemoryKnowledgeBase>,
        config: DiscoveryConfig,
    ) -> Result<Self, EngineError> {
        Self::new(kb.clone(), kb, config, DegreeScorer::default())
    }

    /// Build the knowledge base the config names and layer the configured
    /// per-call timeout and retry policy over it. Retries wrap timeouts, so
    /// every attempt gets the full per-call budget.
    pub fn from_config(config: &SemdiscConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let kb = config.knowledge_base.build()?;
        info!(
            concepts = kb.concept_count(),
            operations = kb.operation_count(),
            services = kb.service_count(),
            "knowledge_base_ready"
        );

        let mut oracle: Arc<dyn SubsumptionOracle> = kb.clone();
        let mut catalogue: Arc<dyn OperationCatalogue> = kb;
        if let Some(per_call) = config.oracle.call_timeout() {
            oracle = Arc::new(TimeoutOracle::new(oracle, per_call));
            catalogue = Arc::new(TimeoutOracle::new(catalogue, per_call));
        }
        let retry = config.oracle.retry;
        if retry.max_retries > 0 {
            oracle = Arc::new(RetryingOracle::new(oracle, retry));
            catalogue = Arc::new(RetryingOracle::new(catalogue, retry));
        }

        Self::new(
            oracle,
            catalogue,
            config.discovery,
            config.ranking,
        )
    }

    pub fn matcher(&self) -> &Arc<dyn ConceptMatcher> {
        &self.matcher
    }

    pub fn operations(&self) -> &OperationDiscoverer {
        self.services.operations()
    }

    pub fn services(&self) -> &ServiceDiscoverer {
        &self.services
    }

    pub fn scorer(&self) -> &DegreeScorer {
        &self.scorer
    }

    pub async fn match_concepts(
        &self,
        origin: &Iri,
        destination: &Iri,
    ) -> Result<MatchResult, EngineError> {
        Ok(self.matcher.match_concepts(origin, destination).await?)
    }

    pub async fn discover_operations(
        &self,
        concepts: &BTreeSet<Iri>,
        mode: DiscoveryMode,
    ) -> Result<BTreeMap<Iri, MatchResult>, EngineError> {
        Ok(self.operations().discover_operations(concepts, mode).await?)
    }

    pub async fn reachable_operations(
        &self,
        initial: &BTreeSet<Iri>,
    ) -> Result<DiscoveryOutcome, EngineError> {
        Ok(self.operations().discover_reachable_operations(initial).await?)
    }

    pub async fn discover_services(
        &self,
        concepts: &BTreeSet<Iri>,
        mode: DiscoveryMode,
    ) -> Result<BTreeMap<Iri, MatchResult>, EngineError> {
        Ok(self.services.discover_services(concepts, mode).await?)
    }

    pub async fn reachable_services(
        &self,
        initial: &BTreeSet<Iri>,
    ) -> Result<ServiceDiscoveryOutcome, EngineError> {
        Ok(self.services.discover_reachable_services(initial).await?)
    }

    pub async fn classify_services(
        &self,
        goal_categories: &BTreeSet<Iri>,
    ) -> Result<BTreeMap<Iri, ClassMatchType>, EngineError> {
        Ok(self.services.classify_services(goal_categories).await?)
    }

    /// Rank with the configured weights.
    pub fn rank(&self, results: impl IntoIterator<Item = MatchResult>) -> Vec<MatchResult> {
        rank(results, &self.scorer)
    }
}

//! # semdisc discovery (`discovery`)
//!
//! Operation and service discovery over a [`ConceptMatcher`](matcher::ConceptMatcher).
//!
//! Two families of queries:
//!
//! - **Direct**: [`OperationDiscoverer::discover_operations`] and the
//!   `find_operations_{consuming,producing,classified_by}_{all,some}`
//!   helpers. One round of candidate lookup and re-validation, no closure.
//! - **Reachability**: [`OperationDiscoverer::discover_reachable_operations`]
//!   forward-chains from a set of available concepts. Each pass invokes every
//!   operation that becomes invocable and feeds its outputs back in, until a
//!   pass contributes no new concept. The result carries a [`Completion`]
//!   flag so a deadline-truncated run is never mistaken for a closed one.
//!
//! [`ServiceDiscoverer`] lifts both to owning services and adds
//! classification-set matching. [`rank`] orders results for presentation.
//!
//! ## Observability
//!
//! Every reachability request runs inside a `discovery.reachable` tracing
//! span. Install a [`DiscoveryMetrics`] observer via
//! [`set_discovery_metrics`] for latency, pass and completion counts.

mod cache;
mod fixpoint;
mod metrics;
mod operations;
mod ranking;
pub mod serde_millis;
mod services;
mod types;

#[cfg(test)]
mod testing;

pub use crate::fixpoint::DiscoveryState;
pub use crate::metrics::{set_discovery_metrics, DiscoveryMetrics};
pub use crate::operations::OperationDiscoverer;
pub use crate::ranking::{filter_at_least, rank, DegreeScorer, Scorer};
pub use crate::services::{ServiceDiscoverer, ServiceDiscoveryOutcome};
pub use crate::types::{
    Completion, DiscoveryConfig, DiscoveryError, DiscoveryMode, DiscoveryOutcome,
    IncompleteReason, PassSummary, INVOCABILITY_THRESHOLD,
};

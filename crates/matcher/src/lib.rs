//! # semdisc matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` turns subsumption facts from an ontology oracle into match
//! degrees on the [`IoMatchType`](lattice::IoMatchType) lattice. Discovery
//! builds on it to decide which operations a set of available concepts can
//! invoke.
//!
//! ## Core Types
//!
//! - [`ConceptMatcher`]: the async matching contract (pairwise, cross
//!   product, and degree-range enumeration).
//! - [`SubsumptionMatcher`]: the implementation over an
//!   `Arc<dyn SubsumptionOracle>`. Pairwise degrees follow
//!   - both directions subsume → `Exact`
//!   - origin ⊑ destination only → `Plugin`
//!   - destination ⊑ origin only → `Subsume`
//!   - neither → `Fail`
//! - [`classify_categories`]: classification-set matching on the
//!   [`ClassMatchType`](lattice::ClassMatchType) lattice.
//! - [`MatchError`]: oracle unavailability with the concept pair attached.
//!   Unknown concepts are `Fail` evidence, never errors.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use lattice::{IoMatchType, Iri};
//! use matcher::{ConceptMatcher, SubsumptionMatcher};
//! use oracle::InMemoryKnowledgeBase;
//!
//! # tokio_test_block(async {
//! let kb = InMemoryKnowledgeBase::builder()
//!     .subclass("urn:Car", "urn:Vehicle")
//!     .build()
//!     .unwrap();
//! let matcher = SubsumptionMatcher::new(Arc::new(kb));
//!
//! let result = matcher
//!     .match_concepts(&Iri::new("urn:Car"), &Iri::new("urn:Vehicle"))
//!     .await
//!     .unwrap();
//! assert_eq!(result.match_type(), IoMatchType::Plugin);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to record
//! per-pair latency and produced degrees. This is typically done once during
//! service startup so every matcher shares the same metrics backend.

pub mod category;
pub mod engine;
pub mod metrics;
pub mod types;

pub use crate::category::{classify_categories, CATEGORY_COVER_THRESHOLD};
pub use crate::engine::{ConceptMatcher, SubsumptionMatcher};
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::types::{DegreeRange, MatchError};

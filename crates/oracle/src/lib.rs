//! # semdisc oracle (`oracle`)
//!
//! The two external collaborators the discovery engine consults, expressed as
//! async traits so that a reasoner behind a network hop and an in-process
//! table look the same to callers:
//!
//! - [`SubsumptionOracle`]: concept membership and the subclass relation,
//!   plus the two operation/concept lookups discovery needs.
//! - [`OperationCatalogue`]: enumeration of operations and services.
//!
//! [`InMemoryKnowledgeBase`] implements both over a precomputed closure and
//! can be loaded from a [`KnowledgeBaseSnapshot`] (JSON or YAML).
//! [`TimeoutOracle`] bounds every call of any implementation.
//!
//! Implementations must be safe for concurrent read-only use.

use std::collections::BTreeSet;

use async_trait::async_trait;
use lattice::Iri;

mod backend;
mod error;
mod memory;
mod snapshot;
mod timeout;
mod types;

pub use crate::backend::KnowledgeBaseConfig;
pub use crate::error::OracleError;
pub use crate::memory::{InMemoryKnowledgeBase, KnowledgeBaseBuilder};
pub use crate::snapshot::{ConceptDecl, KnowledgeBaseSnapshot, OperationDecl, ServiceDecl};
pub use crate::timeout::TimeoutOracle;
pub use crate::types::{ConceptRole, OperationEntry, ServiceEntry};

/// Ontology reasoning backend.
///
/// Subclass tests are reflexive: every known concept is a subclass of itself.
/// Unknown concepts are never errors; `is_subclass_of` answers `false` and
/// the enumerations answer empty.
#[async_trait]
pub trait SubsumptionOracle: Send + Sync {
    async fn is_known(&self, concept: &Iri) -> Result<bool, OracleError>;

    /// `true` when `sub` ⊑ `sup`.
    async fn is_subclass_of(&self, sub: &Iri, sup: &Iri) -> Result<bool, OracleError>;

    /// Strict subclasses of `concept` (all depths, excluding itself).
    async fn subclasses_of(&self, concept: &Iri) -> Result<BTreeSet<Iri>, OracleError>;

    /// Strict superclasses of `concept` (all depths, excluding itself).
    async fn superclasses_of(&self, concept: &Iri) -> Result<BTreeSet<Iri>, OracleError>;

    async fn known_concepts(&self) -> Result<BTreeSet<Iri>, OracleError>;

    /// Concepts an operation declares for `role`. Unknown operations resolve
    /// to the empty set.
    async fn resolve_concepts_for_operation(
        &self,
        operation: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError>;

    /// Operations that declare `concept` (exactly, not by subsumption) for
    /// `role`.
    async fn find_operations_referencing(
        &self,
        concept: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError>;
}

/// Read-only operation and service registry.
#[async_trait]
pub trait OperationCatalogue: Send + Sync {
    async fn get_operation(&self, operation: &Iri) -> Result<Option<OperationEntry>, OracleError>;

    /// All operations in ascending IRI order.
    async fn list_operations(&self) -> Result<Vec<OperationEntry>, OracleError>;

    async fn get_service(&self, service: &Iri) -> Result<Option<ServiceEntry>, OracleError>;

    /// All services in ascending IRI order.
    async fn list_services(&self) -> Result<Vec<ServiceEntry>, OracleError>;
}

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lattice::Iri;
use matcher::SubsumptionMatcher;
use oracle::{
    ConceptRole, InMemoryKnowledgeBase, OperationCatalogue, OperationEntry, OracleError,
    ServiceEntry, SubsumptionOracle,
};

use crate::operations::OperationDiscoverer;
use crate::types::DiscoveryConfig;

pub(crate) fn iri(s: &str) -> Iri {
    Iri::new(s)
}

pub(crate) fn set(items: &[&str]) -> BTreeSet<Iri> {
    items.iter().map(|s| iri(s)).collect()
}

pub(crate) fn discoverer(kb: InMemoryKnowledgeBase, config: DiscoveryConfig) -> OperationDiscoverer {
    let kb = Arc::new(kb);
    OperationDiscoverer::new(
        Arc::new(SubsumptionMatcher::new(kb.clone())),
        kb.clone(),
        kb,
        config,
    )
    .expect("valid config")
}

/// The two-step chain: op1 {c1, c2} -> {c3}, op2 {c3} -> {c4}.
pub(crate) fn chain() -> InMemoryKnowledgeBase {
    InMemoryKnowledgeBase::builder()
        .service(ServiceEntry::new("urn:svc/Chain"))
        .operation(
            OperationEntry::new("urn:op1")
                .with_inputs(["urn:c1", "urn:c2"])
                .with_outputs(["urn:c3"])
                .with_service("urn:svc/Chain"),
        )
        .operation(
            OperationEntry::new("urn:op2")
                .with_inputs(["urn:c3"])
                .with_outputs(["urn:c4"])
                .with_service("urn:svc/Chain"),
        )
        .build()
        .expect("knowledge base")
}

/// Delegates to a knowledge base, sleeping before every subclass test.
pub(crate) struct SlowOracle {
    pub(crate) inner: Arc<InMemoryKnowledgeBase>,
    pub(crate) delay: Duration,
}

#[async_trait]
impl SubsumptionOracle for SlowOracle {
    async fn is_known(&self, c: &Iri) -> Result<bool, OracleError> {
        self.inner.is_known(c).await
    }
    async fn is_subclass_of(&self, a: &Iri, b: &Iri) -> Result<bool, OracleError> {
        tokio::time::sleep(self.delay).await;
        self.inner.is_subclass_of(a, b).await
    }
    async fn subclasses_of(&self, c: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
        self.inner.subclasses_of(c).await
    }
    async fn superclasses_of(&self, c: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
        self.inner.superclasses_of(c).await
    }
    async fn known_concepts(&self) -> Result<BTreeSet<Iri>, OracleError> {
        self.inner.known_concepts().await
    }
    async fn resolve_concepts_for_operation(
        &self,
        op: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError> {
        self.inner.resolve_concepts_for_operation(op, role).await
    }
    async fn find_operations_referencing(
        &self,
        c: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError> {
        self.inner.find_operations_referencing(c, role).await
    }
}

/// Fails subclass tests that involve one poisoned concept.
pub(crate) struct FlakyOracle {
    pub(crate) inner: Arc<InMemoryKnowledgeBase>,
    pub(crate) poisoned: Iri,
}

#[async_trait]
impl SubsumptionOracle for FlakyOracle {
    async fn is_known(&self, c: &Iri) -> Result<bool, OracleError> {
        self.inner.is_known(c).await
    }
    async fn is_subclass_of(&self, a: &Iri, b: &Iri) -> Result<bool, OracleError> {
        if *a == self.poisoned || *b == self.poisoned {
            return Err(OracleError::Unavailable("reasoner dropped the query".into()));
        }
        self.inner.is_subclass_of(a, b).await
    }
    async fn subclasses_of(&self, c: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
        self.inner.subclasses_of(c).await
    }
    async fn superclasses_of(&self, c: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
        self.inner.superclasses_of(c).await
    }
    async fn known_concepts(&self) -> Result<BTreeSet<Iri>, OracleError> {
        self.inner.known_concepts().await
    }
    async fn resolve_concepts_for_operation(
        &self,
        op: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError> {
        self.inner.resolve_concepts_for_operation(op, role).await
    }
    async fn find_operations_referencing(
        &self,
        c: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError> {
        self.inner.find_operations_referencing(c, role).await
    }
}

/// Catalogue that takes `delay` to list its operations.
pub(crate) struct SlowCatalogue {
    pub(crate) inner: Arc<InMemoryKnowledgeBase>,
    pub(crate) delay: Duration,
}

#[async_trait]
impl OperationCatalogue for SlowCatalogue {
    async fn get_operation(&self, op: &Iri) -> Result<Option<OperationEntry>, OracleError> {
        self.inner.get_operation(op).await
    }
    async fn list_operations(&self) -> Result<Vec<OperationEntry>, OracleError> {
        tokio::time::sleep(self.delay).await;
        self.inner.list_operations().await
    }
    async fn get_service(&self, service: &Iri) -> Result<Option<ServiceEntry>, OracleError> {
        self.inner.get_service(service).await
    }
    async fn list_services(&self) -> Result<Vec<ServiceEntry>, OracleError> {
        self.inner.list_services().await
    }
}

/// Discoverer whose matcher runs over `oracle` while the catalogue stays
/// the plain knowledge base.
pub(crate) fn discoverer_over(
    oracle: Arc<dyn SubsumptionOracle>,
    catalogue: Arc<dyn OperationCatalogue>,
    config: DiscoveryConfig,
) -> OperationDiscoverer {
    OperationDiscoverer::new(
        Arc::new(SubsumptionMatcher::new(oracle.clone())),
        oracle,
        catalogue,
        config,
    )
    .expect("valid config")
}

/// Dealer/insurer catalogue over a small vehicle taxonomy.
pub(crate) fn vehicles() -> InMemoryKnowledgeBase {
    InMemoryKnowledgeBase::builder()
        .subclass("urn:Car", "urn:Vehicle")
        .subclass("urn:SportsCar", "urn:Car")
        .subclass("urn:MarketPrice", "urn:Price")
        .subclass("urn:cat/Sales", "urn:cat/Automotive")
        .subclass("urn:cat/Insurance", "urn:cat/Finance")
        .service(ServiceEntry::new("urn:svc/Dealer").with_classification(["urn:cat/Sales"]))
        .service(ServiceEntry::new("urn:svc/Insurer").with_classification(["urn:cat/Finance"]))
        .operation(
            OperationEntry::new("urn:op/quote")
                .with_inputs(["urn:Car"])
                .with_outputs(["urn:Price"])
                .with_classification(["urn:cat/Sales"])
                .with_service("urn:svc/Dealer"),
        )
        .operation(
            OperationEntry::new("urn:op/appraise")
                .with_inputs(["urn:Car"])
                .with_outputs(["urn:MarketPrice"])
                .with_service("urn:svc/Dealer"),
        )
        .operation(
            OperationEntry::new("urn:op/insure")
                .with_inputs(["urn:Vehicle", "urn:Driver"])
                .with_outputs(["urn:Policy"])
                .with_classification(["urn:cat/Insurance"])
                .with_service("urn:svc/Insurer"),
        )
        .operation(
            OperationEntry::new("urn:op/tune")
                .with_inputs(["urn:SportsCar"])
                .with_outputs(["urn:SportsCar"]),
        )
        .build()
        .expect("knowledge base")
}

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lattice::Iri;
use tracing::warn;

use crate::error::OracleError;
use crate::types::{ConceptRole, OperationEntry, ServiceEntry};
use crate::{OperationCatalogue, SubsumptionOracle};

/// Bounds every call to the wrapped oracle or catalogue by a fixed budget.
/// An overrun surfaces as [`OracleError::Timeout`] and the call is abandoned.
pub struct TimeoutOracle<T: ?Sized> {
    inner: Arc<T>,
    per_call: Duration,
}

impl<T: ?Sized> TimeoutOracle<T> {
    pub fn new(inner: Arc<T>, per_call: Duration) -> Self {
        Self { inner, per_call }
    }

    pub fn per_call(&self) -> Duration {
        self.per_call
    }

    async fn bounded<R>(
        &self,
        call: &'static str,
        fut: impl Future<Output = Result<R, OracleError>> + Send,
    ) -> Result<R, OracleError> {
        match tokio::time::timeout(self.per_call, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(call, budget_ms = self.per_call.as_millis() as u64, "oracle_call_timed_out");
                Err(OracleError::Timeout {
                    call,
                    after: self.per_call,
                })
            }
        }
    }
}

#[async_trait]
impl<T> SubsumptionOracle for TimeoutOracle<T>
where
    T: SubsumptionOracle + ?Sized,
{
    async fn is_known(&self, concept: &Iri) -> Result<bool, OracleError> {
        self.bounded("is_known", self.inner.is_known(concept)).await
    }

    async fn is_subclass_of(&self, sub: &Iri, sup: &Iri) -> Result<bool, OracleError> {
        self.bounded("is_subclass_of", self.inner.is_subclass_of(sub, sup))
            .await
    }

    async fn subclasses_of(&self, concept: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
        self.bounded("subclasses_of", self.inner.subclasses_of(concept))
            .await
    }

    async fn superclasses_of(&self, concept: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
        self.bounded("superclasses_of", self.inner.superclasses_of(concept))
            .await
    }

    async fn known_concepts(&self) -> Result<BTreeSet<Iri>, OracleError> {
        self.bounded("known_concepts", self.inner.known_concepts()).await
    }

    async fn resolve_concepts_for_operation(
        &self,
        operation: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError> {
        self.bounded(
            "resolve_concepts_for_operation",
            self.inner.resolve_concepts_for_operation(operation, role),
        )
        .await
    }

    async fn find_operations_referencing(
        &self,
        concept: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError> {
        self.bounded(
            "find_operations_referencing",
            self.inner.find_operations_referencing(concept, role),
        )
        .await
    }
}

#[async_trait]
impl<T> OperationCatalogue for TimeoutOracle<T>
where
    T: OperationCatalogue + ?Sized,
{
    async fn get_operation(&self, operation: &Iri) -> Result<Option<OperationEntry>, OracleError> {
        self.bounded("get_operation", self.inner.get_operation(operation))
            .await
    }

    async fn list_operations(&self) -> Result<Vec<OperationEntry>, OracleError> {
        self.bounded("list_operations", self.inner.list_operations()).await
    }

    async fn get_service(&self, service: &Iri) -> Result<Option<ServiceEntry>, OracleError> {
        self.bounded("get_service", self.inner.get_service(service)).await
    }

    async fn list_services(&self) -> Result<Vec<ServiceEntry>, OracleError> {
        self.bounded("list_services", self.inner.list_services()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryKnowledgeBase;

    struct Stalled;

    #[async_trait]
    impl SubsumptionOracle for Stalled {
        async fn is_known(&self, _: &Iri) -> Result<bool, OracleError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(true)
        }
        async fn is_subclass_of(&self, _: &Iri, _: &Iri) -> Result<bool, OracleError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(true)
        }
        async fn subclasses_of(&self, _: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
            Ok(BTreeSet::new())
        }
        async fn superclasses_of(&self, _: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
            Ok(BTreeSet::new())
        }
        async fn known_concepts(&self) -> Result<BTreeSet<Iri>, OracleError> {
            Ok(BTreeSet::new())
        }
        async fn resolve_concepts_for_operation(
            &self,
            _: &Iri,
            _: ConceptRole,
        ) -> Result<BTreeSet<Iri>, OracleError> {
            Ok(BTreeSet::new())
        }
        async fn find_operations_referencing(
            &self,
            _: &Iri,
            _: ConceptRole,
        ) -> Result<BTreeSet<Iri>, OracleError> {
            Ok(BTreeSet::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_calls_become_timeouts() {
        let oracle = TimeoutOracle::new(Arc::new(Stalled), Duration::from_millis(250));
        let err = oracle
            .is_subclass_of(&Iri::new("urn:a"), &Iri::new("urn:b"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            OracleError::Timeout {
                call: "is_subclass_of",
                after: Duration::from_millis(250)
            }
        );
        assert!(oracle.known_concepts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fast_calls_pass_through_for_trait_objects() {
        let kb: Arc<dyn SubsumptionOracle> = Arc::new(
            InMemoryKnowledgeBase::builder()
                .subclass("urn:a", "urn:b")
                .build()
                .unwrap(),
        );
        let oracle = TimeoutOracle::new(kb, Duration::from_secs(1));
        assert!(oracle
            .is_subclass_of(&Iri::new("urn:a"), &Iri::new("urn:b"))
            .await
            .unwrap());
    }
}

//! Retry with exponential backoff for transient oracle failures.
//!
//! The core crates never retry: an unavailable oracle surfaces as an error
//! and the caller decides. [`RetryingOracle`] is that decision for callers
//! talking to a remote reasoner, and retries only errors that
//! [`OracleError::is_transient`] reports as transient.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lattice::Iri;
use oracle::{
    ConceptRole, OperationCatalogue, OperationEntry, OracleError, ServiceEntry, SubsumptionOracle,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Backoff policy for [`RetryingOracle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further one.
    #[serde(with = "discovery::serde_millis", rename = "base_delay_ms")]
    pub base_delay: Duration,
    #[serde(with = "discovery::serde_millis", rename = "max_delay_ms")]
    pub max_delay: Duration,
    /// Add up to 50% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base_delay > self.max_delay {
            return Err("retry base_delay_ms must not exceed max_delay_ms".into());
        }
        Ok(())
    }

    /// Delay before retry number `attempt + 1`, capped at `max_delay`
    /// before jitter is added.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as u64;
        let exponential = base.saturating_mul(2_u64.saturating_pow(attempt));
        let delay = exponential.min(self.max_delay.as_millis() as u64);

        if self.jitter {
            let jitter = fastrand::u64(0..=delay / 2);
            Duration::from_millis(delay + jitter)
        } else {
            Duration::from_millis(delay)
        }
    }
}

/// Wraps an oracle or catalogue and retries transient failures according to
/// a [`RetryConfig`]. Permanent errors pass through on the first attempt.
pub struct RetryingOracle<T: ?Sized> {
    inner: Arc<T>,
    config: RetryConfig,
}

impl<T: ?Sized> RetryingOracle<T> {
    pub fn new(inner: Arc<T>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    async fn retry<R, F, Fut>(&self, call: &'static str, mut op: F) -> Result<R, OracleError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<R, OracleError>> + Send,
        R: Send,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.config.max_retries => {
                    let delay = self.config.delay_for(attempt);
                    warn!(
                        call,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "oracle_call_retry"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl<T> SubsumptionOracle for RetryingOracle<T>
where
    T: SubsumptionOracle + ?Sized,
{
    async fn is_known(&self, concept: &Iri) -> Result<bool, OracleError> {
        self.retry("is_known", || self.inner.is_known(concept)).await
    }

    async fn is_subclass_of(&self, sub: &Iri, sup: &Iri) -> Result<bool, OracleError> {
        self.retry("is_subclass_of", || self.inner.is_subclass_of(sub, sup))
            .await
    }

    async fn subclasses_of(&self, concept: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
        self.retry("subclasses_of", || self.inner.subclasses_of(concept))
            .await
    }

    async fn superclasses_of(&self, concept: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
        self.retry("superclasses_of", || self.inner.superclasses_of(concept))
            .await
    }

    async fn known_concepts(&self) -> Result<BTreeSet<Iri>, OracleError> {
        self.retry("known_concepts", || self.inner.known_concepts()).await
    }

    async fn resolve_concepts_for_operation(
        &self,
        operation: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError> {
        self.retry("resolve_concepts_for_operation", || {
            self.inner.resolve_concepts_for_operation(operation, role)
        })
        .await
    }

    async fn find_operations_referencing(
        &self,
        concept: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError> {
        self.retry("find_operations_referencing", || {
            self.inner.find_operations_referencing(concept, role)
        })
        .await
    }
}

#[async_trait]
impl<T> OperationCatalogue for RetryingOracle<T>
where
    T: OperationCatalogue + ?Sized,
{
    async fn get_operation(&self, operation: &Iri) -> Result<Option<OperationEntry>, OracleError> {
        self.retry("get_operation", || self.inner.get_operation(operation))
            .await
    }

    async fn list_operations(&self) -> Result<Vec<OperationEntry>, OracleError> {
        self.retry("list_operations", || self.inner.list_operations()).await
    }

    async fn get_service(&self, service: &Iri) -> Result<Option<ServiceEntry>, OracleError> {
        self.retry("get_service", || self.inner.get_service(service)).await
    }

    async fn list_services(&self) -> Result<Vec<ServiceEntry>, OracleError> {
        self.retry("list_services", || self.inner.list_services()).await
    }
}

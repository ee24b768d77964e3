use std::collections::{BTreeMap, BTreeSet};

use lattice::{combine, ClassMatchType, Combinator, Iri, MatchResult};
use matcher::classify_categories;
use tracing::debug;

use crate::operations::OperationDiscoverer;
use crate::types::{DiscoveryError, DiscoveryMode, DiscoveryOutcome};

/// Service-level view of [`OperationDiscoverer`]: a service matches as well
/// as its best matching operation (UNION over its operations).
#[derive(Clone)]
pub struct ServiceDiscoverer {
    operations: OperationDiscoverer,
}

/// Reachability lifted to services.
#[derive(Debug, Clone)]
pub struct ServiceDiscoveryOutcome {
    pub services: BTreeMap<Iri, MatchResult>,
    /// The operation-level run the services were derived from.
    pub operations: DiscoveryOutcome,
}

impl ServiceDiscoverer {
    pub fn new(operations: OperationDiscoverer) -> Self {
        Self { operations }
    }

    pub fn operations(&self) -> &OperationDiscoverer {
        &self.operations
    }

    pub async fn discover_services(
        &self,
        concepts: &BTreeSet<Iri>,
        mode: DiscoveryMode,
    ) -> Result<BTreeMap<Iri, MatchResult>, DiscoveryError> {
        let per_operation = self.operations.discover_operations(concepts, mode).await?;
        self.lift(per_operation).await
    }

    pub async fn discover_reachable_services(
        &self,
        initial: &BTreeSet<Iri>,
    ) -> Result<ServiceDiscoveryOutcome, DiscoveryError> {
        let outcome = self
            .operations
            .discover_reachable_operations(initial)
            .await?;
        let services = self.lift(outcome.operations.clone()).await?;
        Ok(ServiceDiscoveryOutcome {
            services,
            operations: outcome,
        })
    }

    /// Classification-set verdict for every catalogued service whose
    /// categories overlap `goal_categories`.
    pub async fn classify_services(
        &self,
        goal_categories: &BTreeSet<Iri>,
    ) -> Result<BTreeMap<Iri, ClassMatchType>, DiscoveryError> {
        let services = self
            .operations
            .catalogue
            .list_services()
            .await
            .map_err(DiscoveryError::catalogue(0))?;
        let mut verdicts = BTreeMap::new();
        for service in services {
            let verdict = classify_categories(
                self.operations.matcher.as_ref(),
                goal_categories,
                &service.classification,
            )
            .await
            .map_err(DiscoveryError::matcher(0))?;
            if let Some(verdict) = verdict {
                verdicts.insert(service.iri, verdict);
            }
        }
        Ok(verdicts)
    }

    /// Re-key operation results by owning service and UNION them. Operations
    /// without a service are left out.
    async fn lift(
        &self,
        per_operation: BTreeMap<Iri, MatchResult>,
    ) -> Result<BTreeMap<Iri, MatchResult>, DiscoveryError> {
        let mut lifted = Vec::with_capacity(per_operation.len());
        for (operation, result) in per_operation {
            let entry = self
                .operations
                .catalogue
                .get_operation(&operation)
                .await
                .map_err(DiscoveryError::catalogue(0))?;
            let Some(service) = entry.and_then(|e| e.service) else {
                debug!(operation = %operation, "operation_without_service");
                continue;
            };
            lifted.push(MatchResult::atomic(
                service,
                operation.clone(),
                result.match_type(),
                format!("operation {operation}: {}", result.explanation()),
            ));
        }
        Ok(combine(lifted, Combinator::Union))
    }
}

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use async_trait::async_trait;
use lattice::Iri;
use tracing::debug;

use crate::error::OracleError;
use crate::types::{ConceptRole, OperationEntry, ServiceEntry};
use crate::{OperationCatalogue, SubsumptionOracle};

/// Accumulates concepts, subclass edges, services and operations, then
/// validates them into an [`InMemoryKnowledgeBase`].
#[derive(Debug, Default, Clone)]
pub struct KnowledgeBaseBuilder {
    parents: BTreeMap<Iri, BTreeSet<Iri>>,
    services: Vec<ServiceEntry>,
    operations: Vec<OperationEntry>,
}

impl KnowledgeBaseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a concept with no superclasses (beyond itself).
    pub fn concept(mut self, concept: impl Into<Iri>) -> Self {
        self.parents.entry(concept.into()).or_default();
        self
    }

    /// Declare `sub` ⊑ `sup`. Both become known.
    pub fn subclass(mut self, sub: impl Into<Iri>, sup: impl Into<Iri>) -> Self {
        let sup = sup.into();
        self.parents.entry(sup.clone()).or_default();
        self.parents.entry(sub.into()).or_default().insert(sup);
        self
    }

    /// Declare `a` ≡ `b` as mutual subsumption.
    pub fn equivalent(self, a: impl Into<Iri>, b: impl Into<Iri>) -> Self {
        let (a, b) = (a.into(), b.into());
        self.subclass(a.clone(), b.clone()).subclass(b, a)
    }

    pub fn service(mut self, service: ServiceEntry) -> Self {
        self.services.push(service);
        self
    }

    pub fn operation(mut self, operation: OperationEntry) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn build(self) -> Result<InMemoryKnowledgeBase, OracleError> {
        let KnowledgeBaseBuilder {
            mut parents,
            services,
            operations,
        } = self;

        let mut service_map: BTreeMap<Iri, ServiceEntry> = BTreeMap::new();
        for service in services {
            if service.iri.is_empty() {
                return Err(OracleError::InvalidSnapshot("service with empty IRI".into()));
            }
            if service_map.contains_key(&service.iri) {
                return Err(OracleError::InvalidSnapshot(format!(
                    "duplicate service {}",
                    service.iri
                )));
            }
            service_map.insert(service.iri.clone(), service);
        }

        let mut operation_map: BTreeMap<Iri, OperationEntry> = BTreeMap::new();
        for mut operation in operations {
            if operation.iri.is_empty() {
                return Err(OracleError::InvalidSnapshot("operation with empty IRI".into()));
            }
            if operation_map.contains_key(&operation.iri) {
                return Err(OracleError::InvalidSnapshot(format!(
                    "duplicate operation {}",
                    operation.iri
                )));
            }
            // Membership may be declared on either side.
            if operation.service.is_none() {
                operation.service = service_map
                    .values()
                    .find(|s| s.operations.contains(&operation.iri))
                    .map(|s| s.iri.clone());
            }
            if let Some(service_iri) = &operation.service {
                let service = service_map.get_mut(service_iri).ok_or_else(|| {
                    OracleError::InvalidSnapshot(format!(
                        "operation {} references unknown service {}",
                        operation.iri, service_iri
                    ))
                })?;
                service.operations.insert(operation.iri.clone());
            }
            for concept in operation
                .inputs
                .iter()
                .chain(&operation.outputs)
                .chain(&operation.classification)
            {
                parents.entry(concept.clone()).or_default();
            }
            operation_map.insert(operation.iri.clone(), operation);
        }

        for service in service_map.values() {
            if let Some(missing) = service
                .operations
                .iter()
                .find(|op| !operation_map.contains_key(*op))
            {
                return Err(OracleError::InvalidSnapshot(format!(
                    "service {} lists unknown operation {}",
                    service.iri, missing
                )));
            }
            for concept in &service.classification {
                parents.entry(concept.clone()).or_default();
            }
        }

        let ancestors = close_over(&parents);
        let mut descendants: BTreeMap<Iri, BTreeSet<Iri>> = BTreeMap::new();
        for (concept, sups) in &ancestors {
            for sup in sups {
                descendants
                    .entry(sup.clone())
                    .or_default()
                    .insert(concept.clone());
            }
        }

        let mut references: BTreeMap<(ConceptRole, Iri), BTreeSet<Iri>> = BTreeMap::new();
        for operation in operation_map.values() {
            for role in [ConceptRole::Input, ConceptRole::Output, ConceptRole::Classification] {
                for concept in operation.concepts(role) {
                    references
                        .entry((role, concept.clone()))
                        .or_default()
                        .insert(operation.iri.clone());
                }
            }
        }

        debug!(
            concepts = ancestors.len(),
            operations = operation_map.len(),
            services = service_map.len(),
            "knowledge_base_built"
        );

        Ok(InMemoryKnowledgeBase {
            ancestors,
            descendants,
            operations: operation_map,
            services: service_map,
            references,
        })
    }
}

/// Reflexive-transitive closure of the declared parent edges. Cycles
/// collapse into mutual subsumption.
fn close_over(parents: &BTreeMap<Iri, BTreeSet<Iri>>) -> BTreeMap<Iri, BTreeSet<Iri>> {
    parents
        .keys()
        .map(|concept| {
            let mut seen = BTreeSet::new();
            let mut queue = VecDeque::from([concept.clone()]);
            while let Some(next) = queue.pop_front() {
                if !seen.insert(next.clone()) {
                    continue;
                }
                if let Some(ups) = parents.get(&next) {
                    queue.extend(ups.iter().filter(|u| !seen.contains(*u)).cloned());
                }
            }
            (concept.clone(), seen)
        })
        .collect()
}

/// Immutable knowledge base answering both collaborator traits from
/// precomputed tables. No locking: it is never mutated after build.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKnowledgeBase {
    ancestors: BTreeMap<Iri, BTreeSet<Iri>>,
    descendants: BTreeMap<Iri, BTreeSet<Iri>>,
    operations: BTreeMap<Iri, OperationEntry>,
    services: BTreeMap<Iri, ServiceEntry>,
    references: BTreeMap<(ConceptRole, Iri), BTreeSet<Iri>>,
}

impl InMemoryKnowledgeBase {
    pub fn builder() -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder::new()
    }

    pub fn concept_count(&self) -> usize {
        self.ancestors.len()
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    fn strict(set: Option<&BTreeSet<Iri>>, concept: &Iri) -> BTreeSet<Iri> {
        set.map(|s| s.iter().filter(|c| *c != concept).cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SubsumptionOracle for InMemoryKnowledgeBase {
    async fn is_known(&self, concept: &Iri) -> Result<bool, OracleError> {
        Ok(self.ancestors.contains_key(concept))
    }

    async fn is_subclass_of(&self, sub: &Iri, sup: &Iri) -> Result<bool, OracleError> {
        Ok(self
            .ancestors
            .get(sub)
            .is_some_and(|ups| ups.contains(sup)))
    }

    async fn subclasses_of(&self, concept: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
        Ok(Self::strict(self.descendants.get(concept), concept))
    }

    async fn superclasses_of(&self, concept: &Iri) -> Result<BTreeSet<Iri>, OracleError> {
        Ok(Self::strict(self.ancestors.get(concept), concept))
    }

    async fn known_concepts(&self) -> Result<BTreeSet<Iri>, OracleError> {
        Ok(self.ancestors.keys().cloned().collect())
    }

    async fn resolve_concepts_for_operation(
        &self,
        operation: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError> {
        Ok(self
            .operations
            .get(operation)
            .map(|op| op.concepts(role).clone())
            .unwrap_or_default())
    }

    async fn find_operations_referencing(
        &self,
        concept: &Iri,
        role: ConceptRole,
    ) -> Result<BTreeSet<Iri>, OracleError> {
        Ok(self
            .references
            .get(&(role, concept.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl OperationCatalogue for InMemoryKnowledgeBase {
    async fn get_operation(&self, operation: &Iri) -> Result<Option<OperationEntry>, OracleError> {
        Ok(self.operations.get(operation).cloned())
    }

    async fn list_operations(&self) -> Result<Vec<OperationEntry>, OracleError> {
        Ok(self.operations.values().cloned().collect())
    }

    async fn get_service(&self, service: &Iri) -> Result<Option<ServiceEntry>, OracleError> {
        Ok(self.services.get(service).cloned())
    }

    async fn list_services(&self) -> Result<Vec<ServiceEntry>, OracleError> {
        Ok(self.services.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Iri {
        Iri::new(s)
    }

    fn vehicles() -> InMemoryKnowledgeBase {
        InMemoryKnowledgeBase::builder()
            .subclass("urn:Car", "urn:Vehicle")
            .subclass("urn:SportsCar", "urn:Car")
            .concept("urn:Price")
            .service(ServiceEntry::new("urn:Dealer"))
            .operation(
                OperationEntry::new("urn:quote")
                    .with_inputs(["urn:Car"])
                    .with_outputs(["urn:Price"])
                    .with_service("urn:Dealer"),
            )
            .build()
            .expect("valid knowledge base")
    }

    #[tokio::test]
    async fn subclass_relation_is_reflexive_and_transitive() {
        let kb = vehicles();
        assert!(kb.is_subclass_of(&iri("urn:Car"), &iri("urn:Car")).await.unwrap());
        assert!(kb
            .is_subclass_of(&iri("urn:SportsCar"), &iri("urn:Vehicle"))
            .await
            .unwrap());
        assert!(!kb
            .is_subclass_of(&iri("urn:Vehicle"), &iri("urn:Car"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn unknown_concepts_answer_false_and_empty() {
        let kb = vehicles();
        let ghost = iri("urn:Ghost");
        assert!(!kb.is_known(&ghost).await.unwrap());
        assert!(!kb.is_subclass_of(&ghost, &ghost).await.unwrap());
        assert!(kb.subclasses_of(&ghost).await.unwrap().is_empty());
        assert!(kb.superclasses_of(&ghost).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn enumerations_exclude_self() {
        let kb = vehicles();
        let subs = kb.subclasses_of(&iri("urn:Vehicle")).await.unwrap();
        assert_eq!(subs, BTreeSet::from([iri("urn:Car"), iri("urn:SportsCar")]));
        let sups = kb.superclasses_of(&iri("urn:SportsCar")).await.unwrap();
        assert_eq!(sups, BTreeSet::from([iri("urn:Car"), iri("urn:Vehicle")]));
    }

    #[tokio::test]
    async fn equivalence_cycles_are_mutual_subsumption() {
        let kb = InMemoryKnowledgeBase::builder()
            .equivalent("urn:Auto", "urn:Car")
            .build()
            .unwrap();
        assert!(kb.is_subclass_of(&iri("urn:Auto"), &iri("urn:Car")).await.unwrap());
        assert!(kb.is_subclass_of(&iri("urn:Car"), &iri("urn:Auto")).await.unwrap());
        assert_eq!(
            kb.subclasses_of(&iri("urn:Car")).await.unwrap(),
            BTreeSet::from([iri("urn:Auto")])
        );
    }

    #[tokio::test]
    async fn operation_concepts_become_known_and_indexed() {
        let kb = vehicles();
        assert!(kb.is_known(&iri("urn:Price")).await.unwrap());
        let consumers = kb
            .find_operations_referencing(&iri("urn:Car"), ConceptRole::Input)
            .await
            .unwrap();
        assert_eq!(consumers, BTreeSet::from([iri("urn:quote")]));
        assert!(kb
            .find_operations_referencing(&iri("urn:Car"), ConceptRole::Output)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            kb.resolve_concepts_for_operation(&iri("urn:quote"), ConceptRole::Output)
                .await
                .unwrap(),
            BTreeSet::from([iri("urn:Price")])
        );
    }

    #[tokio::test]
    async fn service_membership_is_linked_both_ways() {
        let kb = vehicles();
        let dealer = kb.get_service(&iri("urn:Dealer")).await.unwrap().unwrap();
        assert!(dealer.operations.contains(&iri("urn:quote")));

        let kb = InMemoryKnowledgeBase::builder()
            .service({
                let mut s = ServiceEntry::new("urn:S");
                s.operations.insert(iri("urn:op"));
                s
            })
            .operation(OperationEntry::new("urn:op"))
            .build()
            .unwrap();
        let op = kb.get_operation(&iri("urn:op")).await.unwrap().unwrap();
        assert_eq!(op.service, Some(iri("urn:S")));
    }

    #[test]
    fn rejects_duplicates_and_dangling_references() {
        let dup = InMemoryKnowledgeBase::builder()
            .operation(OperationEntry::new("urn:op"))
            .operation(OperationEntry::new("urn:op"))
            .build();
        assert!(matches!(dup, Err(OracleError::InvalidSnapshot(_))));

        let dangling = InMemoryKnowledgeBase::builder()
            .operation(OperationEntry::new("urn:op").with_service("urn:nowhere"))
            .build();
        assert!(matches!(dangling, Err(OracleError::InvalidSnapshot(_))));

        let empty = InMemoryKnowledgeBase::builder()
            .operation(OperationEntry::new(""))
            .build();
        assert!(matches!(empty, Err(OracleError::InvalidSnapshot(_))));
    }

    #[tokio::test]
    async fn listings_are_sorted() {
        let kb = InMemoryKnowledgeBase::builder()
            .operation(OperationEntry::new("urn:b"))
            .operation(OperationEntry::new("urn:a"))
            .build()
            .unwrap();
        let ops: Vec<_> = kb
            .list_operations()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.iri)
            .collect();
        assert_eq!(ops, vec![iri("urn:a"), iri("urn:b")]);
        assert_eq!(kb.operation_count(), 2);
    }
}

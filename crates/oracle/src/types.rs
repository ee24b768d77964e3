use std::collections::BTreeSet;
use std::fmt;

use lattice::Iri;
use serde::{Deserialize, Serialize};

/// Which annotation of an operation a concept reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptRole {
    /// Mandatory input.
    Input,
    Output,
    Classification,
}

impl fmt::Display for ConceptRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConceptRole::Input => f.write_str("input"),
            ConceptRole::Output => f.write_str("output"),
            ConceptRole::Classification => f.write_str("classification"),
        }
    }
}

/// Catalogue view of one operation. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationEntry {
    pub iri: Iri,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub inputs: BTreeSet<Iri>,
    #[serde(default)]
    pub outputs: BTreeSet<Iri>,
    #[serde(default)]
    pub classification: BTreeSet<Iri>,
    /// Owning service, when the operation belongs to one.
    #[serde(default)]
    pub service: Option<Iri>,
}

impl OperationEntry {
    pub fn new(iri: impl Into<Iri>) -> Self {
        Self {
            iri: iri.into(),
            label: None,
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            classification: BTreeSet::new(),
            service: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_inputs<I, T>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Iri>,
    {
        self.inputs.extend(inputs.into_iter().map(Into::into));
        self
    }

    pub fn with_outputs<I, T>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Iri>,
    {
        self.outputs.extend(outputs.into_iter().map(Into::into));
        self
    }

    pub fn with_classification<I, T>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Iri>,
    {
        self.classification.extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn with_service(mut self, service: impl Into<Iri>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn concepts(&self, role: ConceptRole) -> &BTreeSet<Iri> {
        match role {
            ConceptRole::Input => &self.inputs,
            ConceptRole::Output => &self.outputs,
            ConceptRole::Classification => &self.classification,
        }
    }
}

/// Catalogue view of one service and the operations it groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub iri: Iri,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub operations: BTreeSet<Iri>,
    #[serde(default)]
    pub classification: BTreeSet<Iri>,
}

impl ServiceEntry {
    pub fn new(iri: impl Into<Iri>) -> Self {
        Self {
            iri: iri.into(),
            label: None,
            operations: BTreeSet::new(),
            classification: BTreeSet::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_classification<I, T>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Iri>,
    {
        self.classification.extend(categories.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_concepts_by_role() {
        let op = OperationEntry::new("urn:op")
            .with_inputs(["urn:a", "urn:b"])
            .with_outputs(["urn:c"])
            .with_classification(["urn:cat"])
            .with_service("urn:svc");
        assert_eq!(op.concepts(ConceptRole::Input).len(), 2);
        assert!(op.concepts(ConceptRole::Output).contains(&Iri::new("urn:c")));
        assert!(op.concepts(ConceptRole::Classification).contains(&Iri::new("urn:cat")));
        assert_eq!(op.service, Some(Iri::new("urn:svc")));
    }

    #[test]
    fn role_display() {
        assert_eq!(ConceptRole::Classification.to_string(), "classification");
    }
}

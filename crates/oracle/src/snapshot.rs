use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use lattice::Iri;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::OracleError;
use crate::memory::{InMemoryKnowledgeBase, KnowledgeBaseBuilder};
use crate::types::{OperationEntry, ServiceEntry};

/// Serialized knowledge base: a concept hierarchy plus a service catalogue.
///
/// ```yaml
/// concepts:
///   - iri: urn:Car
///     subclass_of: [urn:Vehicle]
/// services:
///   - iri: urn:Dealer
///     operations:
///       - iri: urn:quote
///         inputs: [urn:Car]
///         outputs: [urn:Price]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeBaseSnapshot {
    #[serde(default)]
    pub concepts: Vec<ConceptDecl>,
    #[serde(default)]
    pub services: Vec<ServiceDecl>,
    /// Operations that belong to no service.
    #[serde(default)]
    pub operations: Vec<OperationDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConceptDecl {
    pub iri: Iri,
    #[serde(default)]
    pub subclass_of: Vec<Iri>,
    #[serde(default)]
    pub equivalent_to: Vec<Iri>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDecl {
    pub iri: Iri,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub classification: BTreeSet<Iri>,
    #[serde(default)]
    pub operations: Vec<OperationDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationDecl {
    pub iri: Iri,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub inputs: BTreeSet<Iri>,
    #[serde(default)]
    pub outputs: BTreeSet<Iri>,
    #[serde(default)]
    pub classification: BTreeSet<Iri>,
}

impl OperationDecl {
    fn into_entry(self, service: Option<&Iri>) -> OperationEntry {
        OperationEntry {
            iri: self.iri,
            label: self.label,
            inputs: self.inputs,
            outputs: self.outputs,
            classification: self.classification,
            service: service.cloned(),
        }
    }
}

impl KnowledgeBaseSnapshot {
    pub fn from_json(input: &str) -> Result<Self, OracleError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_yaml(input: &str) -> Result<Self, OracleError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Load a snapshot, picking the format from the extension. Anything other
    /// than `.json` is read as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, OracleError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let snapshot = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_yaml(&content)?
        };
        info!(
            path = %path.display(),
            concepts = snapshot.concepts.len(),
            services = snapshot.services.len(),
            "knowledge_base_snapshot_loaded"
        );
        Ok(snapshot)
    }

    pub fn to_yaml(&self) -> Result<String, OracleError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn into_builder(self) -> Result<KnowledgeBaseBuilder, OracleError> {
        let mut builder = KnowledgeBaseBuilder::new();
        for concept in self.concepts {
            if concept.iri.is_empty() {
                return Err(OracleError::InvalidSnapshot("concept with empty IRI".into()));
            }
            builder = builder.concept(concept.iri.clone());
            for sup in concept.subclass_of {
                builder = builder.subclass(concept.iri.clone(), sup);
            }
            for eq in concept.equivalent_to {
                builder = builder.equivalent(concept.iri.clone(), eq);
            }
        }
        for service in self.services {
            let ServiceDecl {
                iri,
                label,
                classification,
                operations,
            } = service;
            builder = builder.service(ServiceEntry {
                iri: iri.clone(),
                label,
                operations: BTreeSet::new(),
                classification,
            });
            for operation in operations {
                builder = builder.operation(operation.into_entry(Some(&iri)));
            }
        }
        for operation in self.operations {
            builder = builder.operation(operation.into_entry(None));
        }
        Ok(builder)
    }

    pub fn into_knowledge_base(self) -> Result<InMemoryKnowledgeBase, OracleError> {
        self.into_builder()?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OperationCatalogue, SubsumptionOracle};
    use std::io::Write;

    const YAML: &str = r#"
concepts:
  - iri: urn:Car
    subclass_of: ["urn:Vehicle"]
  - iri: urn:Automobile
    equivalent_to: ["urn:Car"]
services:
  - iri: urn:Dealer
    classification: ["urn:Retail"]
    operations:
      - iri: urn:quote
        inputs: ["urn:Car"]
        outputs: ["urn:Price"]
operations:
  - iri: urn:standalone
    outputs: ["urn:Car"]
"#;

    #[tokio::test]
    async fn yaml_snapshot_builds_knowledge_base() {
        let kb = KnowledgeBaseSnapshot::from_yaml(YAML)
            .unwrap()
            .into_knowledge_base()
            .unwrap();
        let car = Iri::new("urn:Car");
        assert!(kb
            .is_subclass_of(&Iri::new("urn:Automobile"), &Iri::new("urn:Vehicle"))
            .await
            .unwrap());
        assert!(kb.is_known(&Iri::new("urn:Retail")).await.unwrap());
        let quote = kb.get_operation(&Iri::new("urn:quote")).await.unwrap().unwrap();
        assert_eq!(quote.service, Some(Iri::new("urn:Dealer")));
        assert!(quote.inputs.contains(&car));
        let standalone = kb
            .get_operation(&Iri::new("urn:standalone"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(standalone.service, None);
    }

    #[test]
    fn json_and_yaml_agree() {
        let json = r#"{"concepts":[{"iri":"urn:A","subclass_of":["urn:B"]}]}"#;
        let from_json = KnowledgeBaseSnapshot::from_json(json).unwrap();
        let from_yaml =
            KnowledgeBaseSnapshot::from_yaml("concepts:\n  - iri: urn:A\n    subclass_of: [\"urn:B\"]\n")
                .unwrap();
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn unknown_fields_are_parse_errors() {
        let err = KnowledgeBaseSnapshot::from_yaml("concepts: []\nrules: []\n").unwrap_err();
        assert!(matches!(err, OracleError::Parse(_)));
    }

    #[test]
    fn duplicate_operations_across_services_are_rejected() {
        let yaml = r#"
services:
  - iri: urn:S1
    operations:
      - iri: urn:op
  - iri: urn:S2
    operations:
      - iri: urn:op
"#;
        let err = KnowledgeBaseSnapshot::from_yaml(yaml)
            .unwrap()
            .into_knowledge_base()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate operation"));
    }

    #[test]
    fn file_loading_detects_format() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{"operations":[{{"iri":"urn:op"}}]}}"#).unwrap();
        let snapshot = KnowledgeBaseSnapshot::from_file(json.path()).unwrap();
        assert_eq!(snapshot.operations.len(), 1);

        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(yaml, "{YAML}").unwrap();
        let snapshot = KnowledgeBaseSnapshot::from_file(yaml.path()).unwrap();
        assert_eq!(snapshot.services.len(), 1);

        let missing = KnowledgeBaseSnapshot::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(missing, OracleError::Io(_)));
    }

    #[test]
    fn yaml_export_reloads() {
        let snapshot = KnowledgeBaseSnapshot::from_yaml(YAML).unwrap();
        let reloaded = KnowledgeBaseSnapshot::from_yaml(&snapshot.to_yaml().unwrap()).unwrap();
        assert_eq!(snapshot, reloaded);
    }
}

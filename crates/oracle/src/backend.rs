use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::memory::InMemoryKnowledgeBase;
use crate::snapshot::KnowledgeBaseSnapshot;

/// Selects where the knowledge base comes from.
///
/// # Example
/// ```
/// use oracle::KnowledgeBaseConfig;
///
/// // Empty knowledge base (for testing)
/// let config = KnowledgeBaseConfig::in_memory();
///
/// // Loaded from a YAML or JSON snapshot
/// let config = KnowledgeBaseConfig::snapshot("/data/vehicles.yaml");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KnowledgeBaseConfig {
    /// Start with no concepts and no operations.
    #[default]
    InMemory,
    /// Load a [`KnowledgeBaseSnapshot`] from `path`.
    Snapshot { path: PathBuf },
}

impl KnowledgeBaseConfig {
    pub fn in_memory() -> Self {
        KnowledgeBaseConfig::InMemory
    }

    pub fn snapshot(path: impl Into<PathBuf>) -> Self {
        KnowledgeBaseConfig::Snapshot { path: path.into() }
    }

    /// Build the knowledge base. The result implements both
    /// [`SubsumptionOracle`](crate::SubsumptionOracle) and
    /// [`OperationCatalogue`](crate::OperationCatalogue), so the same `Arc`
    /// can be handed out as either.
    pub fn build(&self) -> Result<Arc<InMemoryKnowledgeBase>, OracleError> {
        let kb = match self {
            KnowledgeBaseConfig::InMemory => InMemoryKnowledgeBase::default(),
            KnowledgeBaseConfig::Snapshot { path } => {
                KnowledgeBaseSnapshot::from_file(path)?.into_knowledge_base()?
            }
        };
        Ok(Arc::new(kb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn in_memory_is_empty() {
        let kb = KnowledgeBaseConfig::default().build().unwrap();
        assert_eq!(kb.concept_count(), 0);
        assert_eq!(kb.operation_count(), 0);
    }

    #[test]
    fn snapshot_config_loads_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "concepts:\n  - iri: urn:A\n    subclass_of: [\"urn:B\"]").unwrap();
        let kb = KnowledgeBaseConfig::snapshot(file.path()).build().unwrap();
        assert_eq!(kb.concept_count(), 2);
    }

    #[test]
    fn config_deserializes_from_tagged_yaml() {
        let config: KnowledgeBaseConfig =
            serde_yaml::from_str("kind: snapshot\npath: /tmp/kb.yaml\n").unwrap();
        assert_eq!(config, KnowledgeBaseConfig::snapshot("/tmp/kb.yaml"));
    }
}

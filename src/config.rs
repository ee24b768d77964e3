//! YAML configuration for the discovery engine.
//!
//! One file describes where the knowledge base comes from, how oracle calls
//! are bounded and retried, the per-request discovery limits, ranking
//! weights and logging.
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//! name: "vehicles"
//!
//! knowledge_base:
//!   kind: snapshot
//!   path: "data/vehicles.yaml"
//!
//! oracle:
//!   call_timeout_ms: 250
//!   retry:
//!     max_retries: 2
//!     base_delay_ms: 50
//!     max_delay_ms: 2000
//!     jitter: true
//!
//! discovery:
//!   deadline_ms: 5000
//!   max_passes: 64
//!
//! ranking:
//!   exact: 1.0
//!   plugin: 0.8
//!
//! logging:
//!   level: "info"
//!   json: false
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use discovery::{DegreeScorer, DiscoveryConfig};
use oracle::KnowledgeBaseConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::RetryConfig;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SemdiscConfig {
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    #[serde(default)]
    pub oracle: OracleYamlConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub ranking: DegreeScorer,

    #[serde(default)]
    pub logging: LoggingYamlConfig,
}

impl SemdiscConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SemdiscConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.oracle.validate()?;
        self.discovery
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))?;
        self.ranking.validate().map_err(ConfigLoadError::Validation)?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Default for SemdiscConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            knowledge_base: KnowledgeBaseConfig::default(),
            oracle: OracleYamlConfig::default(),
            discovery: DiscoveryConfig::default(),
            ranking: DegreeScorer::default(),
            logging: LoggingYamlConfig::default(),
        }
    }
}

/// How calls into the oracle are bounded and retried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleYamlConfig {
    /// Per-call budget. Absent means calls are never cut short.
    #[serde(default)]
    pub call_timeout_ms: Option<u64>,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl OracleYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.call_timeout_ms == Some(0) {
            return Err(ConfigLoadError::Validation(
                "oracle.call_timeout_ms must be > 0".into(),
            ));
        }
        self.retry.validate().map_err(ConfigLoadError::Validation)
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingYamlConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit one JSON object per event instead of human-readable lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingYamlConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LoggingYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigLoadError::Validation(format!(
                "logging.level must be one of trace, debug, info, warn, error (got `{other}`)"
            ))),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failures raised by an oracle or catalogue backend.
///
/// An unknown concept is *not* an error: oracles answer `false` / empty for
/// it and the matcher turns that into `Fail` evidence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The backend could not be reached or refused the query.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    /// A single call exceeded its time budget.
    #[error("oracle call `{call}` timed out after {after:?}")]
    Timeout { call: &'static str, after: Duration },
    /// A snapshot parsed but describes an inconsistent knowledge base.
    #[error("invalid knowledge base snapshot: {0}")]
    InvalidSnapshot(String),
    /// A snapshot document could not be parsed.
    #[error("failed to parse knowledge base snapshot: {0}")]
    Parse(String),
    /// Filesystem failure while reading a snapshot.
    #[error("io error: {0}")]
    Io(String),
}

impl OracleError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::Unavailable(_) | OracleError::Timeout { .. })
    }
}

impl From<io::Error> for OracleError {
    fn from(value: io::Error) -> Self {
        OracleError::Io(value.to_string())
    }
}

impl From<serde_json::Error> for OracleError {
    fn from(value: serde_json::Error) -> Self {
        OracleError::Parse(value.to_string())
    }
}

impl From<serde_yaml::Error> for OracleError {
    fn from(value: serde_yaml::Error) -> Self {
        OracleError::Parse(value.to_string())
    }
}

//! Error types for the remote configuration store.

use thiserror::Error;

/// Document-level failures of a refresh, and lookups made too early.
///
/// Cloneable so a coalesced refresh can hand the same result to every
/// waiting caller.
#[derive(Debug, Clone, Error)]
pub enum RemoteConfigError {
    /// The document could not be retrieved.
    #[error("failed to fetch {target}: {detail}")]
    Fetch { target: String, detail: String },

    /// The document was retrieved but is not JSON.
    #[error("document from {target} is not valid JSON: {detail}")]
    Parse { target: String, detail: String },

    /// The document is JSON but not an acceptable configuration.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// No document has been loaded successfully yet.
    #[error("configuration has not been loaded yet")]
    NotInitialized,
}

impl RemoteConfigError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteConfigError::Fetch { .. } => "fetch",
            RemoteConfigError::Parse { .. } => "parse",
            RemoteConfigError::Validation(_) => "validation",
            RemoteConfigError::NotInitialized => "not_initialized",
        }
    }
}

/// Reasons a candidate document is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// The document does not satisfy the JSON Schema.
    #[error("document failed schema validation: {}", .0.join("; "))]
    Schema(Vec<String>),

    /// The document passed the schema but could not be decoded.
    #[error("document has an unexpected shape: {0}")]
    Shape(String),

    /// Two files share a name.
    #[error("duplicate configuration filename: {0}")]
    DuplicateName(String),
}

//! Error types for the addfs overlay.

use thiserror::Error;

/// Errors raised while traversing or computing nodes
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Node not found: {name}")]
    NotFound { name: String },

    #[error("Not a directory: {name}")]
    NotADirectory { name: String },

    #[error("Computing additions for {entry:?} with func {func:?} failed: {source}")]
    Computation {
        func: String,
        entry: String,
        #[source]
        source: Box<NodeError>,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Failed(String),
}

impl NodeError {
    pub fn not_found(name: impl Into<String>) -> Self {
        NodeError::NotFound { name: name.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NodeError::NotFound { .. })
    }

    /// True for `Cancelled` and `DeadlineExceeded`, looking through computation wrappers.
    pub fn is_cancellation(&self) -> bool {
        match self {
            NodeError::Cancelled | NodeError::DeadlineExceeded => true,
            NodeError::Computation { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }
}

/// Configuration and setup errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Logging setup failed: {0}")]
    LoggingError(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

//! Error handling types
//!
//! One error enum covers the whole core. Variants split along the
//! propagation policy: `Upstream` and `Cache` are recovered at the branch
//! boundary (logged, degraded to empty data), while `Optimization`,
//! `Fusion`, and `Validation` bubble to the caller with enough context to
//! identify the failing stage.

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the code-search fusion core
#[derive(Error, Debug)]
pub enum Error {
    /// A retrieval backend (vector, graph, or strategy) failed.
    /// Recovered at the branch boundary: the branch degrades to an empty
    /// candidate list and the error is surfaced only via logs.
    #[error("Upstream {source_name} error: {message}")]
    Upstream {
        /// Which backend failed (e.g. "vector", "graph", "keyword")
        source_name: String,
        /// Description of the failure
        message: String,
    },

    /// The query optimizer failed. Fatal: propagated to the caller with
    /// the component and operation that failed.
    #[error("Optimization error in {component}::{operation}: {message}")]
    Optimization {
        /// Component where the failure occurred
        component: String,
        /// Operation that was being performed
        operation: String,
        /// Description of the failure
        message: String,
    },

    /// A collaborator returned a candidate that violates the canonical
    /// shape. Fatal: indicates a contract violation, not bad user input.
    #[error("Fusion error: {message}")]
    Fusion {
        /// Description of the malformed input
        message: String,
    },

    /// Cache I/O failed. Recovered: the caller bypasses the cache and
    /// continues uncached.
    #[error("Cache error: {message}")]
    Cache {
        /// Description of the cache failure
        message: String,
    },

    /// Caller-supplied options were invalid. Fatal to the immediate
    /// caller only.
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the invalid input
        message: String,
    },

    /// Two vectors passed to a similarity function differ in length
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected vector length
        expected: usize,
        /// Actual vector length
        actual: usize,
    },

    /// JSON serialization or deserialization error
    #[error("Serialization error: {source}")]
    Serialization {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Internal invariant violation
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl Error {
    /// Create an upstream error for a named retrieval backend
    pub fn upstream(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Upstream {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create an optimization error with component/operation context
    pub fn optimization(
        component: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Optimization {
            component: component.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a fusion contract-violation error
    pub fn fusion(message: impl Into<String>) -> Self {
        Self::Fusion {
            message: message.into(),
        }
    }

    /// Create a cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True if this error is recovered at a branch boundary rather than
    /// propagated to the caller
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Cache { .. })
    }
}

//! Kernel error taxonomy.
//!
//! Every failure aborts the current store transaction; no partial writes
//! persist. `InvariantViolation` is the fatal category: it means the stored
//! graph itself is corrupt (e.g. a cross-version reference), not that the
//! caller did something wrong.

use crate::store::StoreError;

/// Result type for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

/// Error taxonomy for the version lifecycle engine and exporters.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// A project, version, language, or named row does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness or lifecycle conflict (duplicate natural key, rollback
    /// without an archived generation, concurrent rotation in flight).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input failed a graph-level validation gate (promotion guard, export
    /// threshold, disallowed status token).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The stored graph violates an internal invariant. Fatal; not
    /// user-correctable.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Document rendering failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    /// Backing store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl KernelError {
    /// Build a `NotFound` error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a `Conflict` error.
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Build a `ValidationFailed` error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    /// Build an `InvariantViolation` error.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KernelError::not_found("project 'acme'");
        assert_eq!(err.to_string(), "Not found: project 'acme'");

        let err = KernelError::conflict("no archived version available");
        assert!(err.to_string().starts_with("Conflict:"));
    }
}

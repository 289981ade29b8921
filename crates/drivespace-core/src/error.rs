//! Unified application error types for DriveSpace.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested folder/file/storage does not exist or is not owned
    /// by the caller's tenant.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate sibling name, duplicate tenant storage).
    Conflict,
    /// The operation would push a tenant's used space above its capacity.
    QuotaExceeded,
    /// A structural rule was violated (operating on the root folder,
    /// deleting a node reachable only through its trashed ancestor,
    /// moving into a non-existent destination).
    Precondition,
    /// A naming collision could not be resolved after retry.
    NameResolution,
    /// An expected ancestor/descendant row was missing during a walk,
    /// a data corruption signal, fatal and never retried.
    Consistency,
    /// A database error occurred.
    Database,
    /// An underlying blob store operation failed.
    Blob,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::QuotaExceeded => write!(f, "QUOTA_EXCEEDED"),
            Self::Precondition => write!(f, "PRECONDITION"),
            Self::NameResolution => write!(f, "NAME_RESOLUTION"),
            Self::Consistency => write!(f, "CONSISTENCY"),
            Self::Database => write!(f, "DATABASE"),
            Self::Blob => write!(f, "BLOB_IO"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout DriveSpace.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary: every operation either returns its
/// entity or exactly one error kind plus a human-readable message.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a quota-exceeded error.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::QuotaExceeded, message)
    }

    /// Create a precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    /// Create a name-resolution error.
    pub fn name_resolution(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NameResolution, message)
    }

    /// Create a consistency error.
    pub fn consistency(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Consistency, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a blob I/O error.
    pub fn blob(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Blob, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Whether this error is an expected control-flow outcome rather than
    /// a fatal failure.
    pub fn is_expected(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::NotFound
                | ErrorKind::Validation
                | ErrorKind::Conflict
                | ErrorKind::QuotaExceeded
                | ErrorKind::Precondition
                | ErrorKind::NameResolution
        )
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Blob, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::quota_exceeded("storage is full");
        assert_eq!(err.to_string(), "QUOTA_EXCEEDED: storage is full");
    }

    #[test]
    fn test_expected_vs_fatal() {
        assert!(AppError::precondition("root").is_expected());
        assert!(AppError::not_found("gone").is_expected());
        assert!(!AppError::consistency("missing ancestor").is_expected());
        assert!(!AppError::blob("disk died").is_expected());
    }
}

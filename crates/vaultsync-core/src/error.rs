//! Unified application error types for VaultSync.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. The end-to-end encryption protocol
//! has its own taxonomy, [`E2eeError`], which is what a delete or metadata
//! job reports upward; it converts into [`AppError`] at the binary boundary.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input or document validation failed.
    Validation,
    /// A conflict occurred (folder locked by another client, stale lock token).
    Conflict,
    /// The server refused the request.
    Rejected,
    /// A network or timeout failure occurred.
    Transport,
    /// An internal error occurred.
    Internal,
    /// A local journal (database) error occurred.
    Database,
    /// A storage I/O error occurred.
    Storage,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An encryption or decryption error occurred.
    Crypto,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Transport => write!(f, "TRANSPORT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Crypto => write!(f, "CRYPTO"),
        }
    }
}

/// The unified application error used throughout VaultSync.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
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

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a crypto error.
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Crypto, message)
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
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
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

/// Failure of one step of the encrypted-folder protocol.
///
/// None of these are fatal to the process; they terminate the current
/// job and are reported upward with the affected item.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum E2eeError {
    /// Another client holds the folder lock. The scheduler may retry on a later pass.
    #[error("folder {folder_id} is locked by another client")]
    LockUnavailable {
        /// Folder whose lock could not be acquired.
        folder_id: String,
    },
    /// The metadata document is malformed, undecryptable, or of an unsupported version.
    #[error("invalid folder metadata: {reason}")]
    MetadataInvalid {
        /// What made the document unusable.
        reason: String,
    },
    /// The metadata document or the encrypted root does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// The missing resource.
        what: String,
    },
    /// The server refused a metadata upload, usually because the lock token is stale.
    #[error("metadata upload rejected with HTTP {status}")]
    UploadRejected {
        /// HTTP status returned by the server.
        status: u16,
    },
    /// The server answered a delete with an unexpected status.
    #[error("delete rejected with HTTP {status}")]
    DeleteRejected {
        /// HTTP status returned by the server.
        status: u16,
    },
    /// The server refused to release the folder lock.
    #[error("failed to unlock encrypted folder {folder_id}: HTTP {status}")]
    UnlockRejected {
        /// Folder whose lock was not released.
        folder_id: String,
        /// HTTP status returned by the server.
        status: u16,
    },
    /// Connectivity failure or timeout.
    #[error("transport failure: {message}")]
    TransportFailure {
        /// Description of the underlying failure.
        message: String,
    },
}

impl E2eeError {
    /// Create a metadata-invalid error.
    pub fn metadata_invalid(reason: impl Into<String>) -> Self {
        Self::MetadataInvalid {
            reason: reason.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure {
            message: message.into(),
        }
    }

    /// HTTP status attached to the error, if the server answered at all.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::UploadRejected { status }
            | Self::DeleteRejected { status }
            | Self::UnlockRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the surrounding scheduler may retry the job on a later pass.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LockUnavailable { .. } | Self::TransportFailure { .. }
        )
    }

    /// The application error kind this protocol error maps onto.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LockUnavailable { .. } => ErrorKind::Conflict,
            Self::MetadataInvalid { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UploadRejected { .. } => ErrorKind::Conflict,
            Self::DeleteRejected { .. } | Self::UnlockRejected { .. } => ErrorKind::Rejected,
            Self::TransportFailure { .. } => ErrorKind::Transport,
        }
    }
}

impl From<E2eeError> for AppError {
    fn from(err: E2eeError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_only_for_server_answers() {
        assert_eq!(
            E2eeError::DeleteRejected { status: 500 }.http_status(),
            Some(500)
        );
        assert_eq!(E2eeError::transport("timed out").http_status(), None);
    }

    #[test]
    fn test_retryable() {
        assert!(
            E2eeError::LockUnavailable {
                folder_id: "42".into()
            }
            .is_retryable()
        );
        assert!(!E2eeError::UploadRejected { status: 403 }.is_retryable());
    }

    #[test]
    fn test_into_app_error() {
        let err: AppError = E2eeError::UploadRejected { status: 423 }.into();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.message.contains("423"));
    }
}

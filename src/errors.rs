//! Error types for parcours
//!
//! Each error type has a corresponding error code for programmatic handling.

use thiserror::Error;

use crate::schemas::{Status, Step};

/// Result type alias for parcours operations
pub type Result<T> = std::result::Result<T, ParcoursError>;

/// Main error type for all parcours operations
#[derive(Debug, Error)]
pub enum ParcoursError {
    /// Referenced journey or dossier does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A guard rejected the requested transition
    #[error("Invalid transition: cannot {action} from ({step}, {status})")]
    InvalidTransition {
        step: Step,
        status: Status,
        action: &'static str,
    },

    /// Advance was allowed but the step has no successor
    #[error("No step after {0}")]
    NoNextStep(Step),

    /// Reading the external case status failed; nothing was written
    #[error("Sync failed for case {case_number}: {reason}")]
    SyncFailed { case_number: String, reason: String },

    /// Persistence layer failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// A store uniqueness constraint rejected an insert
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Data directory not found
    #[error("Data directory not found: {0}")]
    DataDirNotFound(String),

    /// Invalid JSON format
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Operation was interrupted (e.g., by SIGINT)
    #[error("Operation interrupted")]
    Interrupted,

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error with context
    #[error("{context}: {message}")]
    Wrapped { context: String, message: String },
}

impl ParcoursError {
    /// Get the error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            ParcoursError::NotFound(_) => "NOT_FOUND",
            ParcoursError::InvalidTransition { .. } => "INVALID_TRANSITION",
            ParcoursError::NoNextStep(_) => "NO_NEXT_STEP",
            ParcoursError::SyncFailed { .. } => "SYNC_FAILED",
            ParcoursError::Storage(_) => "STORAGE_ERROR",
            ParcoursError::Conflict(_) => "CONFLICT",
            ParcoursError::DataDirNotFound(_) => "DATA_DIR_NOT_FOUND",
            ParcoursError::InvalidJson(_) => "INVALID_JSON",
            ParcoursError::ConfigError(_) => "CONFIG_ERROR",
            ParcoursError::Interrupted => "INTERRUPTED",
            ParcoursError::Io(_) => "IO_ERROR",
            ParcoursError::Wrapped { .. } => "WRAPPED_ERROR",
        }
    }

    /// Whether retrying the same call later may succeed without caller changes
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ParcoursError::SyncFailed { .. } | ParcoursError::Storage(_) | ParcoursError::Io(_)
        )
    }

    /// Wrap an error with additional context
    pub fn wrap<E: std::fmt::Display>(error: E, context: impl Into<String>) -> Self {
        ParcoursError::Wrapped {
            context: context.into(),
            message: error.to_string(),
        }
    }
}

/// Convert an error to an appropriate exit code
pub fn to_exit_code(error: &ParcoursError) -> i32 {
    match error {
        ParcoursError::Interrupted => 130, // Standard Unix exit code for SIGINT
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ParcoursError::NotFound("journey".into()).code(), "NOT_FOUND");
        assert_eq!(
            ParcoursError::InvalidTransition {
                step: Step::ChoixAmo,
                status: Status::Pending,
                action: "create dossier",
            }
            .code(),
            "INVALID_TRANSITION"
        );
        assert_eq!(ParcoursError::NoNextStep(Step::Factures).code(), "NO_NEXT_STEP");
        assert_eq!(
            ParcoursError::SyncFailed {
                case_number: "42".into(),
                reason: "timeout".into(),
            }
            .code(),
            "SYNC_FAILED"
        );
        assert_eq!(ParcoursError::Storage("disk".into()).code(), "STORAGE_ERROR");
        assert_eq!(ParcoursError::Conflict("dup".into()).code(), "CONFLICT");
        assert_eq!(ParcoursError::ConfigError("bad".into()).code(), "CONFIG_ERROR");
        assert_eq!(ParcoursError::Interrupted.code(), "INTERRUPTED");
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = ParcoursError::InvalidTransition {
            step: Step::Diagnostic,
            status: Status::Todo,
            action: "validate",
        };
        assert_eq!(
            err.to_string(),
            "Invalid transition: cannot validate from (diagnostic, todo)"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(ParcoursError::SyncFailed {
            case_number: "1".into(),
            reason: "503".into(),
        }
        .is_retryable());
        assert!(ParcoursError::Storage("locked".into()).is_retryable());
        assert!(!ParcoursError::NotFound("x".into()).is_retryable());
        assert!(!ParcoursError::NoNextStep(Step::Factures).is_retryable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(to_exit_code(&ParcoursError::Interrupted), 130);
        assert_eq!(to_exit_code(&ParcoursError::NotFound("test".into())), 1);
        assert_eq!(to_exit_code(&ParcoursError::Conflict("test".into())), 1);
    }

    #[test]
    fn test_wrap_error() {
        let wrapped = ParcoursError::wrap("inner error", "outer context");
        assert_eq!(wrapped.code(), "WRAPPED_ERROR");
        assert!(wrapped.to_string().contains("outer context"));
        assert!(wrapped.to_string().contains("inner error"));
    }
}

//! Error types and exit codes for vaultsift
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (I/O, provider, rejected enhancement in `check`)
//! - 2: Usage error (bad flags/args)
//! - 3: Data/vault error (missing vault, missing note)

mod macros;

use std::path::PathBuf;
use thiserror::Error;

use crate::assess::ProviderError;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data/vault error - missing vault or note (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during vaultsift operations
#[derive(Error, Debug)]
pub enum VaultError {
    // Usage errors (exit code 2)
    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    // Data/vault errors (exit code 3)
    #[error("vault not found: {path:?}")]
    VaultNotFound { path: PathBuf },

    #[error("note not found: {key}")]
    NoteNotFound { key: String },

    #[error("{context} already exists: {value}")]
    AlreadyExists { context: String, value: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),

    #[error("Review interrupted. Run `vaultsift review` again to resume.")]
    Interrupted,
}

impl VaultError {
    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        VaultError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for a failed note operation
    pub fn note_operation(key: &str, operation: &str, error: impl std::fmt::Display) -> Self {
        VaultError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: format!("note {}", key),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        VaultError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that already exists
    pub fn already_exists(context: &str, value: impl std::fmt::Display) -> Self {
        VaultError::AlreadyExists {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            VaultError::UsageError(_)
            | VaultError::InvalidValue { .. } => ExitCode::Usage,

            VaultError::VaultNotFound { .. }
            | VaultError::NoteNotFound { .. }
            | VaultError::AlreadyExists { .. } => ExitCode::Data,

            VaultError::Io(_)
            | VaultError::Json(_)
            | VaultError::Toml(_)
            | VaultError::Provider(_)
            | VaultError::FailedOperationWithTarget { .. }
            | VaultError::Other(_)
            | VaultError::Interrupted => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            VaultError::UsageError(_) => "usage_error",
            VaultError::InvalidValue { .. } => "invalid_value",
            VaultError::VaultNotFound { .. } => "vault_not_found",
            VaultError::NoteNotFound { .. } => "note_not_found",
            VaultError::AlreadyExists { .. } => "already_exists",
            VaultError::Io(_) => "io_error",
            VaultError::Json(_) => "json_error",
            VaultError::Toml(_) => "toml_error",
            VaultError::Provider(_) => "provider_error",
            VaultError::FailedOperationWithTarget { .. } => "failed_operation_with_target",
            VaultError::Other(_) => "other",
            VaultError::Interrupted => "interrupted",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for vaultsift operations
pub type Result<T> = std::result::Result<T, VaultError>;

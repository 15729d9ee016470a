//! Error types for orgbuilder operations.
//!
//! This module defines [`BuilderError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration problems (`ConfigNotFound`, `ConfigParseError`,
//!   `ConfigValidationError`, `MalformedStep`) are fatal and map to
//!   [`EXIT_CONFIG_ERROR`]
//! - Step failures (`CommandFailed`, `StepFailed`, `Rejected`) are recorded by
//!   the session and then either tolerated or escalated by the orchestrator
//! - `Aborted` is produced only by the orchestrator and maps to [`EXIT_ABORTED`]
//! - Use `anyhow::Error` (via `BuilderError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Process exit code for a run aborted by the quit-on-errors policy.
pub const EXIT_ABORTED: i32 = -1;

/// Process exit code for malformed configuration.
pub const EXIT_CONFIG_ERROR: i32 = -2;

/// Core error type for orgbuilder operations.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A mapping step descriptor without exactly one key.
    #[error("Malformed step #{index}: expected exactly one key, found {keys:?}")]
    MalformedStep { index: usize, keys: Vec<String> },

    /// A command template references a variable nobody defined.
    #[error("Unknown variable '${{{name}}}' in '{template}'")]
    UnknownVariable { name: String, template: String },

    /// One external command failed.
    #[error("{step} failed: command exited with {code:?}: {command}")]
    CommandFailed {
        step: String,
        command: String,
        code: Option<i32>,
    },

    /// A step failed, possibly after several of its items failed.
    #[error("{step} failed: {}", failures.join("; "))]
    StepFailed { step: String, failures: Vec<String> },

    /// The operator answered "no" at a confirmation gate.
    #[error("{step} rejected by operator")]
    Rejected { step: String },

    /// The run was stopped by the quit-on-errors policy.
    #[error("Aborted at {step}: {message}")]
    Aborted { step: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BuilderError {
    /// Whether this error must stop the run regardless of the failure policy.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParseError { .. }
                | Self::ConfigValidationError { .. }
                | Self::MalformedStep { .. }
                | Self::Aborted { .. }
        )
    }

    /// Process exit code the binary reports for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Aborted { .. } => EXIT_ABORTED,
            Self::ConfigNotFound { .. }
            | Self::ConfigParseError { .. }
            | Self::ConfigValidationError { .. }
            | Self::MalformedStep { .. }
            | Self::UnknownVariable { .. } => EXIT_CONFIG_ERROR,
            _ => 1,
        }
    }
}

/// Result type alias for orgbuilder operations.
pub type Result<T> = std::result::Result<T, BuilderError>;

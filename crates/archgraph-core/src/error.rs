//! Error types and error code constants for archgraph.
//!
//! This module provides a unified error type (`ArchError`) that bridges
//! domain-specific errors from the walker, the graph builders and the
//! analysis pipeline into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad option, bad pattern, bad config)
//! - `3`: Input errors (root path missing or unreadable)
//! - `4`: Cancelled by the caller
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `ArchError` is the single error type for CLI output
//! - **Bridging**: `impl From<X> for ArchError` bridges domain errors
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON
//!
//! Recoverable problems (a file that fails to parse, a duplicate module name)
//! are not errors at all; they are [`crate::warning::AnalysisWarning`]s that
//! travel alongside a successful result.

use std::fmt;

use thiserror::Error;

use crate::graph::GraphError;
use crate::pipeline::AnalysisError;
use crate::workspace::WalkError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad option, malformed pattern).
    InvalidArguments = 2,
    /// The analysis root could not be used.
    InputError = 3,
    /// The run was cancelled before it finished.
    Cancelled = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum ArchError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// A graph builder option was malformed.
    #[error("invalid option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    /// The analysis root is missing, not a directory, or unreadable.
    #[error("cannot read root {path}: {reason}")]
    RootUnavailable { path: String, reason: String },

    /// The caller cancelled the run.
    #[error("analysis cancelled")]
    Cancelled,

    /// Configuration file could not be loaded.
    #[error("config error: {message}")]
    ConfigError { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&ArchError> for OutputErrorCode {
    fn from(err: &ArchError) -> Self {
        match err {
            ArchError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            ArchError::InvalidOption { .. } => OutputErrorCode::InvalidArguments,
            ArchError::ConfigError { .. } => OutputErrorCode::InvalidArguments,
            ArchError::RootUnavailable { .. } => OutputErrorCode::InputError,
            ArchError::Cancelled => OutputErrorCode::Cancelled,
            ArchError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl ArchError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        ArchError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ArchError::InternalError {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        ArchError::ConfigError {
            message: message.into(),
        }
    }

    /// The process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        OutputErrorCode::from(self).code()
    }
}

// ============================================================================
// Bridges from domain errors
// ============================================================================

impl From<WalkError> for ArchError {
    fn from(err: WalkError) -> Self {
        match err {
            WalkError::InvalidPattern { pattern, message } => ArchError::InvalidArguments {
                message: format!("invalid exclude pattern '{}': {}", pattern, message),
                details: Some(serde_json::json!({ "pattern": pattern })),
            },
            WalkError::RootNotFound { path } => ArchError::RootUnavailable {
                path: path.display().to_string(),
                reason: "no such directory".to_string(),
            },
            WalkError::RootNotDirectory { path } => ArchError::RootUnavailable {
                path: path.display().to_string(),
                reason: "not a directory".to_string(),
            },
            WalkError::RootUnreadable { path, source } => ArchError::RootUnavailable {
                path: path.display().to_string(),
                reason: source.to_string(),
            },
        }
    }
}

impl From<GraphError> for ArchError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::InvalidOption { option, reason } => {
                ArchError::InvalidOption { option, reason }
            }
        }
    }
}

impl From<AnalysisError> for ArchError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Walk(walk) => ArchError::from(walk),
            AnalysisError::Cancelled => ArchError::Cancelled,
            AnalysisError::Adapter { message } => ArchError::InternalError { message },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

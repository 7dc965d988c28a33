//! Error types for the Haat search core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Haat workspace.
///
/// Channel adapters and the dispatcher catch these at their own boundary;
/// none of them is fatal to the hosting process.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum HaatError {
    /// The user (or the platform) refused access to a capture device.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Any failure talking to the search/AI backend.
    #[error("Backend unavailable during {operation}: {message}")]
    BackendUnavailable {
        operation: String,
        message: String,
    },

    /// A completion whose request token is no longer the live one.
    ///
    /// Not a failure; callers drop it without logging at warn level.
    #[error("Stale response for request token {token}")]
    StaleResponse { token: u64 },

    /// A recording is already active for this session.
    #[error("A voice recording is already in progress")]
    RecordingInProgress,

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HaatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a PermissionDenied error
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    /// Creates a BackendUnavailable error for the named backend operation
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Creates a StaleResponse marker
    pub fn stale(token: u64) -> Self {
        Self::StaleResponse { token }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }

    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleResponse { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Message suitable for a user-facing alert.
    ///
    /// Backend details stay in the logs; the user only learns that search is
    /// temporarily unavailable.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied(_) => {
                "Microphone access was denied. Allow microphone access to search by voice."
                    .to_string()
            }
            Self::BackendUnavailable { .. } => {
                "Search is temporarily unavailable. Please try again.".to_string()
            }
            Self::RecordingInProgress => "A recording is already in progress.".to_string(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for HaatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for HaatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for HaatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for HaatError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used by outer adapters)
impl From<anyhow::Error> for HaatError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, HaatError>`.
pub type Result<T> = std::result::Result<T, HaatError>;

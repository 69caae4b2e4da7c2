//! Error types for the board reconciler

use std::path::PathBuf;
use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur while reconciling or persisting a board
#[derive(Debug, Error)]
pub enum BoardError {
    /// A move referenced indices or lanes outside the current snapshot.
    /// Always an integration bug in the drag-and-drop surface.
    #[error("invalid move: {reason}")]
    InvalidMove { reason: String },

    /// Board not found in the store
    #[error("board not found: {id}")]
    BoardNotFound { id: String },

    /// Lane not found
    #[error("lane not found: {id}")]
    LaneNotFound { id: String },

    /// Card not found
    #[error("card not found: {id}")]
    CardNotFound { id: String },

    /// Duplicate ID
    #[error("duplicate {item_type} ID: {id}")]
    DuplicateId { item_type: String, id: String },

    /// A snapshot broke one of the ordering invariants
    #[error("invariant violated: {message}")]
    InvariantViolation { message: String },

    /// The storage collaborator rejected a write
    #[error("persistence failure: {message}")]
    Persistence { message: String },

    /// The session's dispatcher task is gone
    #[error("command dispatcher closed")]
    DispatcherClosed,

    /// Storage directory not found
    #[error("no board storage found from {path}")]
    NotInitialized { path: PathBuf },

    /// Lock is held by another process
    #[error("lock busy - another operation in progress")]
    LockBusy,

    /// Configuration could not be loaded
    #[error("configuration error: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl BoardError {
    /// Create an invalid move error
    pub fn invalid_move(reason: impl Into<String>) -> Self {
        Self::InvalidMove {
            reason: reason.into(),
        }
    }

    /// Create a duplicate ID error
    pub fn duplicate_id(item_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::DuplicateId {
            item_type: item_type.into(),
            id: id.into(),
        }
    }

    /// Create an invariant violation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockBusy | Self::Persistence { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BoardError::LaneNotFound { id: "L9".into() };
        assert_eq!(err.to_string(), "lane not found: L9");
    }

    #[test]
    fn test_invalid_move() {
        let err = BoardError::invalid_move("source index 4 out of bounds");
        assert_eq!(
            err.to_string(),
            "invalid move: source index 4 out of bounds"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(BoardError::LockBusy.is_retryable());
        assert!(BoardError::persistence("disk full").is_retryable());
        assert!(!BoardError::invalid_move("x").is_retryable());
    }
}

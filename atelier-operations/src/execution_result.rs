//! Execution result types for operations

use crate::LogEntry;
use serde_json::Value;
use std::fmt::Display;

/// Result of executing an operation
///
/// Distinguishes between:
/// - Logged: Operations that mutate state and should be audited
/// - Unlogged: Read-only operations with no side effects
/// - Failed: Errors (optionally logged)
#[derive(Debug)]
pub enum ExecutionResult<T, E> {
    /// Operation succeeded and should be logged
    Logged { value: T, log_entry: LogEntry },
    /// Operation succeeded but no logging needed (read-only)
    Unlogged { value: T },
    /// Operation failed
    Failed {
        error: E,
        log_entry: Option<LogEntry>,
    },
}

impl<T, E> ExecutionResult<T, E> {
    /// Extract the result (Ok or Err)
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Logged { value, .. } => Ok(value),
            Self::Unlogged { value } => Ok(value),
            Self::Failed { error, .. } => Err(error),
        }
    }

    /// Get the value and log entry separately
    pub fn split(self) -> (Result<T, E>, Option<LogEntry>) {
        match self {
            Self::Logged { value, log_entry } => (Ok(value), Some(log_entry)),
            Self::Unlogged { value } => (Ok(value), None),
            Self::Failed { error, log_entry } => (Err(error), log_entry),
        }
    }

    /// Check if this should be logged
    pub fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Logged { .. }
                | Self::Failed {
                    log_entry: Some(_),
                    ..
                }
        )
    }
}

impl<E: Display> ExecutionResult<Value, E> {
    /// Wrap the outcome of a mutating operation, logging success and failure alike
    pub fn logged(
        op: impl Into<String>,
        input: Value,
        outcome: Result<Value, E>,
        duration_ms: u64,
    ) -> Self {
        match outcome {
            Ok(value) => Self::Logged {
                log_entry: LogEntry::new(op, input, value.clone(), None, duration_ms),
                value,
            },
            Err(error) => {
                let log_entry = LogEntry::failure(op, input, &error.to_string(), duration_ms);
                Self::Failed {
                    error,
                    log_entry: Some(log_entry),
                }
            }
        }
    }

    /// Wrap the outcome of a read-only operation
    pub fn unlogged(outcome: Result<Value, E>) -> Self {
        match outcome {
            Ok(value) => Self::Unlogged { value },
            Err(error) => Self::Failed {
                error,
                log_entry: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_success() {
        let result: ExecutionResult<Value, String> = ExecutionResult::logged(
            "move lane",
            serde_json::json!({"source_index": 1}),
            Ok(serde_json::json!({"ok": true})),
            2,
        );
        assert!(result.should_log());

        let (value, entry) = result.split();
        assert_eq!(value.unwrap()["ok"], true);
        let entry = entry.unwrap();
        assert_eq!(entry.op, "move lane");
        assert_eq!(entry.output["ok"], true);
    }

    #[test]
    fn test_logged_failure_keeps_error() {
        let result: ExecutionResult<Value, String> =
            ExecutionResult::logged("move card", Value::Null, Err("lane missing".into()), 0);
        assert!(result.should_log());

        let (value, entry) = result.split();
        assert_eq!(value.unwrap_err(), "lane missing");
        assert_eq!(entry.unwrap().output["error"], "lane missing");
    }

    #[test]
    fn test_unlogged() {
        let ok: ExecutionResult<Value, String> = ExecutionResult::unlogged(Ok(Value::Null));
        assert!(!ok.should_log());

        let err: ExecutionResult<Value, String> = ExecutionResult::unlogged(Err("boom".into()));
        assert!(!err.should_log());
        assert!(err.into_result().is_err());
    }
}

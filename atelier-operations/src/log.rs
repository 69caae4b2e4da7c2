//! Log entry types for operation tracking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A log entry recording an operation execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique ID for this log entry (ULID format)
    pub id: String,

    /// When the operation occurred
    pub timestamp: DateTime<Utc>,

    /// Canonical op string (e.g., "add lane", "move card")
    pub op: String,

    /// The normalized input parameters (as JSON)
    pub input: Value,

    /// The result value or error (as JSON)
    pub output: Value,

    /// Who performed the operation (optional)
    /// Format: "user_id" or "agent_name[session_id]"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// How long the operation took (milliseconds)
    pub duration_ms: u64,
}

impl LogEntry {
    /// Create a new log entry
    pub fn new(
        op: impl Into<String>,
        input: Value,
        output: Value,
        actor: Option<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            actor,
            duration_ms,
        }
    }

    /// Create a log entry for a failed operation
    pub fn failure(op: impl Into<String>, input: Value, error: &str, duration_ms: u64) -> Self {
        Self::new(
            op,
            input,
            serde_json::json!({ "error": error }),
            None,
            duration_ms,
        )
    }

    /// Set the actor
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Whether this entry records a failed operation
    pub fn is_failure(&self) -> bool {
        self.output.get("error").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_creation() {
        let entry = LogEntry::new(
            "move lane",
            serde_json::json!({"source_index": 0, "destination_index": 2}),
            serde_json::json!({"id": "board"}),
            None,
            3,
        );

        assert_eq!(entry.op, "move lane");
        assert_eq!(entry.duration_ms, 3);
        assert_eq!(entry.id.len(), 26);
        assert!(entry.actor.is_none());
        assert!(!entry.is_failure());
    }

    #[test]
    fn test_log_entry_with_actor() {
        let entry = LogEntry::new("add card", Value::Null, Value::Null, None, 1)
            .with_actor("alice[tab-2]");

        assert_eq!(entry.actor, Some("alice[tab-2]".into()));
    }

    #[test]
    fn test_failure_entry() {
        let entry = LogEntry::failure("move card", Value::Null, "invalid move", 0);
        assert!(entry.is_failure());
        assert_eq!(entry.output["error"], "invalid move");
    }

    #[test]
    fn test_actor_skipped_when_absent() {
        let entry = LogEntry::new("get board", Value::Null, Value::Null, None, 0);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("actor"));
    }
}

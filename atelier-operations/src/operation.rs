//! Operation metadata and execution traits

use crate::ExecutionResult;
use async_trait::async_trait;
use serde_json::Value;

/// Static metadata describing an operation
///
/// Implemented with the `#[operation]` attribute rather than by hand.
pub trait Operation: Send + Sync {
    /// The verb, e.g. "move"
    fn verb(&self) -> &'static str;

    /// The noun, e.g. "card"
    fn noun(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Canonical op string used in activity logs ("move card")
    fn op_string(&self) -> String {
        format!("{} {}", self.verb(), self.noun())
    }
}

/// Execute an operation against a context
#[async_trait]
pub trait Execute<C, E>: Operation
where
    C: Send + Sync,
    E: Send,
{
    async fn execute(&self, ctx: &C) -> ExecutionResult<Value, E>;
}

//! Operation processor that records board activity

use crate::error::{BoardError, Result};
use crate::session::BoardSession;
use atelier_operations::{async_trait, Execute, OperationProcessor};
use serde_json::Value;
use tracing::warn;

/// Executes board operations and appends their log entries to the board's
/// activity log, attributed to an actor when one is set.
#[derive(Debug, Default, Clone)]
pub struct BoardOperationProcessor {
    actor: Option<String>,
}

impl BoardOperationProcessor {
    /// Processor without actor attribution
    pub fn new() -> Self {
        Self::default()
    }

    /// Processor attributing every entry to `actor`
    pub fn with_actor(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
        }
    }

    /// Processor attributing entries to `actor` if given
    pub fn with_optional_actor(actor: Option<String>) -> Self {
        Self { actor }
    }
}

#[async_trait]
impl OperationProcessor<BoardSession, BoardError> for BoardOperationProcessor {
    async fn process<O>(&self, operation: &O, ctx: &BoardSession) -> Result<Value>
    where
        O: Execute<BoardSession, BoardError>,
    {
        let (result, log_entry) = operation.execute(ctx).await.split();

        if let Some(mut entry) = log_entry {
            if let Some(actor) = &self.actor {
                entry = entry.with_actor(actor.clone());
            }
            // The operation already happened; a lost log line must not undo it.
            if let Err(error) = ctx.record_activity(&entry).await {
                warn!(op = %entry.op, %error, "failed to record activity");
            }
        }

        result
    }
}

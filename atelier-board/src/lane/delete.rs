//! DeleteLane command

use atelier_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use crate::error::{BoardError, Result};
use crate::session::BoardSession;
use crate::types::LaneId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Delete a lane together with its cards
#[operation(verb = "delete", noun = "lane", description = "Delete a lane and its cards")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteLane {
    /// The lane ID to delete
    pub id: LaneId,
}

impl DeleteLane {
    pub fn new(id: impl Into<LaneId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for DeleteLane {
    async fn execute(&self, ctx: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let outcome: Result<Value> = async {
            let reconciliation = ctx.remove_lane(&self.id).await?;
            let mut result = reconciliation.summary()?;
            result["deleted"] = Value::Bool(true);
            result["id"] = serde_json::to_value(&self.id)?;
            Ok(result)
        }
        .await;

        ExecutionResult::logged(
            self.op_string(),
            input,
            outcome,
            start.elapsed().as_millis() as u64,
        )
    }
}

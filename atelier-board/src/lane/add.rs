//! AddLane command

use atelier_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use crate::error::{BoardError, Result};
use crate::session::BoardSession;
use crate::types::LaneId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Append a new empty lane to the board
#[operation(verb = "add", noun = "lane", description = "Append a new lane to the board")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddLane {
    /// The lane display name
    pub name: String,
    /// Explicit lane ID; a ULID is generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LaneId>,
}

impl AddLane {
    /// Create a new AddLane command
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    /// Use a specific lane ID
    pub fn with_id(mut self, id: impl Into<LaneId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for AddLane {
    async fn execute(&self, ctx: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let outcome: Result<Value> = async {
            let id = self.id.clone().unwrap_or_default();
            let reconciliation = ctx.add_lane(id.clone(), self.name.clone()).await?;

            let mut result = reconciliation.summary()?;
            result["id"] = serde_json::to_value(&id)?;
            result["order"] = serde_json::to_value(reconciliation.board.lane_index(&id))?;
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

//! DeleteCard command

use atelier_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use crate::error::{BoardError, Result};
use crate::session::BoardSession;
use crate::types::CardId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Delete a card
#[operation(verb = "delete", noun = "card", description = "Delete a card")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteCard {
    /// The card ID to delete
    pub id: CardId,
}

impl DeleteCard {
    pub fn new(id: impl Into<CardId>) -> Self {
        Self { id: id.into() }
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for DeleteCard {
    async fn execute(&self, ctx: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let outcome: Result<Value> = async {
            let reconciliation = ctx.remove_card(&self.id).await?;
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

//! GetBoard command

use atelier_operations::{async_trait, operation, Execute, ExecutionResult};
use crate::error::{BoardError, Result};
use crate::session::BoardSession;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Get the current snapshot with card counts per lane
#[operation(verb = "get", noun = "board", description = "Retrieve the board with card counts")]
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GetBoard;

#[async_trait]
impl Execute<BoardSession, BoardError> for GetBoard {
    async fn execute(&self, ctx: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let outcome: Result<Value> = async {
            let board = ctx.snapshot().await;

            let counts: BTreeMap<String, usize> = board
                .lanes
                .iter()
                .map(|lane| (lane.id.to_string(), lane.cards.len()))
                .collect();

            let mut result = serde_json::to_value(&board)?;
            result["card_counts"] = serde_json::to_value(&counts)?;
            Ok(result)
        }
        .await;

        ExecutionResult::unlogged(outcome)
    }
}

//! MoveLane command

use atelier_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use crate::error::{BoardError, Result};
use crate::session::BoardSession;
use crate::types::MoveEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Drag a lane to a new position
#[operation(verb = "move", noun = "lane", description = "Move a lane to a new position")]
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveLane {
    pub source_index: usize,
    pub destination_index: usize,
}

impl MoveLane {
    pub fn new(source_index: usize, destination_index: usize) -> Self {
        Self {
            source_index,
            destination_index,
        }
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for MoveLane {
    async fn execute(&self, ctx: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let outcome: Result<Value> = async {
            let event = MoveEvent::lane(self.source_index, self.destination_index);
            ctx.apply_move(&event).await?.summary()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{Board, Lane};
    use crate::BoardConfig;
    use std::sync::Arc;

    async fn setup() -> BoardSession {
        let mut board = Board::new("Test").with_id("b");
        for (order, id) in ["a", "b", "c"].into_iter().enumerate() {
            board.lanes.push(Lane::new(id, id.to_uppercase(), order));
        }
        BoardSession::open(
            Arc::new(MemoryStore::with_board(board)),
            "b".into(),
            &BoardConfig::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_move_lane() {
        let ctx = setup().await;

        let result = MoveLane::new(2, 0)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["changed"], true);
        let lanes = result["commands"][0]["lanes"].as_array().unwrap();
        let ids: Vec<&str> = lanes.iter().map(|l| l["lane_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_move_lane_same_position() {
        let ctx = setup().await;

        let result = MoveLane::new(1, 1)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["changed"], false);
        assert!(result["commands"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_lane_out_of_bounds() {
        let ctx = setup().await;

        let result = MoveLane::new(0, 3).execute(&ctx).await;
        assert!(result.should_log());
        let (outcome, entry) = result.split();
        assert!(matches!(outcome, Err(BoardError::InvalidMove { .. })));
        assert!(entry.unwrap().is_failure());
    }
}

//! MoveCard command

use atelier_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use crate::error::{BoardError, Result};
use crate::session::BoardSession;
use crate::types::{LaneId, MoveEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Drag a card within its lane or into another lane
#[operation(verb = "move", noun = "card", description = "Move a card within or between lanes")]
#[derive(Debug, Deserialize, Serialize)]
pub struct MoveCard {
    pub source_lane: LaneId,
    /// Target lane; the source lane when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_lane: Option<LaneId>,
    pub source_index: usize,
    pub destination_index: usize,
}

impl MoveCard {
    /// Reorder a card inside one lane
    pub fn within(lane: impl Into<LaneId>, source_index: usize, destination_index: usize) -> Self {
        Self {
            source_lane: lane.into(),
            destination_lane: None,
            source_index,
            destination_index,
        }
    }

    /// Move a card from one lane to another
    pub fn across(
        source_lane: impl Into<LaneId>,
        source_index: usize,
        destination_lane: impl Into<LaneId>,
        destination_index: usize,
    ) -> Self {
        Self {
            source_lane: source_lane.into(),
            destination_lane: Some(destination_lane.into()),
            source_index,
            destination_index,
        }
    }

    fn event(&self) -> MoveEvent {
        let destination = self
            .destination_lane
            .clone()
            .unwrap_or_else(|| self.source_lane.clone());
        MoveEvent::card_across(
            self.source_lane.clone(),
            self.source_index,
            destination,
            self.destination_index,
        )
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for MoveCard {
    async fn execute(&self, ctx: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let outcome: Result<Value> = async { ctx.apply_move(&self.event()).await?.summary() }.await;

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
    use crate::store::{BoardStore, MemoryStore};
    use crate::types::{Board, Card, Lane};
    use crate::BoardConfig;
    use std::sync::Arc;

    async fn setup() -> (Arc<MemoryStore>, BoardSession) {
        let mut board = Board::new("Test").with_id("b");
        let mut todo = Lane::new("todo", "To Do", 0);
        todo.cards.push(Card::new("a", "todo", 0));
        todo.cards.push(Card::new("b", "todo", 1));
        todo.cards.push(Card::new("c", "todo", 2));
        let mut done = Lane::new("done", "Done", 1);
        done.cards.push(Card::new("d", "done", 0));
        board.lanes.push(todo);
        board.lanes.push(done);

        let store = Arc::new(MemoryStore::with_board(board));
        let session = BoardSession::open(store.clone(), "b".into(), &BoardConfig::default())
            .await
            .unwrap();
        (store, session)
    }

    #[tokio::test]
    async fn test_move_card_within_lane() {
        let (_store, ctx) = setup().await;

        let result = MoveCard::within("todo", 0, 2)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let cards = result["commands"][0]["cards"].as_array().unwrap();
        let ids: Vec<&str> = cards.iter().map(|c| c["card_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_move_card_across_lanes() {
        let (store, ctx) = setup().await;

        MoveCard::across("todo", 1, "done", 1)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        ctx.flush().await.unwrap();

        let stored = store.load_board(&"b".into()).await.unwrap();
        assert_eq!(stored, ctx.snapshot().await);
        let done = stored.find_lane(&"done".into()).unwrap();
        assert_eq!(done.cards[1].id.as_str(), "b");
        assert_eq!(done.cards[1].lane_id.as_str(), "done");
    }

    #[tokio::test]
    async fn test_move_card_append_to_end_of_other_lane() {
        let (_store, ctx) = setup().await;

        // Cross-lane destination may equal the target length
        let result = MoveCard::across("todo", 0, "done", 1).execute(&ctx).await;
        assert!(result.into_result().is_ok());
    }

    #[tokio::test]
    async fn test_move_card_unknown_lane() {
        let (_store, ctx) = setup().await;

        let result = MoveCard::across("todo", 0, "nowhere", 0)
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(BoardError::InvalidMove { .. })));
    }

    #[test]
    fn test_destination_defaults_to_source() {
        let op: MoveCard = serde_json::from_value(serde_json::json!({
            "source_lane": "todo",
            "source_index": 0,
            "destination_index": 1
        }))
        .unwrap();
        assert_eq!(op.event(), MoveEvent::card_within("todo", 0, 1));
    }
}

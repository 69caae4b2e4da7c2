//! AddCard command

use atelier_operations::{async_trait, operation, Execute, ExecutionResult, Operation};
use crate::error::{BoardError, Result};
use crate::session::BoardSession;
use crate::types::{CardId, LaneId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Append a card to the end of a lane
#[operation(verb = "add", noun = "card", description = "Append a card to a lane")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddCard {
    /// The lane to add the card to
    pub lane: LaneId,
    /// Display name, stored as the `name` field of the card data
    pub name: String,
    /// Additional card fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// Explicit card ID; a ULID is generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CardId>,
}

impl AddCard {
    /// Create a new AddCard command
    pub fn new(lane: impl Into<LaneId>, name: impl Into<String>) -> Self {
        Self {
            lane: lane.into(),
            name: name.into(),
            data: None,
            id: None,
        }
    }

    /// Set additional card fields
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Use a specific card ID
    pub fn with_id(mut self, id: impl Into<CardId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[async_trait]
impl Execute<BoardSession, BoardError> for AddCard {
    async fn execute(&self, ctx: &BoardSession) -> ExecutionResult<Value, BoardError> {
        let start = std::time::Instant::now();
        let input = serde_json::to_value(self).unwrap_or_default();

        let outcome: Result<Value> = async {
            let id = self.id.clone().unwrap_or_default();
            let mut data = self.data.clone().unwrap_or_default();
            data.insert("name".into(), Value::String(self.name.clone()));

            let reconciliation = ctx.add_card(&self.lane, id.clone(), data).await?;

            let mut result = reconciliation.summary()?;
            result["id"] = serde_json::to_value(&id)?;
            result["lane"] = serde_json::to_value(&self.lane)?;
            result["order"] = serde_json::to_value(
                reconciliation.board.find_card(&id).map(|card| card.order),
            )?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{Board, Card, Lane};
    use crate::BoardConfig;
    use std::sync::Arc;

    async fn setup() -> BoardSession {
        let mut board = Board::new("Test").with_id("b");
        let mut todo = Lane::new("todo", "To Do", 0);
        todo.cards.push(Card::new("c1", "todo", 0).with_field("name", "Existing"));
        board.lanes.push(todo);
        BoardSession::open(
            Arc::new(MemoryStore::with_board(board)),
            "b".into(),
            &BoardConfig::default(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_card() {
        let ctx = setup().await;

        let mut data = Map::new();
        data.insert("client".into(), Value::from("Northwind"));
        let result = AddCard::new("todo", "Homepage mockup")
            .with_id("c2")
            .with_data(data)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        assert_eq!(result["id"], "c2");
        assert_eq!(result["order"], 1);
        assert_eq!(result["commands"][0]["type"], "create_card");

        let board = ctx.snapshot().await;
        let card = board.find_card(&CardId::from("c2")).unwrap();
        assert_eq!(card.name(), Some("Homepage mockup"));
        assert_eq!(card.data["client"], "Northwind");
        assert_eq!(card.lane_id, LaneId::from("todo"));
    }

    #[tokio::test]
    async fn test_add_card_unknown_lane() {
        let ctx = setup().await;

        let result = AddCard::new("nope", "Lost").execute(&ctx).await.into_result();
        assert!(matches!(result, Err(BoardError::LaneNotFound { .. })));
    }

    #[tokio::test]
    async fn test_add_card_duplicate_id() {
        let ctx = setup().await;

        let result = AddCard::new("todo", "Again")
            .with_id("c1")
            .execute(&ctx)
            .await
            .into_result();
        assert!(matches!(result, Err(BoardError::DuplicateId { .. })));
    }
}

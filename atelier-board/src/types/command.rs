//! Persistence commands handed to the storage collaborator

use super::board::{Card, Lane};
use super::ids::{CardId, LaneId};
use serde::{Deserialize, Serialize};

/// New position of one lane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneOrder {
    pub lane_id: LaneId,
    pub order: usize,
}

/// New position (and owning lane) of one card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardOrder {
    pub card_id: CardId,
    pub order: usize,
    pub lane_id: LaneId,
}

/// A write the storage collaborator must apply so persisted state matches the
/// snapshot. Batches are applied as one logical operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PersistCommand {
    /// Set the order of every lane on the board
    UpdateLaneOrder { lanes: Vec<LaneOrder> },
    /// Set order and lane membership of every affected card
    UpdateCardOrder { cards: Vec<CardOrder> },
    /// Insert a new lane; its `cards` are always empty
    CreateLane { lane: Lane },
    /// Delete a lane together with its cards
    DeleteLane { lane_id: LaneId },
    /// Insert a new card
    CreateCard { card: Card },
    /// Delete a card
    DeleteCard { card_id: CardId },
}

impl PersistCommand {
    /// Batch update carrying every lane's current position
    pub fn lane_order<'a>(lanes: impl IntoIterator<Item = &'a Lane>) -> Self {
        Self::UpdateLaneOrder {
            lanes: lanes
                .into_iter()
                .map(|lane| LaneOrder {
                    lane_id: lane.id.clone(),
                    order: lane.order,
                })
                .collect(),
        }
    }

    /// Batch update carrying the current position of the given cards
    pub fn card_order<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Self {
        Self::UpdateCardOrder {
            cards: cards
                .into_iter()
                .map(|card| CardOrder {
                    card_id: card.id.clone(),
                    order: card.order,
                    lane_id: card.lane_id.clone(),
                })
                .collect(),
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpdateLaneOrder { .. } => "update_lane_order",
            Self::UpdateCardOrder { .. } => "update_card_order",
            Self::CreateLane { .. } => "create_lane",
            Self::DeleteLane { .. } => "delete_lane",
            Self::CreateCard { .. } => "create_card",
            Self::DeleteCard { .. } => "delete_card",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_order_carries_lane() {
        let cards = vec![Card::new("x", "L2", 0), Card::new("y", "L2", 1)];
        let cmd = PersistCommand::card_order(&cards);
        match cmd {
            PersistCommand::UpdateCardOrder { cards } => {
                assert_eq!(cards.len(), 2);
                assert_eq!(cards[1].card_id.as_str(), "y");
                assert_eq!(cards[1].order, 1);
                assert_eq!(cards[1].lane_id.as_str(), "L2");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_tagged_serialization() {
        let cmd = PersistCommand::DeleteCard {
            card_id: CardId::from("c1"),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "delete_card");
        assert_eq!(json["card_id"], "c1");
        assert_eq!(cmd.kind(), "delete_card");
    }
}

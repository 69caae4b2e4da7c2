//! Board snapshot types: Board, Lane, Card

use super::command::PersistCommand;
use super::ids::{BoardId, CardId, LaneId};
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A complete in-memory board snapshot: lanes in display order, each with its cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    #[serde(default)]
    pub lanes: Vec<Lane>,
}

impl Board {
    /// Create an empty board with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: BoardId::new(),
            name: name.into(),
            lanes: Vec::new(),
        }
    }

    /// Use an explicit board id
    pub fn with_id(mut self, id: impl Into<BoardId>) -> Self {
        self.id = id.into();
        self
    }

    /// Append empty lanes named `names`, ordered as given
    pub fn with_lanes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let order = self.lanes.len();
            self.lanes.push(Lane::new(LaneId::new(), name, order));
        }
        self
    }

    /// Default lanes for a new pipeline board
    pub fn default_lane_names() -> [&'static str; 3] {
        ["To Do", "In Progress", "Done"]
    }

    /// Find a lane by id
    pub fn find_lane(&self, id: &LaneId) -> Option<&Lane> {
        self.lanes.iter().find(|l| &l.id == id)
    }

    /// Position of a lane in the lane sequence
    pub fn lane_index(&self, id: &LaneId) -> Option<usize> {
        self.lanes.iter().position(|l| &l.id == id)
    }

    /// Find a card anywhere on the board
    pub fn find_card(&self, id: &CardId) -> Option<&Card> {
        self.lanes
            .iter()
            .flat_map(|l| l.cards.iter())
            .find(|c| &c.id == id)
    }

    /// Total number of cards across all lanes
    pub fn card_count(&self) -> usize {
        self.lanes.iter().map(|l| l.cards.len()).sum()
    }

    /// Sort lanes and each lane's cards ascending by `order`.
    ///
    /// Stable, so entries sharing an order keep their relative position.
    pub fn sort_by_order(&mut self) {
        self.lanes.sort_by_key(|l| l.order);
        for lane in &mut self.lanes {
            lane.cards.sort_by_key(|c| c.order);
        }
    }

    /// Sort by `order`, renumber lanes and cards to their positions, and point
    /// every card at the lane holding it. Returns true if anything changed.
    ///
    /// Used on boards read back from storage, where a failed write can leave
    /// gaps or duplicate orders behind.
    pub fn normalize(&mut self) -> bool {
        let before = self.clone();
        self.sort_by_order();
        self.renumber_lanes();
        for lane in &mut self.lanes {
            lane.renumber_cards();
            for card in &mut lane.cards {
                card.lane_id = lane.id.clone();
            }
        }
        *self != before
    }

    /// Commands writing the current position of every lane and every card
    pub fn order_commands(&self) -> Vec<PersistCommand> {
        let mut commands = Vec::new();
        if !self.lanes.is_empty() {
            commands.push(PersistCommand::lane_order(&self.lanes));
        }
        if self.card_count() > 0 {
            commands.push(PersistCommand::card_order(
                self.lanes.iter().flat_map(|lane| lane.cards.iter()),
            ));
        }
        commands
    }

    /// Renumber lanes to their positions
    pub(crate) fn renumber_lanes(&mut self) {
        for (order, lane) in self.lanes.iter_mut().enumerate() {
            lane.order = order;
        }
    }

    /// Verify the ordering invariants: contiguous zero-based orders for lanes and
    /// for the cards of every lane, and every card pointing at its owning lane.
    pub fn check_invariants(&self) -> Result<()> {
        for (index, lane) in self.lanes.iter().enumerate() {
            if lane.order != index {
                return Err(BoardError::invariant(format!(
                    "lane '{}' at position {} has order {}",
                    lane.id, index, lane.order
                )));
            }
            for (position, card) in lane.cards.iter().enumerate() {
                if card.order != position {
                    return Err(BoardError::invariant(format!(
                        "card '{}' at position {} in lane '{}' has order {}",
                        card.id, position, lane.id, card.order
                    )));
                }
                if card.lane_id != lane.id {
                    return Err(BoardError::invariant(format!(
                        "card '{}' is stored in lane '{}' but references lane '{}'",
                        card.id, lane.id, card.lane_id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A lane is a named, ordered column of cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneId,
    pub name: String,
    pub order: usize,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Lane {
    /// Create an empty lane
    pub fn new(id: impl Into<LaneId>, name: impl Into<String>, order: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
            cards: Vec::new(),
        }
    }

    /// Renumber this lane's cards to their positions
    pub(crate) fn renumber_cards(&mut self) {
        for (order, card) in self.cards.iter_mut().enumerate() {
            card.order = order;
        }
    }
}

/// A card (ticket) on the board.
///
/// `data` is the host application's payload (name, value, tags, assignee...)
/// and is never inspected by the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub order: usize,
    pub lane_id: LaneId,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl Card {
    /// Create a card with an empty payload
    pub fn new(id: impl Into<CardId>, lane_id: impl Into<LaneId>, order: usize) -> Self {
        Self {
            id: id.into(),
            order,
            lane_id: lane_id.into(),
            data: Map::new(),
        }
    }

    /// Set a payload field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// The card's display name, if the payload carries one
    pub fn name(&self) -> Option<&str> {
        self.data.get("name").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Board {
        let mut board = Board::new("Pipeline").with_id("b1");
        let mut lane = Lane::new("L1", "Leads", 0);
        lane.cards.push(Card::new("c1", "L1", 0).with_field("name", "Acme site"));
        lane.cards.push(Card::new("c2", "L1", 1));
        board.lanes.push(lane);
        board.lanes.push(Lane::new("L2", "Won", 1));
        board
    }

    #[test]
    fn test_board_creation() {
        let board = Board::new("Pipeline");
        assert_eq!(board.name, "Pipeline");
        assert!(board.lanes.is_empty());
        assert_eq!(board.id.as_str().len(), 26);
    }

    #[test]
    fn test_with_lanes_orders_sequentially() {
        let board = Board::new("Test").with_lanes(Board::default_lane_names());
        assert_eq!(board.lanes.len(), 3);
        assert_eq!(board.lanes[0].name, "To Do");
        assert_eq!(board.lanes[2].order, 2);
        assert!(board.check_invariants().is_ok());
    }

    #[test]
    fn test_lookup_helpers() {
        let board = sample();
        assert_eq!(board.lane_index(&LaneId::from("L2")), Some(1));
        assert!(board.find_lane(&LaneId::from("L3")).is_none());
        assert_eq!(
            board.find_card(&CardId::from("c1")).and_then(Card::name),
            Some("Acme site")
        );
        assert_eq!(board.card_count(), 2);
    }

    #[test]
    fn test_sort_by_order() {
        let mut board = sample();
        board.lanes.reverse();
        board.lanes[1].cards.reverse();
        board.sort_by_order();
        assert_eq!(board, sample());
    }

    #[test]
    fn test_invariant_gap_detected() {
        let mut board = sample();
        board.lanes[0].cards[1].order = 2;
        let err = board.check_invariants().unwrap_err();
        assert!(matches!(err, BoardError::InvariantViolation { .. }));
    }

    #[test]
    fn test_invariant_wrong_lane_reference() {
        let mut board = sample();
        board.lanes[0].cards[0].lane_id = LaneId::from("L2");
        assert!(board.check_invariants().is_err());
    }

    #[test]
    fn test_normalize_valid_board_is_untouched() {
        let mut board = sample();
        assert!(!board.normalize());
        assert_eq!(board, sample());
        assert_eq!(board.order_commands().len(), 2);
    }

    #[test]
    fn test_normalize_repairs_gaps_and_duplicates() {
        let mut board = sample();
        // Lane orders duplicated, card orders gapped, one stale lane reference
        board.lanes[1].order = 0;
        board.lanes[0].cards[0].order = 1;
        board.lanes[0].cards[1].order = 4;
        board.lanes[0].cards[1].lane_id = LaneId::from("L2");

        assert!(board.normalize());
        assert!(board.check_invariants().is_ok());
        assert_eq!(board.lanes[0].id.as_str(), "L1");
        let cards: Vec<(&str, usize)> = board.lanes[0]
            .cards
            .iter()
            .map(|c| (c.id.as_str(), c.order))
            .collect();
        assert_eq!(cards, vec![("c1", 0), ("c2", 1)]);
        assert_eq!(board.lanes[0].cards[1].lane_id.as_str(), "L1");
    }

    #[test]
    fn test_order_commands_repair_stored_board() {
        let mut stored = sample();
        stored.lanes[0].cards.remove(0);

        let mut repaired = stored.clone();
        repaired.normalize();
        for command in repaired.order_commands() {
            crate::store::apply_command(&mut stored, &command).unwrap();
        }
        assert_eq!(stored, repaired);
        assert!(stored.check_invariants().is_ok());
    }

    #[test]
    fn test_order_commands_empty_board() {
        assert!(Board::new("Empty").order_commands().is_empty());
    }

    #[test]
    fn test_empty_payload_not_serialized() {
        let card = Card::new("c9", "L1", 0);
        let json = serde_json::to_value(&card).unwrap();
        assert!(json.get("data").is_none());

        let parsed: Card = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, card);
    }
}

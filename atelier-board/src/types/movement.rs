//! Drag-and-drop move events

use super::ids::LaneId;
use serde::{Deserialize, Serialize};

/// A completed drop, as reported by the drag-and-drop surface.
///
/// Cancelled drags (no destination) are filtered out before they get here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveEvent {
    /// A lane was dragged to a new position on the board
    LaneMove {
        source_index: usize,
        destination_index: usize,
    },
    /// A card was dragged within a lane or across lanes
    CardMove {
        source_lane: LaneId,
        destination_lane: LaneId,
        source_index: usize,
        destination_index: usize,
    },
}

impl MoveEvent {
    /// Move the lane at `from` to `to`
    pub fn lane(from: usize, to: usize) -> Self {
        Self::LaneMove {
            source_index: from,
            destination_index: to,
        }
    }

    /// Reorder a card inside one lane
    pub fn card_within(lane: impl Into<LaneId>, from: usize, to: usize) -> Self {
        let lane = lane.into();
        Self::CardMove {
            source_lane: lane.clone(),
            destination_lane: lane,
            source_index: from,
            destination_index: to,
        }
    }

    /// Move a card from one lane to another
    pub fn card_across(
        source_lane: impl Into<LaneId>,
        from: usize,
        destination_lane: impl Into<LaneId>,
        to: usize,
    ) -> Self {
        Self::CardMove {
            source_lane: source_lane.into(),
            destination_lane: destination_lane.into(),
            source_index: from,
            destination_index: to,
        }
    }

    /// True when the drop lands exactly where the drag started
    pub fn is_noop(&self) -> bool {
        match self {
            Self::LaneMove {
                source_index,
                destination_index,
            } => source_index == destination_index,
            Self::CardMove {
                source_lane,
                destination_lane,
                source_index,
                destination_index,
            } => source_lane == destination_lane && source_index == destination_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_detection() {
        assert!(MoveEvent::lane(1, 1).is_noop());
        assert!(!MoveEvent::lane(0, 2).is_noop());
        assert!(MoveEvent::card_within("L", 2, 2).is_noop());
        assert!(!MoveEvent::card_across("L1", 0, "L2", 0).is_noop());
    }

    #[test]
    fn test_wire_format() {
        let event: MoveEvent = serde_json::from_value(serde_json::json!({
            "kind": "card_move",
            "source_lane": "L1",
            "destination_lane": "L2",
            "source_index": 0,
            "destination_index": 1
        }))
        .unwrap();
        assert_eq!(event, MoveEvent::card_across("L1", 0, "L2", 1));
    }
}

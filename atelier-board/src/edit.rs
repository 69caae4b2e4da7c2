//! Adding and removing lanes and cards.
//!
//! Same contract as [`reconcile`](crate::reconcile::reconcile): pure, returns the
//! next snapshot plus persistence commands, keeps orders contiguous.

use crate::error::{BoardError, Result};
use crate::reconcile::Reconciliation;
use crate::types::{Board, Card, CardId, Lane, LaneId, PersistCommand};
use serde_json::{Map, Value};
use tracing::debug;

/// Append a new empty lane at the end of the board
pub fn add_lane(board: &Board, id: LaneId, name: impl Into<String>) -> Result<Reconciliation> {
    if board.find_lane(&id).is_some() {
        return Err(BoardError::duplicate_id("lane", id.to_string()));
    }

    let mut next = board.clone();
    let lane = Lane::new(id, name, next.lanes.len());
    debug!(board = %board.id, lane = %lane.id, order = lane.order, "adding lane");
    next.lanes.push(lane.clone());

    Ok(Reconciliation {
        board: next,
        commands: vec![PersistCommand::CreateLane { lane }],
    })
}

/// Remove a lane and every card in it, closing the gap in lane order
pub fn remove_lane(board: &Board, id: &LaneId) -> Result<Reconciliation> {
    let index = board
        .lane_index(id)
        .ok_or_else(|| BoardError::LaneNotFound { id: id.to_string() })?;

    let mut next = board.clone();
    let removed = next.lanes.remove(index);
    next.renumber_lanes();
    debug!(board = %board.id, lane = %id, cards = removed.cards.len(), "removed lane");

    let mut commands = vec![PersistCommand::DeleteLane {
        lane_id: id.clone(),
    }];
    if !next.lanes.is_empty() {
        commands.push(PersistCommand::lane_order(&next.lanes));
    }

    Ok(Reconciliation {
        board: next,
        commands,
    })
}

/// Append a card to the end of a lane
pub fn add_card(
    board: &Board,
    lane_id: &LaneId,
    card_id: CardId,
    data: Map<String, Value>,
) -> Result<Reconciliation> {
    let index = board.lane_index(lane_id).ok_or_else(|| BoardError::LaneNotFound {
        id: lane_id.to_string(),
    })?;
    if board.find_card(&card_id).is_some() {
        return Err(BoardError::duplicate_id("card", card_id.to_string()));
    }

    let mut next = board.clone();
    let lane = &mut next.lanes[index];
    let card = Card {
        id: card_id,
        order: lane.cards.len(),
        lane_id: lane.id.clone(),
        data,
    };
    debug!(board = %board.id, lane = %lane_id, card = %card.id, order = card.order, "adding card");
    lane.cards.push(card.clone());

    Ok(Reconciliation {
        board: next,
        commands: vec![PersistCommand::CreateCard { card }],
    })
}

/// Remove a card, closing the gap in its lane
pub fn remove_card(board: &Board, card_id: &CardId) -> Result<Reconciliation> {
    let (lane_index, position) = board
        .lanes
        .iter()
        .enumerate()
        .find_map(|(i, lane)| {
            lane.cards
                .iter()
                .position(|c| &c.id == card_id)
                .map(|p| (i, p))
        })
        .ok_or_else(|| BoardError::CardNotFound {
            id: card_id.to_string(),
        })?;

    let mut next = board.clone();
    let lane = &mut next.lanes[lane_index];
    lane.cards.remove(position);
    lane.renumber_cards();

    let mut commands = vec![PersistCommand::DeleteCard {
        card_id: card_id.clone(),
    }];
    if !lane.cards.is_empty() {
        commands.push(PersistCommand::card_order(&lane.cards));
    }
    debug!(board = %board.id, card = %card_id, "removed card");

    Ok(Reconciliation {
        board: next,
        commands,
    })
}

//! Drag-and-drop reconciliation.
//!
//! [`reconcile`] takes the current snapshot and one move event and returns a new
//! snapshot together with the persistence commands that bring stored state in
//! line with it. The input snapshot is never modified and performs no I/O.
//!
//! Moves use remove-then-insert semantics: the item is taken out at
//! `source_index` first, then inserted at `destination_index` of the shortened
//! sequence. This matches what drag-and-drop libraries report.

use crate::error::{BoardError, Result};
use crate::types::{Board, LaneId, MoveEvent, PersistCommand};
use serde_json::Value;
use tracing::debug;

/// Outcome of a reconciliation: the next snapshot and the writes that persist it
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub board: Board,
    pub commands: Vec<PersistCommand>,
}

impl Reconciliation {
    /// A reconciliation that changes nothing
    pub fn unchanged(board: &Board) -> Self {
        Self {
            board: board.clone(),
            commands: Vec::new(),
        }
    }

    /// True when there is nothing to persist
    pub fn is_noop(&self) -> bool {
        self.commands.is_empty()
    }

    /// JSON summary for operation results and activity logs
    pub fn summary(&self) -> Result<Value> {
        Ok(serde_json::json!({
            "board_id": self.board.id,
            "changed": !self.is_noop(),
            "commands": serde_json::to_value(&self.commands)?,
        }))
    }
}

/// Apply one move event to `board`.
///
/// Out-of-range indices and unknown lanes fail with [`BoardError::InvalidMove`]
/// rather than being clamped. Validation runs before the no-op check.
pub fn reconcile(board: &Board, event: &MoveEvent) -> Result<Reconciliation> {
    match event {
        MoveEvent::LaneMove {
            source_index,
            destination_index,
        } => move_lane(board, *source_index, *destination_index),
        MoveEvent::CardMove {
            source_lane,
            destination_lane,
            source_index,
            destination_index,
        } => move_card(
            board,
            source_lane,
            destination_lane,
            *source_index,
            *destination_index,
        ),
    }
}

fn move_lane(board: &Board, from: usize, to: usize) -> Result<Reconciliation> {
    let count = board.lanes.len();
    if from >= count {
        return Err(BoardError::invalid_move(format!(
            "lane source index {} out of bounds for {} lanes",
            from, count
        )));
    }
    if to >= count {
        return Err(BoardError::invalid_move(format!(
            "lane destination index {} out of bounds for {} lanes",
            to, count
        )));
    }
    if from == to {
        return Ok(Reconciliation::unchanged(board));
    }

    let mut next = board.clone();
    let lane = next.lanes.remove(from);
    next.lanes.insert(to, lane);
    // Every lane between the two positions shifted, so all of them are rewritten.
    next.renumber_lanes();

    let commands = vec![PersistCommand::lane_order(&next.lanes)];
    debug!(board = %board.id, from, to, "reconciled lane move");
    Ok(Reconciliation {
        board: next,
        commands,
    })
}

fn move_card(
    board: &Board,
    source_lane: &LaneId,
    destination_lane: &LaneId,
    from: usize,
    to: usize,
) -> Result<Reconciliation> {
    let src = lane_position(board, source_lane, "source")?;
    let dst = lane_position(board, destination_lane, "destination")?;

    let src_len = board.lanes[src].cards.len();
    if from >= src_len {
        return Err(BoardError::invalid_move(format!(
            "card source index {} out of bounds for lane '{}' with {} cards",
            from, source_lane, src_len
        )));
    }

    if src == dst {
        if to >= src_len {
            return Err(BoardError::invalid_move(format!(
                "card destination index {} out of bounds for lane '{}' with {} cards",
                to, destination_lane, src_len
            )));
        }
        if from == to {
            return Ok(Reconciliation::unchanged(board));
        }

        let mut next = board.clone();
        let lane = &mut next.lanes[src];
        let card = lane.cards.remove(from);
        lane.cards.insert(to, card);
        lane.renumber_cards();

        let commands = vec![PersistCommand::card_order(&lane.cards)];
        debug!(board = %board.id, lane = %source_lane, from, to, "reconciled card reorder");
        return Ok(Reconciliation {
            board: next,
            commands,
        });
    }

    let dst_len = board.lanes[dst].cards.len();
    if to > dst_len {
        return Err(BoardError::invalid_move(format!(
            "card destination index {} out of bounds for lane '{}' with {} cards",
            to, destination_lane, dst_len
        )));
    }

    let mut next = board.clone();
    let mut card = next.lanes[src].cards.remove(from);
    next.lanes[src].renumber_cards();

    card.lane_id = next.lanes[dst].id.clone();
    next.lanes[dst].cards.insert(to, card);
    next.lanes[dst].renumber_cards();

    let commands = vec![PersistCommand::card_order(
        next.lanes[dst].cards.iter().chain(next.lanes[src].cards.iter()),
    )];
    debug!(
        board = %board.id,
        source = %source_lane,
        destination = %destination_lane,
        from,
        to,
        "reconciled cross-lane card move"
    );
    Ok(Reconciliation {
        board: next,
        commands,
    })
}

fn lane_position(board: &Board, id: &LaneId, role: &str) -> Result<usize> {
    board
        .lane_index(id)
        .ok_or_else(|| BoardError::invalid_move(format!("{} lane '{}' is not on board", role, id)))
}

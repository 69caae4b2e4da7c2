//! Storage collaborators
//!
//! The reconciler never touches storage. A [`BoardStore`] loads snapshots and
//! applies the [`PersistCommand`]s a session dispatches to it.

mod file;
mod memory;

pub use file::{FileStore, StoreLock, STORAGE_DIR};
pub use memory::MemoryStore;

use crate::error::{BoardError, Result};
use crate::types::{Board, BoardId, Card, CardId, PersistCommand};
use async_trait::async_trait;
use atelier_operations::LogEntry;

/// Persisted board state, as seen by a session
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Persist a brand new board
    async fn create_board(&self, board: &Board) -> Result<()>;

    /// Load a board with lanes and cards sorted ascending by `order`
    async fn load_board(&self, id: &BoardId) -> Result<Board>;

    /// Ids of every stored board, sorted
    async fn list_board_ids(&self) -> Result<Vec<BoardId>>;

    /// Apply one persistence command to a stored board
    async fn apply(&self, board_id: &BoardId, command: &PersistCommand) -> Result<()>;

    /// Append an entry to the board's activity log
    async fn append_activity(&self, board_id: &BoardId, entry: &LogEntry) -> Result<()>;

    /// Read activity entries, newest first
    async fn read_activity(&self, board_id: &BoardId, limit: Option<usize>)
        -> Result<Vec<LogEntry>>;
}

/// Apply a persistence command to a stored board the way a relational store
/// would: write the new `order`/`lane_id` values, then re-sort by `order`.
///
/// On error the board may be partially updated; stores apply to a copy and
/// only commit on success.
pub fn apply_command(board: &mut Board, command: &PersistCommand) -> Result<()> {
    match command {
        PersistCommand::UpdateLaneOrder { lanes } => {
            for update in lanes {
                let lane = board
                    .lanes
                    .iter_mut()
                    .find(|l| l.id == update.lane_id)
                    .ok_or_else(|| BoardError::LaneNotFound {
                        id: update.lane_id.to_string(),
                    })?;
                lane.order = update.order;
            }
            board.lanes.sort_by_key(|l| l.order);
        }
        PersistCommand::UpdateCardOrder { cards } => {
            for update in cards {
                let card = take_card(board, &update.card_id)?;
                let lane = board
                    .lanes
                    .iter_mut()
                    .find(|l| l.id == update.lane_id)
                    .ok_or_else(|| BoardError::LaneNotFound {
                        id: update.lane_id.to_string(),
                    })?;
                lane.cards.push(Card {
                    order: update.order,
                    lane_id: update.lane_id.clone(),
                    ..card
                });
            }
            for lane in &mut board.lanes {
                lane.cards.sort_by_key(|c| c.order);
            }
        }
        PersistCommand::CreateLane { lane } => {
            if board.find_lane(&lane.id).is_some() {
                return Err(BoardError::duplicate_id("lane", lane.id.to_string()));
            }
            board.lanes.push(lane.clone());
            board.lanes.sort_by_key(|l| l.order);
        }
        PersistCommand::DeleteLane { lane_id } => {
            let index = board
                .lane_index(lane_id)
                .ok_or_else(|| BoardError::LaneNotFound {
                    id: lane_id.to_string(),
                })?;
            board.lanes.remove(index);
        }
        PersistCommand::CreateCard { card } => {
            if board.find_card(&card.id).is_some() {
                return Err(BoardError::duplicate_id("card", card.id.to_string()));
            }
            let lane = board
                .lanes
                .iter_mut()
                .find(|l| l.id == card.lane_id)
                .ok_or_else(|| BoardError::LaneNotFound {
                    id: card.lane_id.to_string(),
                })?;
            lane.cards.push(card.clone());
            lane.cards.sort_by_key(|c| c.order);
        }
        PersistCommand::DeleteCard { card_id } => {
            take_card(board, card_id)?;
        }
    }
    Ok(())
}

fn take_card(board: &mut Board, id: &CardId) -> Result<Card> {
    for lane in &mut board.lanes {
        if let Some(position) = lane.cards.iter().position(|c| &c.id == id) {
            return Ok(lane.cards.remove(position));
        }
    }
    Err(BoardError::CardNotFound { id: id.to_string() })
}

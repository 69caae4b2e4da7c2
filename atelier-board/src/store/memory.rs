//! In-memory board store

use super::{apply_command, BoardStore};
use crate::error::{BoardError, Result};
use crate::types::{Board, BoardId, PersistCommand};
use async_trait::async_trait;
use atelier_operations::LogEntry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::trace;

/// Board store kept entirely in memory.
///
/// Used by tests and by hosts that persist elsewhere. [`fail_next_writes`]
/// simulates a storage outage.
///
/// [`fail_next_writes`]: MemoryStore::fail_next_writes
#[derive(Default)]
pub struct MemoryStore {
    boards: RwLock<HashMap<BoardId, Board>>,
    activity: RwLock<HashMap<BoardId, Vec<LogEntry>>>,
    failing_writes: AtomicUsize,
    applied: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one board
    pub fn with_board(board: Board) -> Self {
        let mut boards = HashMap::new();
        boards.insert(board.id.clone(), board);
        Self {
            boards: RwLock::new(boards),
            ..Self::default()
        }
    }

    /// Make the next `count` calls to `apply` fail
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Number of commands applied successfully so far
    pub fn applied_count(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn create_board(&self, board: &Board) -> Result<()> {
        let mut boards = self.boards.write().await;
        if boards.contains_key(&board.id) {
            return Err(BoardError::duplicate_id("board", board.id.to_string()));
        }
        boards.insert(board.id.clone(), board.clone());
        Ok(())
    }

    async fn load_board(&self, id: &BoardId) -> Result<Board> {
        let boards = self.boards.read().await;
        let mut board = boards
            .get(id)
            .cloned()
            .ok_or_else(|| BoardError::BoardNotFound { id: id.to_string() })?;
        board.sort_by_order();
        Ok(board)
    }

    async fn list_board_ids(&self) -> Result<Vec<BoardId>> {
        let mut ids: Vec<BoardId> = self.boards.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn apply(&self, board_id: &BoardId, command: &PersistCommand) -> Result<()> {
        if self.take_failure() {
            return Err(BoardError::persistence(format!(
                "simulated failure applying {}",
                command.kind()
            )));
        }

        let mut boards = self.boards.write().await;
        let stored = boards
            .get_mut(board_id)
            .ok_or_else(|| BoardError::BoardNotFound {
                id: board_id.to_string(),
            })?;

        let mut updated = stored.clone();
        apply_command(&mut updated, command)?;
        *stored = updated;

        self.applied.fetch_add(1, Ordering::SeqCst);
        trace!(board = %board_id, command = command.kind(), "applied command in memory");
        Ok(())
    }

    async fn append_activity(&self, board_id: &BoardId, entry: &LogEntry) -> Result<()> {
        self.activity
            .write()
            .await
            .entry(board_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn read_activity(
        &self,
        board_id: &BoardId,
        limit: Option<usize>,
    ) -> Result<Vec<LogEntry>> {
        let activity = self.activity.read().await;
        let mut entries: Vec<LogEntry> = activity
            .get(board_id)
            .map(|entries| entries.iter().rev().cloned().collect())
            .unwrap_or_default();
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CardId, LaneId};

    fn board() -> Board {
        Board::new("Memory").with_id("m").with_lanes(["A", "B"])
    }

    #[tokio::test]
    async fn test_create_and_load() {
        let store = MemoryStore::new();
        store.create_board(&board()).await.unwrap();

        let loaded = store.load_board(&BoardId::from("m")).await.unwrap();
        assert_eq!(loaded.lanes.len(), 2);
        assert_eq!(store.list_board_ids().await.unwrap(), vec![BoardId::from("m")]);

        let dup = store.create_board(&board()).await;
        assert!(matches!(dup, Err(BoardError::DuplicateId { .. })));
    }

    #[tokio::test]
    async fn test_load_missing_board() {
        let store = MemoryStore::new();
        let result = store.load_board(&BoardId::from("nope")).await;
        assert!(matches!(result, Err(BoardError::BoardNotFound { .. })));
    }

    #[tokio::test]
    async fn test_apply_and_simulated_failure() {
        let store = MemoryStore::with_board(board());
        let lane = store.load_board(&"m".into()).await.unwrap().lanes[0].id.clone();
        let create = PersistCommand::CreateCard {
            card: crate::types::Card::new("c1", lane, 0),
        };

        store.fail_next_writes(1);
        let err = store.apply(&"m".into(), &create).await.unwrap_err();
        assert!(matches!(err, BoardError::Persistence { .. }));
        assert_eq!(store.applied_count(), 0);

        store.apply(&"m".into(), &create).await.unwrap();
        assert_eq!(store.applied_count(), 1);
        let loaded = store.load_board(&"m".into()).await.unwrap();
        assert!(loaded.find_card(&CardId::from("c1")).is_some());
    }

    #[tokio::test]
    async fn test_failed_command_leaves_board_untouched() {
        let store = MemoryStore::with_board(board());
        let before = store.load_board(&"m".into()).await.unwrap();

        let result = store
            .apply(
                &"m".into(),
                &PersistCommand::DeleteLane {
                    lane_id: LaneId::from("ghost"),
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(store.load_board(&"m".into()).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_activity_newest_first() {
        let store = MemoryStore::new();
        let id = BoardId::from("m");
        for op in ["add lane", "move lane", "add card"] {
            let entry = LogEntry::new(op, serde_json::Value::Null, serde_json::Value::Null, None, 0);
            store.append_activity(&id, &entry).await.unwrap();
        }

        let entries = store.read_activity(&id, Some(2)).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].op, "add card");
        assert_eq!(entries[1].op, "move lane");
    }
}

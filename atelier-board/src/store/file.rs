//! File-backed board store
//!
//! ```text
//! project/
//! └── .atelier/
//!     ├── .lock                # held while a command is applied
//!     └── boards/
//!         ├── {id}.yaml        # Board snapshot (YAML)
//!         └── {id}.jsonl       # Activity log, one JSON LogEntry per line
//! ```

use super::{apply_command, BoardStore};
use crate::error::{BoardError, Result};
use crate::types::{Board, BoardId, PersistCommand};
use async_trait::async_trait;
use atelier_operations::LogEntry;
use fs2::FileExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

/// Default storage directory name under a project root
pub const STORAGE_DIR: &str = ".atelier";

/// Board store rooted at an `.atelier` directory
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Path to the .atelier directory
    root: PathBuf,
}

impl FileStore {
    /// Create a store for the given storage directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    /// Get the root .atelier directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the boards directory
    pub fn boards_dir(&self) -> PathBuf {
        self.root.join("boards")
    }

    /// Path to a board's YAML snapshot
    pub fn board_path(&self, id: &BoardId) -> PathBuf {
        self.boards_dir().join(format!("{}.yaml", id))
    }

    /// Path to a board's activity log
    pub fn activity_path(&self, id: &BoardId) -> PathBuf {
        self.boards_dir().join(format!("{}.jsonl", id))
    }

    /// Path to the lock file
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".lock")
    }

    // =========================================================================
    // Board I/O
    // =========================================================================

    async fn read_board(&self, id: &BoardId) -> Result<Board> {
        let path = self.board_path(id);
        if !path.exists() {
            return Err(BoardError::BoardNotFound { id: id.to_string() });
        }

        let content = fs::read_to_string(&path).await?;
        let board: Board = serde_yaml_ng::from_str(&content)?;
        Ok(board)
    }

    async fn write_board(&self, board: &Board) -> Result<()> {
        let content = serde_yaml_ng::to_string(board)?;
        atomic_write(&self.board_path(&board.id), content.as_bytes()).await
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Try to acquire an exclusive lock (non-blocking)
    pub async fn lock(&self) -> Result<StoreLock> {
        let lock_path = self.lock_path();

        // Ensure parent directory exists
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;

        // Non-blocking lock attempt
        match file.try_lock_exclusive() {
            Ok(()) => Ok(StoreLock { file }),
            Err(_) => Err(BoardError::LockBusy),
        }
    }
}

/// Board ids become file names, so they must not escape the boards directory
fn check_id(id: &BoardId) -> Result<()> {
    let id = id.as_str();
    if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
        return Err(BoardError::persistence(format!(
            "board id '{}' cannot be used as a file name",
            id
        )));
    }
    Ok(())
}

#[async_trait]
impl BoardStore for FileStore {
    async fn create_board(&self, board: &Board) -> Result<()> {
        check_id(&board.id)?;
        fs::create_dir_all(self.boards_dir()).await?;
        if self.board_path(&board.id).exists() {
            return Err(BoardError::duplicate_id("board", board.id.to_string()));
        }
        self.write_board(board).await?;
        debug!(board = %board.id, path = %self.board_path(&board.id).display(), "created board");
        Ok(())
    }

    async fn load_board(&self, id: &BoardId) -> Result<Board> {
        check_id(id)?;
        let mut board = self.read_board(id).await?;
        board.sort_by_order();
        Ok(board)
    }

    async fn list_board_ids(&self) -> Result<Vec<BoardId>> {
        let dir = self.boards_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(BoardId::from_string(stem));
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn apply(&self, board_id: &BoardId, command: &PersistCommand) -> Result<()> {
        check_id(board_id)?;
        let _lock = self.lock().await?;

        let mut board = self.read_board(board_id).await?;
        apply_command(&mut board, command)?;
        // Commands arrive one at a time, so a batch may pass through states
        // with gaps. Logged only; the write still goes ahead.
        if let Err(error) = board.check_invariants() {
            warn!(board = %board_id, command = command.kind(), %error, "stored board violates ordering invariants");
        }
        self.write_board(&board).await?;

        trace!(board = %board_id, command = command.kind(), "applied command to file");
        Ok(())
    }

    async fn append_activity(&self, board_id: &BoardId, entry: &LogEntry) -> Result<()> {
        check_id(board_id)?;
        fs::create_dir_all(self.boards_dir()).await?;

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.activity_path(board_id))
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }

    async fn read_activity(
        &self,
        board_id: &BoardId,
        limit: Option<usize>,
    ) -> Result<Vec<LogEntry>> {
        check_id(board_id)?;
        let path = self.activity_path(board_id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let mut entries: Vec<LogEntry> = content
            .lines()
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        // Reverse to get newest first
        entries.reverse();

        if let Some(limit) = limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }
}

/// RAII lock guard - releases on drop
pub struct StoreLock {
    file: std::fs::File,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Atomic write via temp file + rename
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;

    // Rename (atomic on same filesystem)
    fs::rename(&temp_path, path).await?;

    Ok(())
}

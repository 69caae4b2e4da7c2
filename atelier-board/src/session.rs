//! BoardSession - the single writer for one board's snapshot
//!
//! A session owns the in-memory snapshot and applies every mutation through the
//! pure reconciler while holding the snapshot lock, so mutations are serialized.
//! The resulting persistence commands go onto a bounded queue drained by a
//! dispatcher task. Write failures never touch the caller's result: they are
//! broadcast as [`PersistenceFailure`]s, and with `reload_on_failure` the
//! snapshot is replaced by stored state once the queue is empty.

use crate::config::BoardConfig;
use crate::edit;
use crate::error::{BoardError, Result};
use crate::reconcile::{reconcile, Reconciliation};
use crate::store::BoardStore;
use crate::types::{Board, BoardId, CardId, LaneId, MoveEvent, PersistCommand};
use atelier_operations::LogEntry;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const FAILURE_CHANNEL_CAPACITY: usize = 32;

/// A persistence write that failed after its reconciliation was already applied
#[derive(Debug, Clone, Serialize)]
pub struct PersistenceFailure {
    pub board_id: BoardId,
    /// The command the store rejected
    pub command: PersistCommand,
    pub message: String,
    /// Commands later in the same batch that were not attempted
    pub skipped: usize,
    pub at: DateTime<Utc>,
}

enum Dispatch {
    Apply(Vec<PersistCommand>),
    Flush(oneshot::Sender<()>),
}

/// Editing session for one board
pub struct BoardSession {
    board_id: BoardId,
    snapshot: Arc<Mutex<Board>>,
    store: Arc<dyn BoardStore>,
    queue: mpsc::Sender<Dispatch>,
    failures: broadcast::Sender<PersistenceFailure>,
    dispatcher: JoinHandle<()>,
}

impl BoardSession {
    /// Load the board from `store` and start dispatching to it.
    ///
    /// Must be called within a tokio runtime.
    pub async fn open(
        store: Arc<dyn BoardStore>,
        board_id: BoardId,
        config: &BoardConfig,
    ) -> Result<Self> {
        let mut board = store.load_board(&board_id).await?;
        let repair = repair_loaded(&mut board);
        debug!(board = %board_id, lanes = board.lanes.len(), cards = board.card_count(), "opened board session");

        let snapshot = Arc::new(Mutex::new(board));
        let (queue, rx) = mpsc::channel(config.dispatch_capacity.max(1));
        let (failures, _) = broadcast::channel(FAILURE_CHANNEL_CAPACITY);

        let dispatcher = Dispatcher {
            board_id: board_id.clone(),
            store: Arc::clone(&store),
            snapshot: Arc::clone(&snapshot),
            failures: failures.clone(),
            reload_on_failure: config.reload_on_failure,
        };
        let dispatcher = tokio::spawn(dispatcher.run(rx));
        if let Some(commands) = repair {
            queue
                .send(Dispatch::Apply(commands))
                .await
                .map_err(|_| BoardError::DispatcherClosed)?;
        }

        Ok(Self {
            board_id,
            snapshot,
            store,
            queue,
            failures,
            dispatcher,
        })
    }

    /// The board this session edits
    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    /// The store commands are dispatched to
    pub fn store(&self) -> &Arc<dyn BoardStore> {
        &self.store
    }

    /// Copy of the current snapshot
    pub async fn snapshot(&self) -> Board {
        self.snapshot.lock().await.clone()
    }

    /// Apply a drag-and-drop move
    pub async fn apply_move(&self, event: &MoveEvent) -> Result<Reconciliation> {
        self.commit(|board| reconcile(board, event)).await
    }

    /// Append a lane
    pub async fn add_lane(&self, id: LaneId, name: String) -> Result<Reconciliation> {
        self.commit(|board| edit::add_lane(board, id, name)).await
    }

    /// Remove a lane and its cards
    pub async fn remove_lane(&self, id: &LaneId) -> Result<Reconciliation> {
        self.commit(|board| edit::remove_lane(board, id)).await
    }

    /// Append a card to a lane
    pub async fn add_card(
        &self,
        lane: &LaneId,
        id: CardId,
        data: Map<String, Value>,
    ) -> Result<Reconciliation> {
        self.commit(|board| edit::add_card(board, lane, id, data)).await
    }

    /// Remove a card
    pub async fn remove_card(&self, id: &CardId) -> Result<Reconciliation> {
        self.commit(|board| edit::remove_card(board, id)).await
    }

    /// Reconcile against the current snapshot, swap it, and queue the writes.
    /// The snapshot lock is held throughout so callers never interleave.
    async fn commit<F>(&self, change: F) -> Result<Reconciliation>
    where
        F: FnOnce(&Board) -> Result<Reconciliation>,
    {
        let mut snapshot = self.snapshot.lock().await;
        let reconciliation = change(&*snapshot)?;
        if reconciliation.is_noop() {
            return Ok(reconciliation);
        }

        self.queue
            .send(Dispatch::Apply(reconciliation.commands.clone()))
            .await
            .map_err(|_| BoardError::DispatcherClosed)?;
        *snapshot = reconciliation.board.clone();

        Ok(reconciliation)
    }

    /// Wait until every queued command has been attempted
    pub async fn flush(&self) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.queue
            .send(Dispatch::Flush(done))
            .await
            .map_err(|_| BoardError::DispatcherClosed)?;
        wait.await.map_err(|_| BoardError::DispatcherClosed)
    }

    /// Drain the queue, then rebuild the snapshot from stored state.
    ///
    /// Stored orders broken by an earlier failed write are renumbered, and the
    /// repaired positions are queued back to the store.
    pub async fn reload(&self) -> Result<Board> {
        self.flush().await?;
        let mut snapshot = self.snapshot.lock().await;
        let mut board = self.store.load_board(&self.board_id).await?;
        if let Some(commands) = repair_loaded(&mut board) {
            self.queue
                .send(Dispatch::Apply(commands))
                .await
                .map_err(|_| BoardError::DispatcherClosed)?;
        }
        *snapshot = board.clone();
        info!(board = %self.board_id, "reloaded board from storage");
        Ok(board)
    }

    /// Receive persistence failures reported after this call
    pub fn subscribe_failures(&self) -> broadcast::Receiver<PersistenceFailure> {
        self.failures.subscribe()
    }

    /// Append an entry to the board's activity log
    pub async fn record_activity(&self, entry: &LogEntry) -> Result<()> {
        self.store.append_activity(&self.board_id, entry).await
    }

    /// Activity entries, newest first
    pub async fn activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        self.store.read_activity(&self.board_id, limit).await
    }

    /// Stop accepting mutations and wait for queued writes to finish
    pub async fn close(self) -> Result<()> {
        let Self {
            queue, dispatcher, ..
        } = self;
        drop(queue);
        dispatcher.await.map_err(|_| BoardError::DispatcherClosed)
    }
}

struct Dispatcher {
    board_id: BoardId,
    store: Arc<dyn BoardStore>,
    snapshot: Arc<Mutex<Board>>,
    failures: broadcast::Sender<PersistenceFailure>,
    reload_on_failure: bool,
}

impl Dispatcher {
    async fn run(self, mut rx: mpsc::Receiver<Dispatch>) {
        let mut pending_reload = false;

        while let Some(message) = rx.recv().await {
            match message {
                Dispatch::Apply(batch) => {
                    if !self.apply_batch(batch).await && self.reload_on_failure {
                        pending_reload = true;
                    }
                }
                Dispatch::Flush(done) => {
                    if pending_reload {
                        pending_reload = !self.reload_if_idle(&rx).await;
                    }
                    let _ = done.send(());
                    continue;
                }
            }

            if pending_reload {
                pending_reload = !self.reload_if_idle(&rx).await;
            }
        }

        debug!(board = %self.board_id, "dispatcher stopped");
    }

    /// Apply a batch in order, stopping at the first failure. Returns false on failure.
    async fn apply_batch(&self, batch: Vec<PersistCommand>) -> bool {
        let total = batch.len();
        for (index, command) in batch.into_iter().enumerate() {
            if let Err(error) = self.store.apply(&self.board_id, &command).await {
                let skipped = total - index - 1;
                warn!(
                    board = %self.board_id,
                    command = command.kind(),
                    skipped,
                    %error,
                    "persistence write failed"
                );
                // No subscribers is fine; the warning above is the record.
                let _ = self.failures.send(PersistenceFailure {
                    board_id: self.board_id.clone(),
                    command,
                    message: error.to_string(),
                    skipped,
                    at: Utc::now(),
                });
                return false;
            }
            debug!(board = %self.board_id, command = command.kind(), "persisted command");
        }
        true
    }

    /// Replace the snapshot with stored state if nothing is queued.
    ///
    /// Movers enqueue while holding the snapshot lock, so checking the queue
    /// under that lock cannot race with a new mutation. Returns true once the
    /// reload has been attempted.
    async fn reload_if_idle(&self, rx: &mpsc::Receiver<Dispatch>) -> bool {
        let mut snapshot = self.snapshot.lock().await;
        if !rx.is_empty() {
            return false;
        }

        match self.store.load_board(&self.board_id).await {
            Ok(mut board) => {
                let repair = repair_loaded(&mut board);
                *snapshot = board;
                info!(board = %self.board_id, "snapshot reloaded after failed write");
                if let Some(commands) = repair {
                    self.apply_batch(commands).await;
                }
            }
            Err(error) => {
                warn!(board = %self.board_id, %error, "could not reload snapshot after failed write");
            }
        }
        true
    }
}

/// Renumber a board read from storage. Returns the commands that write the
/// repaired positions back, or `None` if storage already held valid orders.
fn repair_loaded(board: &mut Board) -> Option<Vec<PersistCommand>> {
    if !board.normalize() {
        return None;
    }
    warn!(board = %board.id, "stored board had broken ordering; renumbered");
    Some(board.order_commands())
}

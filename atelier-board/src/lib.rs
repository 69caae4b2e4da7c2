//! Kanban board reconciler
//!
//! Keeps an in-memory board (lanes of cards) consistent under drag-and-drop and
//! turns every change into persistence commands for a storage collaborator.
//!
//! ## Overview
//!
//! - **Pure reconciliation** - [`reconcile`] maps (snapshot, move) to (snapshot, commands)
//! - **Contiguous ordering** - lane and card `order` values are always `0..n`
//! - **Optimistic sessions** - [`BoardSession`] applies changes immediately and
//!   persists them in the background, reporting failures out-of-band
//! - **Audited** - operations run through [`BoardOperationProcessor`] land in an
//!   activity log
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use atelier_board::{
//!     lane::MoveLane, Board, BoardConfig, BoardOperationProcessor, BoardSession, MemoryStore,
//!     OperationProcessor,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let board = Board::new("Client pipeline").with_lanes(["Leads", "Proposal", "Won"]);
//! let store = Arc::new(MemoryStore::with_board(board.clone()));
//! let session = BoardSession::open(store, board.id.clone(), &BoardConfig::default()).await?;
//!
//! let processor = BoardOperationProcessor::with_actor("alice");
//! let result = processor.process(&MoveLane::new(0, 2), &session).await?;
//! println!("persisting: {}", result["commands"]);
//!
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

mod config;
pub mod edit;
mod error;
mod processor;
pub mod reconcile;
mod session;
pub mod store;
pub mod types;

// Operation modules
pub mod board;
pub mod card;
pub mod lane;

// Re-export Execute trait and types from operations crate
pub use atelier_operations::{
    async_trait, Execute, ExecutionResult, LogEntry, Operation, OperationProcessor,
};

pub use config::BoardConfig;
pub use error::{BoardError, Result};
pub use processor::BoardOperationProcessor;
pub use reconcile::{reconcile, Reconciliation};
pub use session::{BoardSession, PersistenceFailure};
pub use store::{BoardStore, FileStore, MemoryStore};

// Re-export commonly used types
pub use types::{
    Board, BoardId, Card, CardId, CardOrder, Lane, LaneId, LaneOrder, MoveEvent, PersistCommand,
};

//! Core types for the board reconciler

mod board;
mod command;
mod ids;
mod movement;

// Re-export all types
pub use board::{Board, Card, Lane};
pub use command::{CardOrder, LaneOrder, PersistCommand};
pub use ids::{BoardId, CardId, LaneId};
pub use movement::MoveEvent;

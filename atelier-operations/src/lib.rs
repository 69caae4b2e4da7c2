//! # Atelier Operations
//!
//! This crate provides the `Operation` trait for defining board operations.
//! Operations are structs where the fields ARE the parameters - no duplication.
//!
//! ## Example
//!
//! ```ignore
//! use atelier_operations::*;
//!
//! #[operation(verb = "add", noun = "lane", description = "Append a lane to the board")]
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct AddLane {
//!     /// The lane display name
//!     pub name: String,
//! }
//!
//! #[async_trait]
//! impl Execute<BoardSession, BoardError> for AddLane {
//!     async fn execute(&self, ctx: &BoardSession) -> ExecutionResult<Value, BoardError> {
//!         // implementation returns ExecutionResult::Logged or Unlogged
//!     }
//! }
//! ```

// Lets `#[operation]` expansions inside this crate name it by path
extern crate self as atelier_operations;

mod execution_result;
mod log;
mod operation;
mod processor;

pub use execution_result::ExecutionResult;
pub use log::LogEntry;
pub use operation::{Execute, Operation};
pub use processor::OperationProcessor;

// Re-export for use in implementations
pub use async_trait::async_trait;
pub use atelier_operations_macros::operation;
pub use serde_json::Value;

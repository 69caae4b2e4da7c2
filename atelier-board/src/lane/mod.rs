//! Lane commands

mod add;
mod delete;
mod mv;

pub use add::AddLane;
pub use delete::DeleteLane;
pub use mv::MoveLane;

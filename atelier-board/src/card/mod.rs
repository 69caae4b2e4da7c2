//! Card commands

mod add;
mod delete;
mod mv;

pub use add::AddCard;
pub use delete::DeleteCard;
pub use mv::MoveCard;

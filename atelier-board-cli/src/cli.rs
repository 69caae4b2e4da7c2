//! CLI definition for the atelier-board command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Atelier board - reorder lanes and cards on a kanban board.
///
/// Boards live under `.atelier/boards/` in the project directory. Every
/// change is printed as JSON together with the persistence commands it
/// produced, and recorded in the board's activity log.
#[derive(Parser, Debug)]
#[command(name = "atelier-board")]
#[command(version)]
#[command(about = "Reorder lanes and cards on an Atelier kanban board")]
#[command(
    long_about = "Reorder lanes and cards on an Atelier kanban board.\n\n\
    Configuration is read from .atelier/config.yaml, atelier.toml and ATELIER_* \
    environment variables.\n\n\
    Environment variables:\n  \
    ATELIER_STORAGE_DIR        Override the storage directory\n  \
    ATELIER_DISPATCH_CAPACITY  Persistence queue capacity\n  \
    ATELIER_ACTOR              Default actor for the activity log\n  \
    RUST_LOG                   Log filter when --debug is not given"
)]
pub struct Cli {
    /// Project directory (defaults to the nearest directory containing .atelier)
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Board to operate on (defaults to the only board in the project)
    #[arg(long, global = true, value_name = "BOARD_ID")]
    pub board: Option<String>,

    /// Actor recorded in the activity log
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new board
    Init {
        /// Board display name
        #[arg(long)]
        name: String,
        /// Explicit board ID (a ULID is generated otherwise)
        #[arg(long)]
        id: Option<String>,
        /// Lane names in order; defaults to To Do, In Progress, Done
        #[arg(long = "lane", value_name = "NAME")]
        lanes: Vec<String>,
    },

    /// Print the board with card counts
    Show,

    /// Move the lane at FROM to position TO
    MoveLane {
        from: usize,
        to: usize,
    },

    /// Move a card within a lane or into another lane
    MoveCard {
        /// Lane the card is dragged from
        #[arg(long)]
        lane: String,
        /// Index of the card in its lane
        #[arg(long)]
        from: usize,
        /// Index to drop the card at
        #[arg(long)]
        to: usize,
        /// Lane to drop the card in (defaults to --lane)
        #[arg(long)]
        to_lane: Option<String>,
    },

    /// Append a lane
    AddLane {
        name: String,
        /// Explicit lane ID
        #[arg(long)]
        id: Option<String>,
    },

    /// Append a card to a lane
    AddCard {
        /// Lane to add the card to
        #[arg(long)]
        lane: String,
        /// Card name
        name: String,
        /// Extra card fields as a JSON object
        #[arg(long, value_name = "JSON")]
        data: Option<String>,
        /// Explicit card ID
        #[arg(long)]
        id: Option<String>,
    },

    /// Delete a lane and its cards
    DeleteLane {
        id: String,
    },

    /// Delete a card
    DeleteCard {
        id: String,
    },

    /// Show the activity log, newest first
    Activity {
        /// Maximum number of entries
        #[arg(long)]
        limit: Option<usize>,
    },
}

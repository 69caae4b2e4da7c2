//! atelier-board - reorder lanes and cards on an Atelier kanban board.
//!
//! Commands:
//! - `atelier-board init --name <NAME> [--lane <NAME>...]`: Create a board
//! - `atelier-board show`: Print the board with card counts
//! - `atelier-board move-lane <FROM> <TO>`: Reorder lanes
//! - `atelier-board move-card --lane <ID> --from <I> --to <I> [--to-lane <ID>]`: Move a card
//! - `atelier-board add-lane <NAME>` / `delete-lane <ID>`: Manage lanes
//! - `atelier-board add-card --lane <ID> <NAME>` / `delete-card <ID>`: Manage cards
//! - `atelier-board activity [--limit N]`: Show the activity log
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error, or a change that could not be persisted

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level
    let filter = if cli.debug {
        EnvFilter::new("atelier_board=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match commands::run(cli).await {
        Ok(output) => commands::report(&output, &mut std::io::stdout(), &mut std::io::stderr()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

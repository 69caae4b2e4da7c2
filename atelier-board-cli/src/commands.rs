//! Command handlers for the atelier-board CLI

use crate::cli::{Cli, Commands};
use anyhow::{bail, Context, Result};
use atelier_board::board::GetBoard;
use atelier_board::card::{AddCard, DeleteCard, MoveCard};
use atelier_board::lane::{AddLane, DeleteLane, MoveLane};
use atelier_board::{
    Board, BoardConfig, BoardError, BoardId, BoardOperationProcessor, BoardSession, BoardStore,
    FileStore, LogEntry, OperationProcessor, PersistenceFailure,
};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info};

/// Result of one CLI invocation
pub struct Output {
    /// JSON printed on stdout
    pub value: Value,
    /// Writes that failed after the change was applied in memory
    pub failures: Vec<PersistenceFailure>,
}

/// Print `output` and return the exit code.
///
/// Exits 1 when the result cannot be rendered or written, or when any write
/// failed to persist.
pub fn report(output: &Output, out: &mut impl Write, err: &mut impl Write) -> i32 {
    let mut code = 0;

    let printed = serde_json::to_string_pretty(&output.value)
        .map_err(anyhow::Error::from)
        .and_then(|json| writeln!(out, "{}", json).map_err(anyhow::Error::from));
    if let Err(e) = printed {
        let _ = writeln!(err, "Error: {:#}", e);
        code = 1;
    }

    for failure in &output.failures {
        let _ = writeln!(
            err,
            "Warning: failed to persist {} on board {}: {} ({} later commands skipped)",
            failure.command.kind(),
            failure.board_id,
            failure.message,
            failure.skipped
        );
        code = 1;
    }

    code
}

/// Run the parsed command line
pub async fn run(cli: Cli) -> Result<Output> {
    let Cli {
        dir,
        board,
        actor,
        command,
        ..
    } = cli;

    if let Commands::Init { name, id, lanes } = command {
        let root = match dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let value = init(&root, name, id, lanes, actor).await?;
        return Ok(Output {
            value,
            failures: Vec::new(),
        });
    }

    let (root, config) = project_root(dir)?;
    let store = FileStore::new(config.storage_root(&root));
    if !store.root().is_dir() {
        return Err(BoardError::NotInitialized { path: root }.into());
    }

    let board_id = resolve_board(&store, board).await?;
    debug!(board = %board_id, root = %root.display(), "resolved board");

    let session = BoardSession::open(Arc::new(store), board_id, &config).await?;
    let failures = session.subscribe_failures();
    let processor = BoardOperationProcessor::with_optional_actor(actor.or(config.actor));

    let result = execute(&processor, &session, command).await;

    // Wait for queued writes so failures are known before exiting
    session.close().await?;
    let failures = drain(failures);

    Ok(Output {
        value: result?,
        failures,
    })
}

async fn execute(
    processor: &BoardOperationProcessor,
    session: &BoardSession,
    command: Commands,
) -> Result<Value> {
    let value = match command {
        Commands::Show => processor.process(&GetBoard, session).await?,
        Commands::MoveLane { from, to } => {
            processor.process(&MoveLane::new(from, to), session).await?
        }
        Commands::MoveCard {
            lane,
            from,
            to,
            to_lane,
        } => {
            let op = match to_lane {
                Some(to_lane) => MoveCard::across(lane, from, to_lane, to),
                None => MoveCard::within(lane, from, to),
            };
            processor.process(&op, session).await?
        }
        Commands::AddLane { name, id } => {
            let mut op = AddLane::new(name);
            if let Some(id) = id {
                op = op.with_id(id);
            }
            processor.process(&op, session).await?
        }
        Commands::AddCard {
            lane,
            name,
            data,
            id,
        } => {
            let mut op = AddCard::new(lane, name);
            if let Some(data) = data {
                let data: Map<String, Value> =
                    serde_json::from_str(&data).context("--data must be a JSON object")?;
                op = op.with_data(data);
            }
            if let Some(id) = id {
                op = op.with_id(id);
            }
            processor.process(&op, session).await?
        }
        Commands::DeleteLane { id } => processor.process(&DeleteLane::new(id), session).await?,
        Commands::DeleteCard { id } => processor.process(&DeleteCard::new(id), session).await?,
        Commands::Activity { limit } => serde_json::to_value(session.activity(limit).await?)?,
        Commands::Init { .. } => bail!("init does not take an existing board"),
    };
    Ok(value)
}

async fn init(
    root: &Path,
    name: String,
    id: Option<String>,
    lanes: Vec<String>,
    actor: Option<String>,
) -> Result<Value> {
    let config = BoardConfig::load(root)?;
    let store = FileStore::new(config.storage_root(root));

    let mut board = Board::new(name);
    if let Some(id) = id {
        board = board.with_id(id);
    }
    board = if lanes.is_empty() {
        board.with_lanes(Board::default_lane_names())
    } else {
        board.with_lanes(lanes)
    };

    store.create_board(&board).await?;
    info!(board = %board.id, path = %store.board_path(&board.id).display(), "initialized board");

    let value = serde_json::to_value(&board)?;
    let entry = LogEntry::new(
        "init board",
        serde_json::json!({ "name": board.name }),
        value.clone(),
        actor.or(config.actor),
        0,
    );
    store.append_activity(&board.id, &entry).await?;

    Ok(value)
}

/// Explicit `--dir`, else the nearest ancestor whose configured storage exists
fn project_root(dir: Option<PathBuf>) -> Result<(PathBuf, BoardConfig)> {
    if let Some(dir) = dir {
        let config = BoardConfig::load(&dir)?;
        return Ok((dir, config));
    }

    let cwd = std::env::current_dir()?;
    match BoardConfig::discover(&cwd)? {
        Some(found) => Ok(found),
        None => {
            let config = BoardConfig::load(&cwd)?;
            Ok((cwd, config))
        }
    }
}

async fn resolve_board(store: &FileStore, requested: Option<String>) -> Result<BoardId> {
    if let Some(id) = requested {
        return Ok(BoardId::from(id));
    }

    let mut ids = store.list_board_ids().await?;
    match ids.len() {
        0 => bail!("no boards found; create one with `atelier-board init --name <NAME>`"),
        1 => Ok(ids.remove(0)),
        _ => {
            let ids: Vec<&str> = ids.iter().map(BoardId::as_str).collect();
            bail!("multiple boards found ({}); pass --board", ids.join(", "))
        }
    }
}

fn drain(mut failures: broadcast::Receiver<PersistenceFailure>) -> Vec<PersistenceFailure> {
    let mut reported = Vec::new();
    loop {
        match failures.try_recv() {
            Ok(failure) => reported.push(failure),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    reported
}

//! Sessions and operations against the file-backed store

use atelier_board::card::{AddCard, DeleteCard, MoveCard};
use atelier_board::lane::{AddLane, DeleteLane, MoveLane};
use atelier_board::{
    Board, BoardConfig, BoardOperationProcessor, BoardSession, BoardStore, FileStore,
    OperationProcessor,
};
use std::sync::Arc;
use tempfile::TempDir;

async fn setup() -> (TempDir, Arc<FileStore>, BoardSession) {
    let temp = TempDir::new().unwrap();
    let config = BoardConfig::load(temp.path()).unwrap();
    let store = Arc::new(FileStore::new(config.storage_root(temp.path())));

    let board = Board::new("Agency")
        .with_id("agency")
        .with_lanes(["Inbox", "Doing", "Shipped"]);
    store.create_board(&board).await.unwrap();

    let session = BoardSession::open(store.clone(), board.id.clone(), &config)
        .await
        .unwrap();
    (temp, store, session)
}

#[test_log::test(tokio::test)]
async fn test_workflow_persists_to_disk() {
    let (_temp, store, session) = setup().await;
    let processor = BoardOperationProcessor::with_actor("dana");

    let inbox = session.snapshot().await.lanes[0].id.clone();
    let shipped = session.snapshot().await.lanes[2].id.clone();

    for name in ["Logo refresh", "Landing page", "Brand guide"] {
        processor
            .process(&AddCard::new(inbox.clone(), name), &session)
            .await
            .unwrap();
    }
    processor
        .process(&MoveCard::within(inbox.clone(), 2, 0), &session)
        .await
        .unwrap();
    processor
        .process(&MoveCard::across(inbox.clone(), 1, shipped.clone(), 0), &session)
        .await
        .unwrap();
    processor.process(&MoveLane::new(2, 0), &session).await.unwrap();

    let expected = session.snapshot().await;
    session.close().await.unwrap();

    let stored = store.load_board(&"agency".into()).await.unwrap();
    assert_eq!(stored, expected);
    assert!(stored.check_invariants().is_ok());

    assert_eq!(stored.lanes[0].id, shipped);
    let names: Vec<_> = stored.lanes[1]
        .cards
        .iter()
        .map(|c| c.name().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Brand guide", "Landing page"]);
    assert_eq!(stored.lanes[0].cards[0].name(), Some("Logo refresh"));

    let activity = store.read_activity(&"agency".into(), None).await.unwrap();
    assert_eq!(activity.len(), 6);
    assert_eq!(activity[0].op, "move lane");
    assert!(activity.iter().all(|e| e.actor.as_deref() == Some("dana")));
}

#[tokio::test]
async fn test_reopen_sees_deletes() {
    let (temp, store, session) = setup().await;
    let processor = BoardOperationProcessor::new();

    processor
        .process(&AddLane::new("Archive").with_id("archive"), &session)
        .await
        .unwrap();
    let card = processor
        .process(&AddCard::new("archive", "Old pitch").with_id("pitch"), &session)
        .await
        .unwrap();
    assert_eq!(card["id"], "pitch");

    processor.process(&DeleteCard::new("pitch"), &session).await.unwrap();
    let doing = session.snapshot().await.lanes[1].id.clone();
    processor.process(&DeleteLane::new(doing), &session).await.unwrap();
    session.close().await.unwrap();

    let config = BoardConfig::load(temp.path()).unwrap();
    let reopened = BoardSession::open(store, "agency".into(), &config)
        .await
        .unwrap();
    let board = reopened.snapshot().await;

    let names: Vec<&str> = board.lanes.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Inbox", "Shipped", "Archive"]);
    assert_eq!(board.card_count(), 0);
    assert!(board.check_invariants().is_ok());
}

#[tokio::test]
async fn test_invalid_move_is_logged_as_failure() {
    let (_temp, store, session) = setup().await;
    let processor = BoardOperationProcessor::new();

    let result = processor.process(&MoveLane::new(0, 3), &session).await;
    assert!(result.is_err());
    session.close().await.unwrap();

    let activity = store.read_activity(&"agency".into(), None).await.unwrap();
    assert_eq!(activity.len(), 1);
    assert!(activity[0].is_failure());
    assert_eq!(store.load_board(&"agency".into()).await.unwrap().lanes[0].name, "Inbox");
}

mod common;

use common::*;
use loan_replay::datasource::sqlite::init_schema;
use loan_replay::{
    FileEventSource, LoanId, MockEventSource, RawEvent, SqliteEventSource, SyncError,
    Synchronizer,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tempfile::TempDir;

const CONTRACT: &str = "0x03dcf5c72ba60eb7b2fe151032769d49dd3df6b04fa3141dffd6e2aa162b7a6e";

fn opening_events() -> Vec<RawEvent> {
    let loan = Loan::new(1, ALICE).debt(TOKEN_A, 100).current(TOKEN_B, 20);
    vec![
        new_loan(100, "0x100", &loan, TOKEN_B, 50),
        collateral_added(101, "0x101", 1, TOKEN_B, 60),
    ]
}

#[tokio::test]
async fn test_sync_replays_and_advances_watermark() {
    let source = MockEventSource::new().with_events(CONTRACT, opening_events());
    let synchronizer = Synchronizer::new(Arc::new(source), CONTRACT.to_string(), 0);
    let mut engine = engine();

    let summary = synchronizer.sync(&mut engine).await.unwrap();
    assert_eq!(summary.events_applied, 2);
    assert_eq!(summary.loans, 1);
    assert_eq!(summary.last_block, Some(101));
    assert_eq!(engine.watermark().next_block(0), 102);

    // Nothing new past the watermark.
    let summary = synchronizer.sync(&mut engine).await.unwrap();
    assert_eq!(summary.events_applied, 0);
    assert_eq!(summary.last_block, Some(101));
    assert_eq!(engine.watermark().events_applied, 2);
}

#[tokio::test]
async fn test_sync_respects_start_block() {
    let loan = Loan::new(2, BOB).debt(TOKEN_A, 5);
    let mut events = opening_events();
    events.push(new_loan(200, "0x200", &loan, TOKEN_B, 7));
    let source = MockEventSource::new().with_events(CONTRACT, events);
    let synchronizer = Synchronizer::new(Arc::new(source), CONTRACT.to_string(), 150);
    let mut engine = engine();

    synchronizer.sync(&mut engine).await.unwrap();
    assert!(engine.store().get(LoanId::new(1)).is_none());
    assert!(engine.store().get(LoanId::new(2)).is_some());
}

#[tokio::test]
async fn test_sync_failure_keeps_watermark() {
    let events = vec![collateral_added(10, "0x10", 77, TOKEN_B, 1)];
    let source = MockEventSource::new().with_events(CONTRACT, events);
    let synchronizer = Synchronizer::new(Arc::new(source), CONTRACT.to_string(), 0);
    let mut engine = engine();

    let result = synchronizer.sync(&mut engine).await;
    assert!(matches!(result, Err(SyncError::Replay(_))));
    assert!(engine.watermark().is_first_replay());
    assert!(engine.store().is_empty());
}

#[tokio::test]
async fn test_sync_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("events.json");
    std::fs::write(&path, serde_json::to_vec(&opening_events()).unwrap()).unwrap();

    let synchronizer = Synchronizer::new(
        Arc::new(FileEventSource::new(&path)),
        CONTRACT.to_string(),
        0,
    );
    let mut engine = engine();
    let summary = synchronizer.sync(&mut engine).await.unwrap();
    assert_eq!(summary.events_applied, 2);
    assert_eq!(
        engine
            .store()
            .get(LoanId::new(1))
            .unwrap()
            .collateral()
            .get(&tok("B")),
        d(80)
    );
}

#[tokio::test]
async fn test_sync_from_sqlite_matches_mock() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("indexer.db");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", db_path.display()))
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();

    // Stored without the leading zero the contract address is usually given with.
    let stored_contract = CONTRACT.replacen("0x0", "0x", 1);
    for event in opening_events() {
        sqlx::query(
            "INSERT INTO events (block_number, transaction_hash, from_address, key_name, data) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(event.block_number as i64)
        .bind(&event.transaction_hash)
        .bind(&stored_contract)
        .bind(&event.key_name)
        .bind(serde_json::to_string(&event.data).unwrap())
        .execute(&pool)
        .await
        .unwrap();
    }

    let from_sqlite = Synchronizer::new(
        Arc::new(SqliteEventSource::from_pool(pool)),
        CONTRACT.to_string(),
        0,
    );
    let mut sqlite_engine = engine();
    from_sqlite.sync(&mut sqlite_engine).await.unwrap();

    let from_mock = Synchronizer::new(
        Arc::new(MockEventSource::new().with_events(CONTRACT, opening_events())),
        CONTRACT.to_string(),
        0,
    );
    let mut mock_engine = engine();
    from_mock.sync(&mut mock_engine).await.unwrap();

    assert_eq!(sqlite_engine.store().len(), 1);
    assert_eq!(
        sqlite_engine.store().fingerprint(),
        mock_engine.store().fingerprint()
    );
}

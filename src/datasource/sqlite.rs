//! Event source reading an indexer's SQLite `events` table.

use super::{parse_contract, DataSourceError, EventSource};
use crate::domain::{Address, RawEvent};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;

/// Table layout written by the indexer. `data` holds a JSON array of
/// hex-encoded field strings.
pub const EVENTS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    block_number INTEGER NOT NULL,
    transaction_hash TEXT NOT NULL,
    from_address TEXT NOT NULL,
    key_name TEXT NOT NULL,
    data TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_events_block ON events(block_number);
"#;

/// Reads events from an indexer database.
#[derive(Debug, Clone)]
pub struct SqliteEventSource {
    pool: SqlitePool,
}

impl SqliteEventSource {
    /// Open an existing indexer database read-only.
    pub async fn connect(db_path: &str) -> Result<Self, DataSourceError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect(&format!("sqlite:{}?mode=ro", db_path))
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Create the `events` table if it does not exist.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in EVENTS_SCHEMA.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

fn parse_row(row: &SqliteRow) -> Result<(String, RawEvent), DataSourceError> {
    let id: i64 = row.try_get("id")?;
    let block_number: i64 = row.try_get("block_number")?;
    let block_number = u64::try_from(block_number).map_err(|_| {
        DataSourceError::ParseError(format!("event {}: negative block number {}", id, block_number))
    })?;
    let data: String = row.try_get("data")?;
    let data: Vec<String> = serde_json::from_str(&data)
        .map_err(|e| DataSourceError::ParseError(format!("event {}: data: {}", id, e)))?;

    Ok((
        row.try_get("from_address")?,
        RawEvent::new(
            block_number,
            row.try_get::<String, _>("transaction_hash")?,
            row.try_get::<String, _>("key_name")?,
            data,
        ),
    ))
}

#[async_trait]
impl EventSource for SqliteEventSource {
    async fn fetch_events(
        &self,
        contract_address: &str,
        event_names: &[&str],
        start_block: u64,
    ) -> Result<Vec<RawEvent>, DataSourceError> {
        if event_names.is_empty() {
            return Ok(Vec::new());
        }
        let contract = parse_contract(contract_address)?;
        let start_block = i64::try_from(start_block).map_err(|_| {
            DataSourceError::ParseError(format!("start block {} out of range", start_block))
        })?;

        let placeholders = vec!["?"; event_names.len()].join(", ");
        let sql = format!(
            r#"
            SELECT id, block_number, transaction_hash, from_address, key_name, data
            FROM events
            WHERE block_number >= ? AND key_name IN ({})
            ORDER BY block_number ASC, id ASC
            "#,
            placeholders
        );

        let mut query = sqlx::query(&sql).bind(start_block);
        for name in event_names {
            query = query.bind(*name);
        }
        let rows = query.fetch_all(&self.pool).await?;

        // Addresses are stored as emitted, with or without leading zeros.
        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            let (from_address, event) = parse_row(row)?;
            let from = Address::parse(&from_address).map_err(|e| {
                DataSourceError::ParseError(format!("from_address {}: {}", from_address, e))
            })?;
            if from == contract {
                events.push(event);
            }
        }

        debug!(start_block, rows = rows.len(), events = events.len(), "read events from sqlite");
        Ok(events)
    }
}

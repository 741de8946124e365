//! Event sources for fetching raw protocol events.

use crate::domain::{Address, RawEvent};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

pub mod file;
pub mod indexer;
pub mod mock;
pub mod sqlite;

pub use file::FileEventSource;
pub use indexer::IndexerEventSource;
pub use mock::MockEventSource;
pub use sqlite::SqliteEventSource;

/// Source of raw contract events.
///
/// Implementations may return events in any order; the replay engine
/// re-sorts every batch. A record that cannot be turned into a [`RawEvent`]
/// must be reported as an error, never skipped.
#[async_trait]
pub trait EventSource: Send + Sync + fmt::Debug {
    /// Fetch events emitted by `contract_address` whose type is one of
    /// `event_names`, from `start_block` (inclusive) onwards.
    async fn fetch_events(
        &self,
        contract_address: &str,
        event_names: &[&str],
        start_block: u64,
    ) -> Result<Vec<RawEvent>, DataSourceError>;
}

/// Event record as serialized by the indexer: a [`RawEvent`] plus the
/// emitting contract, which single-contract dumps may omit.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EventRecord {
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(flatten)]
    pub event: RawEvent,
}

impl EventRecord {
    /// Whether this record passes the `fetch_events` filters.
    ///
    /// # Errors
    /// Returns `ParseError` if `from_address` is not a valid address.
    pub(crate) fn matches(
        &self,
        contract: &Address,
        event_names: &[&str],
        start_block: u64,
    ) -> Result<bool, DataSourceError> {
        let from_contract = match &self.from_address {
            Some(from) => {
                Address::parse(from)
                    .map_err(|e| DataSourceError::ParseError(format!("from_address: {}", e)))?
                    == *contract
            }
            None => true,
        };
        Ok(from_contract
            && self.event.block_number >= start_block
            && event_names.contains(&self.event.key_name.as_str()))
    }
}

/// Keep the events of `records` that pass the `fetch_events` filters.
pub(crate) fn filter_records(
    records: Vec<EventRecord>,
    contract: &Address,
    event_names: &[&str],
    start_block: u64,
) -> Result<Vec<RawEvent>, DataSourceError> {
    let mut events = Vec::with_capacity(records.len());
    for record in records {
        if record.matches(contract, event_names, start_block)? {
            events.push(record.event);
        }
    }
    Ok(events)
}

pub(crate) fn parse_contract(contract_address: &str) -> Result<Address, DataSourceError> {
    Address::parse(contract_address)
        .map_err(|e| DataSourceError::ParseError(format!("contract address: {}", e)))
}

/// Error type for event source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed record)
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// Database query failed
    Database(String),
    /// Reading a local file failed
    Io(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Database(msg) => write!(f, "Database error: {}", msg),
            DataSourceError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}

impl From<sqlx::Error> for DataSourceError {
    fn from(err: sqlx::Error) -> Self {
        DataSourceError::Database(err.to_string())
    }
}

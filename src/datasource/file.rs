//! Event source backed by a JSON dump on disk.

use super::{filter_records, parse_contract, DataSourceError, EventRecord, EventSource};
use crate::domain::RawEvent;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Reads a JSON array of event records.
///
/// Records without `from_address` are treated as emitted by whichever
/// contract is requested.
#[derive(Debug, Clone)]
pub struct FileEventSource {
    path: PathBuf,
}

impl FileEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EventSource for FileEventSource {
    async fn fetch_events(
        &self,
        contract_address: &str,
        event_names: &[&str],
        start_block: u64,
    ) -> Result<Vec<RawEvent>, DataSourceError> {
        let contract = parse_contract(contract_address)?;
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| DataSourceError::Io(format!("{}: {}", self.path.display(), e)))?;
        let records: Vec<EventRecord> = serde_json::from_slice(&bytes)
            .map_err(|e| DataSourceError::ParseError(format!("{}: {}", self.path.display(), e)))?;

        let events = filter_records(records, &contract, event_names, start_block)?;
        debug!(
            path = %self.path.display(),
            start_block,
            events = events.len(),
            "read events from file"
        );
        Ok(events)
    }
}

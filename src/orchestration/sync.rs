use crate::datasource::{DataSourceError, EventSource};
use crate::engine::LoanProtocol;
use crate::error::ReplayError;
use crate::replay::{ReplayEngine, ReplaySummary};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Pulls new events for one contract and replays them.
#[derive(Clone)]
pub struct Synchronizer {
    source: Arc<dyn EventSource>,
    contract_address: String,
    start_block: u64,
}

impl Synchronizer {
    pub fn new(source: Arc<dyn EventSource>, contract_address: String, start_block: u64) -> Self {
        Self {
            source,
            contract_address,
            start_block,
        }
    }

    /// Fetch everything after the engine's watermark and replay it.
    ///
    /// An empty fetch is a no-op. On failure the engine's store and
    /// watermark are unchanged, so the same range is fetched again next time.
    pub async fn sync<P: LoanProtocol>(
        &self,
        engine: &mut ReplayEngine<P>,
    ) -> Result<ReplaySummary, SyncError> {
        let from_block = engine.watermark().next_block(self.start_block);
        let event_names = engine.protocol().event_names();

        let events = self
            .source
            .fetch_events(&self.contract_address, &event_names, from_block)
            .await?;
        debug!(from_block, fetched = events.len(), "fetched events");

        if events.is_empty() {
            info!(from_block, "no new events");
            return Ok(ReplaySummary {
                events_applied: 0,
                loans: engine.store().len(),
                last_block: engine.watermark().last_block,
            });
        }

        Ok(engine.replay(&events)?)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
}

//! Mock event source for testing without a database or network.

use super::{DataSourceError, EventSource};
use crate::domain::{Address, RawEvent};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory event source returning predefined events.
#[derive(Debug, Clone, Default)]
pub struct MockEventSource {
    events: Vec<(String, RawEvent)>,
    fetch_count: Arc<AtomicUsize>,
}

impl MockEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event emitted by `contract_address`.
    pub fn with_event(mut self, contract_address: &str, event: RawEvent) -> Self {
        self.events.push((normalize(contract_address), event));
        self
    }

    pub fn with_events(mut self, contract_address: &str, events: Vec<RawEvent>) -> Self {
        let address = normalize(contract_address);
        self.events
            .extend(events.into_iter().map(|event| (address.clone(), event)));
        self
    }

    /// Number of `fetch_events` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

fn normalize(address: &str) -> String {
    Address::parse(address)
        .map(|a| a.to_string())
        .unwrap_or_else(|_| address.to_lowercase())
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn fetch_events(
        &self,
        contract_address: &str,
        event_names: &[&str],
        start_block: u64,
    ) -> Result<Vec<RawEvent>, DataSourceError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let address = normalize(contract_address);

        Ok(self
            .events
            .iter()
            .filter(|(from, event)| {
                *from == address
                    && event.block_number >= start_block
                    && event_names.contains(&event.key_name.as_str())
            })
            .map(|(_, event)| event.clone())
            .collect())
    }
}

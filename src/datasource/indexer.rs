//! HTTP indexer client.

use super::{filter_records, parse_contract, DataSourceError, EventRecord, EventSource};
use crate::domain::RawEvent;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Event source backed by an indexer's `GET /events` endpoint.
///
/// The endpoint takes `contract_address`, `event_names` (comma-separated) and
/// `start_block` query parameters and returns a JSON array of event records.
#[derive(Debug, Clone)]
pub struct IndexerEventSource {
    client: Client,
    base_url: String,
    max_elapsed: Duration,
}

impl IndexerEventSource {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_elapsed: Duration::from_secs(30),
        }
    }

    /// Cap on total time spent retrying one request.
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = max_elapsed;
        self
    }

    async fn get_events(
        &self,
        query: &[(&str, String)],
    ) -> Result<Vec<EventRecord>, DataSourceError> {
        let url = format!("{}/events", self.base_url);
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(&url)
                .query(query)
                .send()
                .await
                .map_err(|e| {
                    warn!(error = %e, "indexer request failed, retrying");
                    backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 {
                warn!("indexer rate limited, retrying");
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                warn!(status = status.as_u16(), "indexer server error, retrying");
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<Vec<EventRecord>>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl EventSource for IndexerEventSource {
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
        debug!(
            contract = %contract,
            start_block,
            "fetching events from indexer"
        );

        let query = [
            ("contract_address", contract.to_string()),
            ("event_names", event_names.join(",")),
            ("start_block", start_block.to_string()),
        ];
        let records = self.get_events(&query).await?;

        // Server-side filtering is not trusted.
        filter_records(records, &contract, event_names, start_block)
    }
}

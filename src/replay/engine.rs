//! Replay engine: decode, order, apply, commit.

use super::ReplayWatermark;
use crate::domain::{sort_events_deterministic, Envelope, EventMeta, RawEvent, TokenRegistry};
use crate::engine::{LoanProtocol, LoanStateStore};
use crate::error::ReplayError;
use tracing::{debug, info};

/// Outcome of one replayed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events_applied: usize,
    pub loans: usize,
    pub last_block: Option<u64>,
}

/// Owns the loan state store and applies batches of raw events to it.
///
/// A batch either applies completely or not at all: events are applied to a
/// working copy that replaces the store only after the last one succeeds.
pub struct ReplayEngine<P: LoanProtocol> {
    protocol: P,
    tokens: TokenRegistry,
    store: LoanStateStore,
    watermark: ReplayWatermark,
}

impl<P: LoanProtocol> ReplayEngine<P> {
    pub fn new(protocol: P, tokens: TokenRegistry) -> Self {
        let store = LoanStateStore::new(tokens.symbols());
        Self {
            protocol,
            tokens,
            store,
            watermark: ReplayWatermark::new(),
        }
    }

    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    /// Read-only view of the current snapshot.
    pub fn store(&self) -> &LoanStateStore {
        &self.store
    }

    pub fn into_store(self) -> LoanStateStore {
        self.store
    }

    pub fn watermark(&self) -> ReplayWatermark {
        self.watermark
    }

    /// Decode and order a batch without applying it.
    pub fn prepare(&self, events: &[RawEvent]) -> Result<Vec<Envelope<P::Event>>, ReplayError> {
        let mut batch = events
            .iter()
            .map(|raw| {
                let event = self.protocol.decode(raw, &self.tokens)?;
                let meta = EventMeta {
                    block_number: raw.block_number,
                    transaction_hash: raw.transaction_hash.clone(),
                    type_priority: self.protocol.type_priority(&event),
                    content_key: raw.content_key(),
                };
                Ok(Envelope { meta, event })
            })
            .collect::<Result<Vec<_>, ReplayError>>()?;
        sort_events_deterministic(&mut batch);
        Ok(batch)
    }

    /// Apply a batch in deterministic order. The input order is ignored.
    ///
    /// # Errors
    /// Any decode failure, unknown token or invariant violation aborts the
    /// batch and leaves the store untouched.
    pub fn replay(&mut self, events: &[RawEvent]) -> Result<ReplaySummary, ReplayError> {
        let batch = self.prepare(events)?;
        debug!(events = batch.len(), "decoded and ordered batch");

        let mut working = self.store.clone();
        for envelope in &batch {
            self.protocol
                .apply(&mut working, &envelope.meta, &envelope.event)?;
        }
        self.store = working;

        let last_block = batch.last().map(|e| e.meta.block_number);
        if let Some(block) = last_block {
            self.watermark.advance(block, batch.len() as u64);
        }

        info!(
            events = batch.len(),
            loans = self.store.len(),
            last_block = ?last_block,
            "replayed batch"
        );

        Ok(ReplaySummary {
            events_applied: batch.len(),
            loans: self.store.len(),
            last_block,
        })
    }
}

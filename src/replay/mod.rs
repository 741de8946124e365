//! Batch replay of raw events into the loan state store.
//!
//! This module provides:
//! - Block-watermark tracking for incremental replay
//! - The all-or-nothing replay engine (decode, order, apply, commit)

use serde::{Deserialize, Serialize};

pub mod engine;

pub use engine::{ReplayEngine, ReplaySummary};

/// How far replay has progressed.
///
/// Events are fetched per block range, so the next fetch resumes at the
/// block after the last one applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayWatermark {
    /// Highest block number applied so far.
    pub last_block: Option<u64>,
    /// Total events applied across all batches.
    pub events_applied: u64,
}

impl ReplayWatermark {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_first_replay(&self) -> bool {
        self.last_block.is_none()
    }

    /// First block to request, never earlier than `start_block`.
    pub fn next_block(&self, start_block: u64) -> u64 {
        match self.last_block {
            Some(last) => start_block.max(last.saturating_add(1)),
            None => start_block,
        }
    }

    pub fn advance(&mut self, last_block: u64, events: u64) {
        self.last_block = Some(self.last_block.map_or(last_block, |b| b.max(last_block)));
        self.events_applied += events;
    }
}

//! Pure state-transition engine for loan replay.

use crate::domain::{EventMeta, RawEvent, TokenRegistry};
use crate::error::ReplayError;
use std::fmt;

pub mod hashstack;
pub mod loan;
pub mod store;

pub use hashstack::HashstackProtocol;
pub use loan::LoanEntity;
pub use store::LoanStateStore;

/// Protocol-specific decoding and state transitions.
///
/// The replay engine is generic over this trait; it owns ordering and the
/// all-or-nothing commit, the protocol owns what each event means.
pub trait LoanProtocol {
    type Event: fmt::Debug;

    /// Event type names to request from the event source.
    fn event_names(&self) -> Vec<&'static str>;

    fn decode(&self, raw: &RawEvent, tokens: &TokenRegistry) -> Result<Self::Event, ReplayError>;

    /// Rank used to order events sharing a block and transaction.
    fn type_priority(&self, event: &Self::Event) -> u8;

    fn apply(
        &self,
        store: &mut LoanStateStore,
        meta: &EventMeta,
        event: &Self::Event,
    ) -> Result<(), ReplayError>;
}

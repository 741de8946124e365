//! Deterministic total order over a batch of events.

use crate::domain::{Envelope, EventMeta};

/// Stable ordering key for events.
///
/// Ordering: block_number -> transaction_hash -> type_priority -> content_key.
/// The content key only separates events that agree on the first three
/// components, so the result never depends on arrival order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventOrderingKey<'a> {
    pub block_number: u64,
    pub transaction_hash: &'a str,
    pub type_priority: u8,
    pub content_key: &'a str,
}

impl<'a> EventOrderingKey<'a> {
    pub fn from_meta(meta: &'a EventMeta) -> Self {
        EventOrderingKey {
            block_number: meta.block_number,
            transaction_hash: &meta.transaction_hash,
            type_priority: meta.type_priority,
            content_key: &meta.content_key,
        }
    }

    /// Returns true if `a` must be applied before `b`.
    pub fn should_come_before(a: &EventMeta, b: &EventMeta) -> bool {
        EventOrderingKey::from_meta(a) < EventOrderingKey::from_meta(b)
    }
}

/// Sort events deterministically.
pub fn sort_events_deterministic<E>(events: &mut [Envelope<E>]) {
    events.sort_by(|a, b| {
        EventOrderingKey::from_meta(&a.meta).cmp(&EventOrderingKey::from_meta(&b.meta))
    });
}

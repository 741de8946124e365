//! Raw protocol events as delivered by an event source, and their metadata.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// One event exactly as the indexer stores it: metadata plus a positional
/// array of hex-encoded fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub block_number: u64,
    pub transaction_hash: String,
    pub key_name: String,
    pub data: Vec<String>,
}

impl RawEvent {
    pub fn new(
        block_number: u64,
        transaction_hash: impl Into<String>,
        key_name: impl Into<String>,
        data: Vec<String>,
    ) -> Self {
        Self {
            block_number,
            transaction_hash: transaction_hash.into(),
            key_name: key_name.into(),
            data,
        }
    }

    /// Stable content hash over the type tag and every field.
    pub fn content_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.key_name.as_bytes());
        for field in &self.data {
            hasher.update([0u8]);
            hasher.update(field.as_bytes());
        }
        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }
}

/// The loan-altering event types emitted by the lending contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    NewLoan,
    LoanSwap,
    Liquidated,
    LoanWithdrawal,
    LoanRepaid,
    LoanInterestDeducted,
    CollateralAdded,
    CollateralWithdrawal,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::NewLoan,
        EventKind::LoanSwap,
        EventKind::Liquidated,
        EventKind::LoanWithdrawal,
        EventKind::LoanRepaid,
        EventKind::LoanInterestDeducted,
        EventKind::CollateralAdded,
        EventKind::CollateralWithdrawal,
    ];

    pub fn from_key_name(key_name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == key_name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NewLoan => "new_loan",
            EventKind::LoanSwap => "loan_swap",
            EventKind::Liquidated => "liquidated",
            EventKind::LoanWithdrawal => "loan_withdrawal",
            EventKind::LoanRepaid => "loan_repaid",
            EventKind::LoanInterestDeducted => "loan_interest_deducted",
            EventKind::CollateralAdded => "collateral_added",
            EventKind::CollateralWithdrawal => "collateral_withdrawal",
        }
    }

    /// Rank within a single transaction. Collateral and debt rewrites must land
    /// before the adjustments that read them.
    pub fn priority(&self) -> u8 {
        match self {
            EventKind::NewLoan => 0,
            EventKind::LoanSwap => 1,
            EventKind::Liquidated => 2,
            EventKind::LoanWithdrawal => 3,
            EventKind::LoanRepaid => 4,
            EventKind::LoanInterestDeducted => 5,
            EventKind::CollateralAdded => 6,
            EventKind::CollateralWithdrawal => 7,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the orderer needs about an event, detached from its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMeta {
    pub block_number: u64,
    pub transaction_hash: String,
    pub type_priority: u8,
    pub content_key: String,
}

/// A decoded event together with its ordering metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<E> {
    pub meta: EventMeta,
    pub event: E,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_key_name(kind.as_str()), Some(kind));
        }
        assert_eq!(EventKind::from_key_name("transfer"), None);
    }

    #[test]
    fn test_priorities_are_distinct_and_fixed() {
        let ranks: Vec<u8> = EventKind::ALL.iter().map(|k| k.priority()).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(EventKind::CollateralAdded.priority(), 6);
        assert_eq!(EventKind::LoanRepaid.priority(), 4);
    }

    #[test]
    fn test_content_key_depends_on_fields() {
        let a = RawEvent::new(1, "0xabc", "new_loan", vec!["0x1".into(), "0x2".into()]);
        let b = RawEvent::new(1, "0xabc", "new_loan", vec!["0x1".into(), "0x3".into()]);
        let c = RawEvent::new(9, "0xdef", "new_loan", vec!["0x1".into(), "0x2".into()]);
        assert_ne!(a.content_key(), b.content_key());
        assert_eq!(a.content_key(), c.content_key());
        assert!(a.content_key().starts_with("hash:"));
    }

    #[test]
    fn test_content_key_field_boundaries() {
        let a = RawEvent::new(1, "0xabc", "k", vec!["0x12".into(), "0x3".into()]);
        let b = RawEvent::new(1, "0xabc", "k", vec!["0x1".into(), "20x3".into()]);
        assert_ne!(a.content_key(), b.content_key());
    }

    #[test]
    fn test_raw_event_json() {
        let json = r#"{"block_number":5,"transaction_hash":"0x1","key_name":"liquidated","data":["0x7"]}"#;
        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.block_number, 5);
        assert_eq!(event.data, vec!["0x7".to_string()]);
    }
}

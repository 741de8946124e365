//! Domain types and determinism layer for the loan replay.
//!
//! This module provides:
//! - Exact numeric handling via the Decimal wrapper
//! - Domain primitives: Address, Token, LoanId
//! - Token lookup tables and face-value balances
//! - Raw events and the deterministic event ordering

pub mod decimal;
pub mod event;
pub mod ordering;
pub mod primitives;
pub mod token_amounts;
pub mod tokens;

pub use decimal::Decimal;
pub use event::{Envelope, EventKind, EventMeta, RawEvent};
pub use ordering::{sort_events_deterministic, EventOrderingKey};
pub use primitives::{Address, AddressParseError, LoanId, Token};
pub use token_amounts::TokenAmounts;
pub use tokens::{DecimalFactors, TokenRegistry};

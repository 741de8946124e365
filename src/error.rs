use crate::domain::{Decimal, LoanId, Token};
use thiserror::Error;

/// Malformed or unexpected positional payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{event}: no field at index {index}")]
    MissingField { event: &'static str, index: usize },
    #[error("{event}: field {index} is not hex: {value:?}")]
    InvalidHex {
        event: &'static str,
        index: usize,
        value: String,
    },
    #[error("{event}: field {index} does not fit the target type: {value}")]
    Overflow {
        event: &'static str,
        index: usize,
        value: String,
    },
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
}

/// Failure while decoding or applying a batch. Any of these aborts the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("unknown token address: {address}")]
    UnknownToken { address: String },
    #[error("invariant violated for loan {loan_id} in {event}: {reason}")]
    InvariantViolation {
        loan_id: LoanId,
        event: &'static str,
        reason: String,
    },
}

impl ReplayError {
    pub fn invariant(loan_id: LoanId, event: &'static str, reason: impl Into<String>) -> Self {
        ReplayError::InvariantViolation {
            loan_id,
            event,
            reason: reason.into(),
        }
    }
}

/// Failure of a single risk query. Never touches stored state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    #[error("no price for token {token}")]
    PriceMissing { token: Token },
    #[error("no decimal-scale factor for token {token}")]
    DecimalsMissing { token: Token },
    #[error("decimal-scale factor for token {token} must be positive, got {factor}")]
    InvalidDecimalFactor { token: Token, factor: Decimal },
    #[error("USD value of token {token} exceeds the decimal range")]
    Overflow { token: Token },
}

//! Field layouts of the Hashstack lending contract's events.
//!
//! Most events embed a 14-field `loan_record`
//! (`id, owner, market, commitment, amount, _, current_market, current_amount,
//! _, is_loan_withdrawn, debt_category, state, l3_integration, created_at`)
//! or a 9-field `collateral_record`
//! (`market, amount, _, current_amount, _, commitment, timelock_validity,
//! is_timelock_activated, activation_time`), followed by event-specific
//! trailing fields.

use super::FieldReader;
use crate::domain::{Address, Decimal, EventKind, LoanId, RawEvent, Token, TokenRegistry};
use crate::error::{DecodeError, ReplayError};

mod loan_record {
    pub const LEN: usize = 14;
    pub const ID: usize = 0;
    pub const OWNER: usize = 1;
    pub const MARKET: usize = 2;
    pub const AMOUNT: usize = 4;
    pub const CURRENT_MARKET: usize = 6;
    pub const CURRENT_AMOUNT: usize = 7;
    pub const DEBT_CATEGORY: usize = 10;
}

mod collateral_record {
    pub const MARKET: usize = 0;
    pub const CURRENT_AMOUNT: usize = 3;
}

/// `loan_id` position in `collateral_added` / `collateral_withdrawal`.
const COLLATERAL_EVENT_LOAN_ID: usize = 9;
/// `loan_id` position in `loan_interest_deducted` (after `accrued_interest`).
const INTEREST_EVENT_LOAN_ID: usize = 11;

/// `(market, current_amount)` of the collateral record inside `new_loan`.
/// Some early loans were emitted with a loan record one field shorter.
const NEW_LOAN_COLLATERAL_LAYOUTS: [(usize, usize); 2] = [(14, 17), (13, 16)];

/// Post-state of a loan as carried by a `loan_record`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRecord {
    pub loan_id: LoanId,
    pub user: Address,
    pub debt_token: Token,
    pub debt_amount: Decimal,
    pub borrowed_collateral_token: Token,
    pub borrowed_collateral_amount: Decimal,
    pub debt_category: u32,
}

impl LoanRecord {
    fn decode(
        reader: &FieldReader<'_>,
        base: usize,
        registry: &TokenRegistry,
    ) -> Result<Self, ReplayError> {
        Ok(LoanRecord {
            loan_id: reader.loan_id(base + loan_record::ID)?,
            user: reader.address(base + loan_record::OWNER)?,
            debt_token: reader.token(base + loan_record::MARKET, registry)?,
            debt_amount: reader.amount(base + loan_record::AMOUNT)?,
            borrowed_collateral_token: reader.token(base + loan_record::CURRENT_MARKET, registry)?,
            borrowed_collateral_amount: reader.amount(base + loan_record::CURRENT_AMOUNT)?,
            debt_category: reader.small_uint(base + loan_record::DEBT_CATEGORY)?,
        })
    }
}

/// Identity half of a `loan_record`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanOwner {
    pub loan_id: LoanId,
    pub user: Address,
}

impl LoanOwner {
    fn decode(reader: &FieldReader<'_>, base: usize) -> Result<Self, DecodeError> {
        Ok(LoanOwner {
            loan_id: reader.loan_id(base + loan_record::ID)?,
            user: reader.address(base + loan_record::OWNER)?,
        })
    }
}

/// Post-state of a loan's user-supplied collateral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollateralRecord {
    pub loan_id: LoanId,
    pub token: Token,
    pub amount: Decimal,
}

impl CollateralRecord {
    fn decode(
        reader: &FieldReader<'_>,
        loan_id_index: usize,
        registry: &TokenRegistry,
    ) -> Result<Self, ReplayError> {
        Ok(CollateralRecord {
            loan_id: reader.loan_id(loan_id_index)?,
            token: reader.token(collateral_record::MARKET, registry)?,
            amount: reader.amount(collateral_record::CURRENT_AMOUNT)?,
        })
    }
}

/// A fully decoded Hashstack event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashstackEvent {
    NewLoan {
        loan: LoanRecord,
        collateral_token: Token,
        collateral_amount: Decimal,
    },
    LoanSwap {
        old: LoanOwner,
        new: LoanRecord,
    },
    Liquidated(LoanRecord),
    LoanWithdrawal(LoanRecord),
    LoanRepaid(LoanRecord),
    LoanInterestDeducted(CollateralRecord),
    CollateralAdded(CollateralRecord),
    CollateralWithdrawal(CollateralRecord),
}

impl HashstackEvent {
    pub fn decode(raw: &RawEvent, registry: &TokenRegistry) -> Result<Self, ReplayError> {
        let kind = EventKind::from_key_name(&raw.key_name)
            .ok_or_else(|| DecodeError::UnknownEventType(raw.key_name.clone()))?;
        let reader = FieldReader::new(kind.as_str(), &raw.data);

        let event = match kind {
            EventKind::NewLoan => {
                let loan = LoanRecord::decode(&reader, 0, registry)?;
                let (collateral_token, collateral_amount) =
                    decode_new_loan_collateral(&reader, registry)?;
                HashstackEvent::NewLoan {
                    loan,
                    collateral_token,
                    collateral_amount,
                }
            }
            EventKind::LoanSwap => HashstackEvent::LoanSwap {
                old: LoanOwner::decode(&reader, 0)?,
                new: LoanRecord::decode(&reader, loan_record::LEN, registry)?,
            },
            EventKind::Liquidated => {
                HashstackEvent::Liquidated(LoanRecord::decode(&reader, 0, registry)?)
            }
            EventKind::LoanWithdrawal => {
                HashstackEvent::LoanWithdrawal(LoanRecord::decode(&reader, 0, registry)?)
            }
            EventKind::LoanRepaid => {
                HashstackEvent::LoanRepaid(LoanRecord::decode(&reader, 0, registry)?)
            }
            EventKind::LoanInterestDeducted => HashstackEvent::LoanInterestDeducted(
                CollateralRecord::decode(&reader, INTEREST_EVENT_LOAN_ID, registry)?,
            ),
            EventKind::CollateralAdded => HashstackEvent::CollateralAdded(
                CollateralRecord::decode(&reader, COLLATERAL_EVENT_LOAN_ID, registry)?,
            ),
            EventKind::CollateralWithdrawal => HashstackEvent::CollateralWithdrawal(
                CollateralRecord::decode(&reader, COLLATERAL_EVENT_LOAN_ID, registry)?,
            ),
        };
        Ok(event)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            HashstackEvent::NewLoan { .. } => EventKind::NewLoan,
            HashstackEvent::LoanSwap { .. } => EventKind::LoanSwap,
            HashstackEvent::Liquidated(_) => EventKind::Liquidated,
            HashstackEvent::LoanWithdrawal(_) => EventKind::LoanWithdrawal,
            HashstackEvent::LoanRepaid(_) => EventKind::LoanRepaid,
            HashstackEvent::LoanInterestDeducted(_) => EventKind::LoanInterestDeducted,
            HashstackEvent::CollateralAdded(_) => EventKind::CollateralAdded,
            HashstackEvent::CollateralWithdrawal(_) => EventKind::CollateralWithdrawal,
        }
    }
}

/// Try the standard layout first, then the shorter early-loan layout.
/// When neither matches, the standard layout's error is reported.
fn decode_new_loan_collateral(
    reader: &FieldReader<'_>,
    registry: &TokenRegistry,
) -> Result<(Token, Decimal), ReplayError> {
    let mut first_error = None;
    for (market, amount) in NEW_LOAN_COLLATERAL_LAYOUTS {
        let attempt = reader
            .token(market, registry)
            .and_then(|token| Ok((token, reader.amount(amount)?)));
        match attempt {
            Ok(collateral) => return Ok(collateral),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or(ReplayError::Decode(DecodeError::MissingField {
        event: EventKind::NewLoan.as_str(),
        index: NEW_LOAN_COLLATERAL_LAYOUTS[0].0,
    })))
}

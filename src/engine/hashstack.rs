//! State transitions for the Hashstack lending contract.
//!
//! Hashstack events carry the post-state of a loan, never deltas, so every
//! handler overwrites the balances it owns.

use super::{LoanEntity, LoanProtocol, LoanStateStore};
use crate::decode::{CollateralRecord, HashstackEvent, LoanRecord};
use crate::domain::{
    Address, Decimal, EventKind, EventMeta, LoanId, RawEvent, TokenAmounts, TokenRegistry,
};
use crate::error::ReplayError;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct HashstackProtocol {
    verbose_user: Option<Address>,
}

impl HashstackProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every transition of loans owned by `user`.
    pub fn with_verbose_user(mut self, user: Option<Address>) -> Self {
        self.verbose_user = user;
        self
    }

    fn is_verbose(&self, loan: &LoanEntity) -> bool {
        self.verbose_user.as_ref() == Some(&loan.user)
    }

    fn new_loan(
        &self,
        store: &mut LoanStateStore,
        meta: &EventMeta,
        record: &LoanRecord,
        collateral: TokenAmounts,
    ) -> Result<(), ReplayError> {
        let mut loan = LoanEntity::new(record.user.clone(), record.debt_category);
        loan.original_collateral = collateral;
        loan.borrowed_collateral = TokenAmounts::single(
            record.borrowed_collateral_token.clone(),
            record.borrowed_collateral_amount,
        );
        loan.debt = TokenAmounts::single(record.debt_token.clone(), record.debt_amount);

        let loan = store.insert_new(record.loan_id, EventKind::NewLoan.as_str(), loan)?;
        if self.is_verbose(loan) {
            info!(
                block = meta.block_number,
                loan_id = %record.loan_id,
                debt_token = %record.debt_token,
                debt = %record.debt_amount,
                borrowed_collateral_token = %record.borrowed_collateral_token,
                borrowed_collateral = %record.borrowed_collateral_amount,
                "loan opened"
            );
        }
        Ok(())
    }

    fn rewrite_original_collateral(
        &self,
        store: &mut LoanStateStore,
        meta: &EventMeta,
        kind: EventKind,
        record: &CollateralRecord,
    ) -> Result<(), ReplayError> {
        let loan = store.update(record.loan_id, kind.as_str(), |loan| {
            loan.original_collateral = TokenAmounts::single(record.token.clone(), record.amount);
            Ok(())
        })?;
        if self.is_verbose(loan) {
            info!(
                block = meta.block_number,
                loan_id = %record.loan_id,
                event = %kind,
                token = %record.token,
                collateral = %record.amount,
                "original collateral rewritten"
            );
        }
        Ok(())
    }

    /// Shared by `loan_withdrawal`, `loan_repaid` and `liquidated`: the
    /// loan record overwrites debt, borrowed collateral and category.
    fn rewrite_loan(
        &self,
        store: &mut LoanStateStore,
        meta: &EventMeta,
        kind: EventKind,
        record: &LoanRecord,
    ) -> Result<(), ReplayError> {
        let event = kind.as_str();
        let loan_id = record.loan_id;
        let closes_loan = matches!(kind, EventKind::LoanRepaid | EventKind::Liquidated);

        // Only full repayment and full liquidation exist in the protocol.
        if closes_loan && !record.borrowed_collateral_amount.is_zero() {
            return Err(ReplayError::invariant(
                loan_id,
                event,
                format!(
                    "borrowed collateral must be zero, got {} {}",
                    record.borrowed_collateral_amount, record.borrowed_collateral_token
                ),
            ));
        }
        let debt_amount = if closes_loan {
            Decimal::zero()
        } else {
            record.debt_amount
        };

        let loan = store.update(loan_id, event, |loan| {
            ensure_owner(loan, &record.user, loan_id, event)?;
            loan.debt = TokenAmounts::single(record.debt_token.clone(), debt_amount);
            loan.borrowed_collateral = TokenAmounts::single(
                record.borrowed_collateral_token.clone(),
                record.borrowed_collateral_amount,
            );
            loan.debt_category = record.debt_category;
            // Seized collateral is not tracked further.
            if kind == EventKind::Liquidated {
                loan.original_collateral = TokenAmounts::new();
            }
            Ok(())
        })?;
        if self.is_verbose(loan) {
            info!(
                block = meta.block_number,
                loan_id = %loan_id,
                event = %kind,
                debt_token = %record.debt_token,
                debt = %debt_amount,
                borrowed_collateral_token = %record.borrowed_collateral_token,
                borrowed_collateral = %record.borrowed_collateral_amount,
                "loan rewritten"
            );
        }
        Ok(())
    }

    fn loan_swap(
        &self,
        store: &mut LoanStateStore,
        meta: &EventMeta,
        old_loan_id: LoanId,
        old_user: &Address,
        new: &LoanRecord,
    ) -> Result<(), ReplayError> {
        let event = EventKind::LoanSwap.as_str();
        if new.loan_id != old_loan_id {
            return Err(ReplayError::invariant(
                old_loan_id,
                event,
                format!("swap moved the loan to id {}", new.loan_id),
            ));
        }
        if &new.user != old_user {
            return Err(ReplayError::invariant(
                old_loan_id,
                event,
                format!("swap changed the owner from {} to {}", old_user, new.user),
            ));
        }

        let new_debt = TokenAmounts::single(new.debt_token.clone(), new.debt_amount);
        let loan = store.update(new.loan_id, event, |loan| {
            ensure_owner(loan, old_user, old_loan_id, event)?;
            // Only whole-debt swaps exist in the protocol.
            if loan.debt != new_debt {
                return Err(ReplayError::invariant(
                    old_loan_id,
                    event,
                    format!(
                        "debt changed during swap: {} {} expected",
                        new.debt_amount, new.debt_token
                    ),
                ));
            }
            loan.debt = new_debt.clone();
            loan.borrowed_collateral = TokenAmounts::single(
                new.borrowed_collateral_token.clone(),
                new.borrowed_collateral_amount,
            );
            loan.debt_category = new.debt_category;
            Ok(())
        })?;
        if self.is_verbose(loan) {
            info!(
                block = meta.block_number,
                loan_id = %new.loan_id,
                debt_token = %new.debt_token,
                debt = %new.debt_amount,
                borrowed_collateral_token = %new.borrowed_collateral_token,
                borrowed_collateral = %new.borrowed_collateral_amount,
                "loan swapped"
            );
        }
        Ok(())
    }
}

fn ensure_owner(
    loan: &LoanEntity,
    user: &Address,
    loan_id: LoanId,
    event: &'static str,
) -> Result<(), ReplayError> {
    if &loan.user != user {
        return Err(ReplayError::invariant(
            loan_id,
            event,
            format!("event user {} does not own the loan (owner {})", user, loan.user),
        ));
    }
    Ok(())
}

impl LoanProtocol for HashstackProtocol {
    type Event = HashstackEvent;

    fn event_names(&self) -> Vec<&'static str> {
        EventKind::ALL.iter().map(|kind| kind.as_str()).collect()
    }

    fn decode(&self, raw: &RawEvent, tokens: &TokenRegistry) -> Result<HashstackEvent, ReplayError> {
        HashstackEvent::decode(raw, tokens)
    }

    fn type_priority(&self, event: &HashstackEvent) -> u8 {
        event.kind().priority()
    }

    fn apply(
        &self,
        store: &mut LoanStateStore,
        meta: &EventMeta,
        event: &HashstackEvent,
    ) -> Result<(), ReplayError> {
        let kind = event.kind();
        match event {
            HashstackEvent::NewLoan {
                loan,
                collateral_token,
                collateral_amount,
            } => {
                let collateral = TokenAmounts::single(collateral_token.clone(), *collateral_amount);
                self.new_loan(store, meta, loan, collateral)
            }
            HashstackEvent::CollateralAdded(record)
            | HashstackEvent::CollateralWithdrawal(record)
            | HashstackEvent::LoanInterestDeducted(record) => {
                self.rewrite_original_collateral(store, meta, kind, record)
            }
            HashstackEvent::LoanWithdrawal(record)
            | HashstackEvent::LoanRepaid(record)
            | HashstackEvent::Liquidated(record) => self.rewrite_loan(store, meta, kind, record),
            HashstackEvent::LoanSwap { old, new } => {
                self.loan_swap(store, meta, old.loan_id, &old.user, new)
            }
        }
    }
}

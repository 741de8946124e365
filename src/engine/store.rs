use super::LoanEntity;
use crate::domain::{LoanId, Token, TokenAmounts};
use crate::error::ReplayError;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Current snapshot of every loan, keyed by loan id.
///
/// Entities are created once and then only overwritten; nothing is ever
/// removed. Every write goes through [`LoanStateStore::insert_new`] or
/// [`LoanStateStore::update`], both of which recompute the entity's total
/// collateral afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanStateStore {
    loans: BTreeMap<LoanId, LoanEntity>,
    universe: BTreeSet<Token>,
}

impl LoanStateStore {
    /// Create an empty store whose collateral totals span `universe`.
    pub fn new(universe: BTreeSet<Token>) -> Self {
        Self {
            loans: BTreeMap::new(),
            universe,
        }
    }

    pub fn get(&self, loan_id: LoanId) -> Option<&LoanEntity> {
        self.loans.get(&loan_id)
    }

    pub fn contains(&self, loan_id: LoanId) -> bool {
        self.loans.contains_key(&loan_id)
    }

    /// Iterate loans in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&LoanId, &LoanEntity)> {
        self.loans.iter()
    }

    pub fn loans(&self) -> impl Iterator<Item = &LoanEntity> {
        self.loans.values()
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    pub fn universe(&self) -> &BTreeSet<Token> {
        &self.universe
    }

    /// Register a new loan. Fails if the id is already taken.
    pub fn insert_new(
        &mut self,
        loan_id: LoanId,
        event: &'static str,
        mut loan: LoanEntity,
    ) -> Result<&LoanEntity, ReplayError> {
        if self.loans.contains_key(&loan_id) {
            return Err(ReplayError::invariant(loan_id, event, "loan already exists"));
        }
        refresh_collateral(&mut loan, &self.universe, loan_id, event)?;
        Ok(self.loans.entry(loan_id).or_insert(loan))
    }

    /// Overwrite fields of an existing loan through `apply`, then recompute
    /// its collateral total.
    pub fn update<F>(
        &mut self,
        loan_id: LoanId,
        event: &'static str,
        apply: F,
    ) -> Result<&LoanEntity, ReplayError>
    where
        F: FnOnce(&mut LoanEntity) -> Result<(), ReplayError>,
    {
        let loan = self
            .loans
            .get_mut(&loan_id)
            .ok_or_else(|| ReplayError::invariant(loan_id, event, "loan does not exist"))?;
        apply(loan)?;
        refresh_collateral(loan, &self.universe, loan_id, event)?;
        Ok(loan)
    }

    /// SHA-256 over the canonical snapshot. Zero amounts are skipped so that
    /// an explicit zero and an absent token hash the same.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (loan_id, loan) in &self.loans {
            hasher.update(loan_id.as_u64().to_le_bytes());
            hasher.update(loan.user.as_str());
            hasher.update(loan.debt_category.to_le_bytes());
            for (label, amounts) in [
                ("original", &loan.original_collateral),
                ("borrowed", &loan.borrowed_collateral),
                ("collateral", loan.collateral()),
                ("debt", &loan.debt),
            ] {
                hasher.update(label);
                hash_amounts(&mut hasher, amounts);
            }
        }
        hex::encode(hasher.finalize())
    }
}

fn refresh_collateral(
    loan: &mut LoanEntity,
    universe: &BTreeSet<Token>,
    loan_id: LoanId,
    event: &'static str,
) -> Result<(), ReplayError> {
    loan.refresh_collateral(universe).map_err(|token| {
        ReplayError::invariant(
            loan_id,
            event,
            format!("{} collateral total exceeds the decimal range", token),
        )
    })
}

fn hash_amounts(hasher: &mut Sha256, amounts: &TokenAmounts) {
    for (token, amount) in amounts.iter().filter(|(_, amount)| !amount.is_zero()) {
        hasher.update([0u8]);
        hasher.update(token.as_str());
        hasher.update([0u8]);
        hasher.update(amount.to_canonical_string());
    }
}

use crate::domain::{Address, Token, TokenAmounts};
use std::collections::BTreeSet;

/// Per-loan accounting record.
///
/// Hashstack users may hold several loans, each liquidated independently, so
/// the record is keyed by loan rather than by user. Collateral is split into
/// what the user deposited (`original_collateral`) and the leveraged funds
/// the loan currently holds (`borrowed_collateral`). All amounts are face
/// amounts; the protocol publishes no interest-rate events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanEntity {
    pub user: Address,
    pub debt_category: u32,
    pub original_collateral: TokenAmounts,
    pub borrowed_collateral: TokenAmounts,
    /// Always `original_collateral + borrowed_collateral`. Only
    /// [`LoanEntity::refresh_collateral`] writes it.
    collateral: TokenAmounts,
    pub debt: TokenAmounts,
}

impl LoanEntity {
    pub fn new(user: Address, debt_category: u32) -> Self {
        Self {
            user,
            debt_category,
            original_collateral: TokenAmounts::new(),
            borrowed_collateral: TokenAmounts::new(),
            collateral: TokenAmounts::new(),
            debt: TokenAmounts::new(),
        }
    }

    pub fn collateral(&self) -> &TokenAmounts {
        &self.collateral
    }

    /// Recompute `collateral` from its two components over `universe`.
    /// On overflow the stored total is left as it was and the token is returned.
    pub fn refresh_collateral(&mut self, universe: &BTreeSet<Token>) -> Result<(), Token> {
        self.collateral =
            TokenAmounts::sum_over(universe, &self.original_collateral, &self.borrowed_collateral)?;
        Ok(())
    }

    pub fn has_collateral(&self) -> bool {
        self.collateral.has_positive()
    }

    pub fn has_debt(&self) -> bool {
        self.debt.has_positive()
    }
}

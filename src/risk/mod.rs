//! Risk metrics computed from a loan snapshot and caller-supplied prices.
//!
//! Everything here reads the store and never mutates it; a failed query
//! leaves replay state untouched.

use crate::domain::{Decimal, Token};
use crate::error::RiskError;
use std::collections::HashMap;

pub mod health;
pub mod liquidation;

pub use health::{
    compute_collateral_usd, compute_debt_to_be_liquidated, compute_debt_usd,
    compute_health_factor, compute_standardized_health_factor, liquidation_threshold,
    HealthFactor,
};
pub use liquidation::{
    compute_liquidable_debt_at_price, compute_liquidable_debt_curve, compute_loan_risks,
    compute_number_of_active_borrowers, compute_number_of_active_users, LiquidableDebtPoint,
    LoanRisk,
};

/// USD price per whole token, keyed by symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prices {
    prices: HashMap<Token, Decimal>,
}

impl Prices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: Token, price: Decimal) {
        self.prices.insert(token, price);
    }

    pub fn with_price(mut self, token: Token, price: Decimal) -> Self {
        self.insert(token, price);
        self
    }

    pub fn get(&self, token: &Token) -> Result<Decimal, RiskError> {
        self.prices
            .get(token)
            .copied()
            .ok_or_else(|| RiskError::PriceMissing {
                token: token.clone(),
            })
    }

    /// Copy of these prices with one token's price replaced.
    pub fn with_override(&self, token: &Token, price: Decimal) -> Self {
        let mut changed = self.clone();
        changed.insert(token.clone(), price);
        changed
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(Token, Decimal)> for Prices {
    fn from_iter<I: IntoIterator<Item = (Token, Decimal)>>(iter: I) -> Self {
        Self {
            prices: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_leaves_original_untouched() {
        let prices = Prices::new().with_price(Token::from("ETH"), Decimal::from(2000u64));
        let changed = prices.with_override(&Token::from("ETH"), Decimal::from(1500u64));
        assert_eq!(prices.get(&Token::from("ETH")).unwrap(), Decimal::from(2000u64));
        assert_eq!(changed.get(&Token::from("ETH")).unwrap(), Decimal::from(1500u64));
    }

    #[test]
    fn test_missing_price() {
        let prices = Prices::new();
        assert_eq!(
            prices.get(&Token::from("DAI")),
            Err(RiskError::PriceMissing {
                token: Token::from("DAI")
            })
        );
    }
}

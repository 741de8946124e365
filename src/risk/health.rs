//! Per-loan USD valuation and health factors.

use super::Prices;
use crate::domain::{Decimal, DecimalFactors, TokenAmounts};
use crate::engine::LoanEntity;
use crate::error::RiskError;
use rust_decimal::Decimal as RustDecimal;
use serde::{Serialize, Serializer};
use std::fmt;

/// Collateral-to-debt ratio. `Infinite` means the loan has no debt and
/// therefore no default risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HealthFactor {
    Finite(Decimal),
    Infinite,
}

impl HealthFactor {
    /// `numerator / denominator`, infinite when the denominator is zero or
    /// the ratio exceeds the decimal range.
    fn ratio(numerator: Decimal, denominator: Decimal) -> Self {
        if denominator.is_zero() {
            return HealthFactor::Infinite;
        }
        numerator
            .checked_div(denominator)
            .map_or(HealthFactor::Infinite, HealthFactor::Finite)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, HealthFactor::Infinite)
    }

    pub fn is_below(&self, threshold: Decimal) -> bool {
        match self {
            HealthFactor::Finite(value) => *value < threshold,
            HealthFactor::Infinite => false,
        }
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthFactor::Finite(value) => write!(f, "{}", value),
            HealthFactor::Infinite => write!(f, "inf"),
        }
    }
}

impl Serialize for HealthFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HealthFactor::Finite(value) => value.serialize(serializer),
            HealthFactor::Infinite => serializer.serialize_str("inf"),
        }
    }
}

/// Health factor below which a loan of this debt category is liquidatable.
pub fn liquidation_threshold(debt_category: u32) -> Decimal {
    let hundredths = match debt_category {
        1 => 106,
        2 => 105,
        _ => 104,
    };
    Decimal::from(RustDecimal::new(hundredths, 2))
}

fn amounts_usd(
    amounts: &TokenAmounts,
    prices: &Prices,
    decimals: &DecimalFactors,
) -> Result<Decimal, RiskError> {
    amounts
        .iter()
        .filter(|(_, amount)| !amount.is_zero())
        .try_fold(Decimal::zero(), |total, (token, amount)| {
            let factor = decimals.get(token)?;
            let price = prices.get(token)?;
            amount
                .checked_div(factor)
                .and_then(|whole| whole.checked_mul(price))
                .and_then(|usd| total.checked_add(usd))
                .ok_or_else(|| RiskError::Overflow {
                    token: token.clone(),
                })
        })
}

pub fn compute_collateral_usd(
    loan: &LoanEntity,
    prices: &Prices,
    decimals: &DecimalFactors,
) -> Result<Decimal, RiskError> {
    amounts_usd(loan.collateral(), prices, decimals)
}

pub fn compute_debt_usd(
    loan: &LoanEntity,
    prices: &Prices,
    decimals: &DecimalFactors,
) -> Result<Decimal, RiskError> {
    amounts_usd(&loan.debt, prices, decimals)
}

pub fn compute_health_factor(
    loan: &LoanEntity,
    prices: &Prices,
    decimals: &DecimalFactors,
) -> Result<HealthFactor, RiskError> {
    let debt_usd = compute_debt_usd(loan, prices, decimals)?;
    if debt_usd.is_zero() {
        return Ok(HealthFactor::Infinite);
    }
    let collateral_usd = compute_collateral_usd(loan, prices, decimals)?;
    Ok(HealthFactor::ratio(collateral_usd, debt_usd))
}

/// Health factor relative to the category's liquidation threshold; below 1
/// means liquidatable.
pub fn compute_standardized_health_factor(
    loan: &LoanEntity,
    prices: &Prices,
    decimals: &DecimalFactors,
) -> Result<HealthFactor, RiskError> {
    let threshold = liquidation_threshold(loan.debt_category);
    let standardized = match compute_health_factor(loan, prices, decimals)? {
        HealthFactor::Finite(value) => HealthFactor::ratio(value, threshold),
        HealthFactor::Infinite => HealthFactor::Infinite,
    };
    Ok(standardized)
}

/// A liquidation clears the loan's whole debt.
pub fn compute_debt_to_be_liquidated(debt_usd: Decimal) -> Decimal {
    debt_usd
}

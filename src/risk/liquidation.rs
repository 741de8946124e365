//! Protocol-wide scans over the loan snapshot.

use super::health::{
    compute_collateral_usd, compute_debt_to_be_liquidated, compute_debt_usd,
    compute_health_factor, compute_standardized_health_factor, liquidation_threshold,
    HealthFactor,
};
use super::Prices;
use crate::domain::{Address, Decimal, DecimalFactors, LoanId, Token};
use crate::engine::LoanStateStore;
use crate::error::RiskError;
use serde::Serialize;
use std::collections::HashSet;

/// Risk metrics for a single loan under one price map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRisk {
    pub loan_id: LoanId,
    pub user: Address,
    pub debt_category: u32,
    pub collateral_usd: Decimal,
    pub debt_usd: Decimal,
    pub health_factor: HealthFactor,
    pub standardized_health_factor: HealthFactor,
}

/// Liquidable debt at one hypothetical collateral price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidableDebtPoint {
    pub collateral_price: Decimal,
    pub liquidable_debt_usd: Decimal,
}

/// Total USD debt that becomes liquidatable if `collateral_token` trades at
/// `collateral_price`.
///
/// Only loans with positive debt in `debt_token` are considered. A loan
/// counts when its health factor under the overridden prices is strictly
/// below its category threshold.
///
/// # Errors
/// Returns `PriceMissing` or `DecimalsMissing` when a considered loan holds a
/// token the tables do not cover, and `Overflow` when a USD value leaves the
/// decimal range.
pub fn compute_liquidable_debt_at_price(
    store: &LoanStateStore,
    prices: &Prices,
    decimals: &DecimalFactors,
    collateral_token: &Token,
    collateral_price: Decimal,
    debt_token: &Token,
) -> Result<Decimal, RiskError> {
    let changed_prices = prices.with_override(collateral_token, collateral_price);

    let mut total = Decimal::zero();
    for loan in store.loans() {
        if !loan.debt.is_positive_in(debt_token) {
            continue;
        }
        let health_factor = compute_health_factor(loan, &changed_prices, decimals)?;
        if health_factor.is_below(liquidation_threshold(loan.debt_category)) {
            let debt_usd = compute_debt_usd(loan, &changed_prices, decimals)?;
            total = total
                .checked_add(compute_debt_to_be_liquidated(debt_usd))
                .ok_or_else(|| RiskError::Overflow {
                    token: debt_token.clone(),
                })?;
        }
    }
    Ok(total)
}

/// [`compute_liquidable_debt_at_price`] over each of `price_points`, in the
/// order given.
pub fn compute_liquidable_debt_curve(
    store: &LoanStateStore,
    prices: &Prices,
    decimals: &DecimalFactors,
    collateral_token: &Token,
    price_points: &[Decimal],
    debt_token: &Token,
) -> Result<Vec<LiquidableDebtPoint>, RiskError> {
    price_points
        .iter()
        .map(|&collateral_price| {
            let liquidable_debt_usd = compute_liquidable_debt_at_price(
                store,
                prices,
                decimals,
                collateral_token,
                collateral_price,
                debt_token,
            )?;
            Ok(LiquidableDebtPoint {
                collateral_price,
                liquidable_debt_usd,
            })
        })
        .collect()
}

/// Distinct users holding any collateral or any debt.
pub fn compute_number_of_active_users(store: &LoanStateStore) -> usize {
    store
        .loans()
        .filter(|loan| loan.has_collateral() || loan.has_debt())
        .map(|loan| &loan.user)
        .collect::<HashSet<_>>()
        .len()
}

/// Distinct users holding any debt.
pub fn compute_number_of_active_borrowers(store: &LoanStateStore) -> usize {
    store
        .loans()
        .filter(|loan| loan.has_debt())
        .map(|loan| &loan.user)
        .collect::<HashSet<_>>()
        .len()
}

/// One [`LoanRisk`] row per loan, in loan id order.
pub fn compute_loan_risks(
    store: &LoanStateStore,
    prices: &Prices,
    decimals: &DecimalFactors,
) -> Result<Vec<LoanRisk>, RiskError> {
    store
        .iter()
        .map(|(loan_id, loan)| {
            Ok(LoanRisk {
                loan_id: *loan_id,
                user: loan.user.clone(),
                debt_category: loan.debt_category,
                collateral_usd: compute_collateral_usd(loan, prices, decimals)?,
                debt_usd: compute_debt_usd(loan, prices, decimals)?,
                health_factor: compute_health_factor(loan, prices, decimals)?,
                standardized_health_factor: compute_standardized_health_factor(
                    loan, prices, decimals,
                )?,
            })
        })
        .collect()
}

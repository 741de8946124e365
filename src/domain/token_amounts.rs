//! Face-value token balances keyed by symbol.

use crate::domain::{Decimal, Token};
use std::collections::{BTreeMap, BTreeSet};

/// A set of face amounts, one per token. A token that is absent holds zero.
///
/// Equality follows that rule too: `{A: 0}` equals `{}`.
#[derive(Debug, Clone, Default)]
pub struct TokenAmounts {
    amounts: BTreeMap<Token, Decimal>,
}

impl TokenAmounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// A balance holding exactly one token.
    pub fn single(token: Token, amount: Decimal) -> Self {
        let mut amounts = BTreeMap::new();
        amounts.insert(token, amount);
        Self { amounts }
    }

    pub fn get(&self, token: &Token) -> Decimal {
        self.amounts.get(token).copied().unwrap_or_default()
    }

    pub fn set(&mut self, token: Token, amount: Decimal) {
        self.amounts.insert(token, amount);
    }

    /// Iterate entries in symbol order, including explicit zeros.
    pub fn iter(&self) -> impl Iterator<Item = (&Token, &Decimal)> {
        self.amounts.iter()
    }

    /// Tokens with a strictly positive amount.
    pub fn positive_tokens(&self) -> impl Iterator<Item = &Token> {
        self.amounts
            .iter()
            .filter(|(_, amount)| amount.is_positive())
            .map(|(token, _)| token)
    }

    pub fn has_positive(&self) -> bool {
        self.positive_tokens().next().is_some()
    }

    pub fn is_positive_in(&self, token: &Token) -> bool {
        self.get(token).is_positive()
    }

    /// Element-wise sum of `a` and `b` over `universe` plus any token either side holds.
    ///
    /// Fails with the offending token when a sum exceeds the decimal range.
    pub fn sum_over(
        universe: &BTreeSet<Token>,
        a: &TokenAmounts,
        b: &TokenAmounts,
    ) -> Result<Self, Token> {
        let tokens: BTreeSet<&Token> = universe
            .iter()
            .chain(a.amounts.keys())
            .chain(b.amounts.keys())
            .collect();
        let amounts = tokens
            .into_iter()
            .map(|token| {
                a.get(token)
                    .checked_add(b.get(token))
                    .map(|sum| (token.clone(), sum))
                    .ok_or_else(|| token.clone())
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { amounts })
    }
}

impl PartialEq for TokenAmounts {
    fn eq(&self, other: &Self) -> bool {
        self.amounts
            .keys()
            .chain(other.amounts.keys())
            .all(|token| self.get(token) == other.get(token))
    }
}

impl Eq for TokenAmounts {}

impl FromIterator<(Token, Decimal)> for TokenAmounts {
    fn from_iter<I: IntoIterator<Item = (Token, Decimal)>>(iter: I) -> Self {
        Self {
            amounts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_absent_is_zero() {
        let amounts = TokenAmounts::single(Token::from("ETH"), d("1"));
        assert_eq!(amounts.get(&Token::from("USDC")), Decimal::zero());
    }

    #[test]
    fn test_explicit_zero_equals_absent() {
        let zero = TokenAmounts::single(Token::from("ETH"), Decimal::zero());
        assert_eq!(zero, TokenAmounts::new());
        assert!(!zero.has_positive());
    }

    #[test]
    fn test_different_amounts_not_equal() {
        let a = TokenAmounts::single(Token::from("ETH"), d("1"));
        let b = TokenAmounts::single(Token::from("ETH"), d("2"));
        let c = TokenAmounts::single(Token::from("DAI"), d("1"));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sum_over_universe() {
        let universe: BTreeSet<Token> = ["A", "B", "C"].into_iter().map(Token::from).collect();
        let original = TokenAmounts::single(Token::from("B"), d("50"));
        let borrowed = TokenAmounts::single(Token::from("B"), d("20"));

        let total = TokenAmounts::sum_over(&universe, &original, &borrowed).unwrap();
        assert_eq!(total.get(&Token::from("B")), d("70"));
        assert_eq!(total.iter().count(), 3);
        assert_eq!(total.get(&Token::from("A")), Decimal::zero());
    }

    #[test]
    fn test_sum_over_keeps_tokens_outside_universe() {
        let universe = BTreeSet::new();
        let original = TokenAmounts::single(Token::from("X"), d("1"));
        let total = TokenAmounts::sum_over(&universe, &original, &TokenAmounts::new()).unwrap();
        assert_eq!(total.get(&Token::from("X")), d("1"));
    }

    #[test]
    fn test_sum_over_overflow_names_token() {
        let huge = Decimal::from_u128(70_000_000_000_000_000_000_000_000_000).unwrap();
        let original = TokenAmounts::single(Token::from("ETH"), huge);
        assert_eq!(
            TokenAmounts::sum_over(&BTreeSet::new(), &original, &original),
            Err(Token::from("ETH"))
        );
    }

    #[test]
    fn test_positive_tokens() {
        let amounts: TokenAmounts = [
            (Token::from("A"), d("0")),
            (Token::from("B"), d("3")),
        ]
        .into_iter()
        .collect();
        let positive: Vec<&Token> = amounts.positive_tokens().collect();
        assert_eq!(positive, vec![&Token::from("B")]);
        assert!(amounts.is_positive_in(&Token::from("B")));
        assert!(!amounts.is_positive_in(&Token::from("A")));
    }
}

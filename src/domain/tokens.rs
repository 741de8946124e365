//! Token lookup tables: address -> symbol, and symbol -> decimal-scale factor.
//!
//! Both are plain values handed to the engine and the risk layer, so several
//! protocol instances can run side by side with their own tables.

use crate::domain::{Address, AddressParseError, Decimal, Token};
use crate::error::{ReplayError, RiskError};
use std::collections::{BTreeSet, HashMap};

const STARKNET_MAINNET_TOKENS: [(&str, &str, u32); 5] = [
    (
        "ETH",
        "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7",
        18,
    ),
    (
        "wBTC",
        "0x03fe2b97c1fd336e750087d68b9b867997fd64a2661ff3ca5a7c771641e8e7ac",
        8,
    ),
    (
        "USDC",
        "0x053c91253bc9682c04929ca02ed00b3e423f6710d2ee7e0d5ebb06f3ecf368a8",
        6,
    ),
    (
        "DAI",
        "0x00da114221cb83fa859dbdb4c44beeaa0bb37c7537ad5ae66fe5e0efd20e6eb3",
        18,
    ),
    (
        "USDT",
        "0x068f5c6a61780768455de69077e07e89787839bf8166decfbf92b645209c0fb8",
        6,
    ),
];

/// Maps token contract addresses to canonical symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRegistry {
    by_address: HashMap<Address, Token>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(address, symbol)` pairs.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, AddressParseError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut registry = Self::new();
        for (address, symbol) in entries {
            registry.insert(Address::parse(address)?, Token::from(symbol));
        }
        Ok(registry)
    }

    /// Tokens lent and borrowed on Starknet mainnet.
    pub fn starknet_mainnet() -> Self {
        let by_address = STARKNET_MAINNET_TOKENS
            .iter()
            .map(|(symbol, address, _)| (Address::from_canonical(address), Token::from(*symbol)))
            .collect();
        Self { by_address }
    }

    pub fn insert(&mut self, address: Address, token: Token) {
        self.by_address.insert(address, token);
    }

    pub fn get_symbol(&self, address: &Address) -> Result<&Token, ReplayError> {
        self.by_address
            .get(address)
            .ok_or_else(|| ReplayError::UnknownToken {
                address: address.to_string(),
            })
    }

    /// Every symbol the registry can produce.
    pub fn symbols(&self) -> BTreeSet<Token> {
        self.by_address.values().cloned().collect()
    }
}

/// Maps token symbols to their on-chain decimal-scale factor (e.g. 10^18 for ETH).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecimalFactors {
    factors: HashMap<Token, Decimal>,
}

impl DecimalFactors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starknet_mainnet() -> Self {
        let mut factors = Self::new();
        for (symbol, _, decimals) in STARKNET_MAINNET_TOKENS {
            if let Some(factor) = Decimal::pow10(decimals) {
                factors.factors.insert(Token::from(symbol), factor);
            }
        }
        factors
    }

    /// # Errors
    /// Returns `InvalidDecimalFactor` unless `factor` is positive.
    pub fn insert(&mut self, token: Token, factor: Decimal) -> Result<(), RiskError> {
        if !factor.is_positive() {
            return Err(RiskError::InvalidDecimalFactor { token, factor });
        }
        self.factors.insert(token, factor);
        Ok(())
    }

    pub fn with_factor(mut self, token: Token, factor: Decimal) -> Result<Self, RiskError> {
        self.insert(token, factor)?;
        Ok(self)
    }

    pub fn get(&self, token: &Token) -> Result<Decimal, RiskError> {
        self.factors
            .get(token)
            .copied()
            .ok_or_else(|| RiskError::DecimalsMissing {
                token: token.clone(),
            })
    }
}

//! Domain primitives: Address, Token, LoanId.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Largest felt is 252 bits, so 64 hex digits always suffice.
const FELT_HEX_DIGITS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address: {0}")]
pub struct AddressParseError(pub String);

/// Account or contract address in canonical felt form (`0x` + 64 lowercase hex digits).
///
/// Indexers disagree on zero padding (`0x49d3...` vs `0x049d3...`), so every
/// address is normalized on the way in and compared in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, AddressParseError> {
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);
        let significant = digits.trim_start_matches('0');
        if significant.len() > FELT_HEX_DIGITS {
            return Err(AddressParseError(raw.to_string()));
        }

        let padded = format!(
            "{:0>width$}",
            significant.to_ascii_lowercase(),
            width = FELT_HEX_DIGITS
        );
        hex::decode(&padded).map_err(|_| AddressParseError(raw.to_string()))?;

        Ok(Address(format!("0x{}", padded)))
    }

    /// Wrap a literal that is already canonical. Only used for built-in presets.
    pub(crate) fn from_canonical(canonical: &str) -> Self {
        Address(canonical.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token symbol (e.g., "ETH", "USDC").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Token(pub String);

impl Token {
    pub fn new(symbol: String) -> Self {
        Token(symbol)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(symbol: &str) -> Self {
        Token(symbol.to_string())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Protocol-assigned loan identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LoanId(pub u64);

impl LoanId {
    pub fn new(id: u64) -> Self {
        LoanId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_padding_is_normalized() {
        let short = Address::parse("0x49D36570").unwrap();
        let padded = Address::parse(
            "0x0000000000000000000000000000000000000000000000000000000049d36570",
        )
        .unwrap();
        assert_eq!(short, padded);
        assert_eq!(short.as_str().len(), 66);
    }

    #[test]
    fn test_address_without_prefix() {
        let a = Address::parse("abc").unwrap();
        let b = Address::parse("0xABC").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_address_zero() {
        let zero = Address::parse("0x0").unwrap();
        assert_eq!(zero.as_str(), format!("0x{}", "0".repeat(64)));
    }

    #[test]
    fn test_address_rejects_non_hex() {
        assert!(Address::parse("0xzz").is_err());
    }

    #[test]
    fn test_address_rejects_too_wide() {
        let wide = format!("0x1{}", "0".repeat(64));
        assert!(Address::parse(&wide).is_err());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::from("wBTC").to_string(), "wBTC");
    }

    #[test]
    fn test_loan_id_ordering() {
        assert!(LoanId::new(1) < LoanId::new(2));
    }
}

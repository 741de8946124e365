//! Positional field decoding.
//!
//! Events arrive as ordered arrays of hex strings. A [`FieldReader`] pulls a
//! single field out by index and converts it into a typed value; the
//! per-event layouts live in the protocol submodules.

pub mod hashstack;

pub use hashstack::{CollateralRecord, HashstackEvent, LoanOwner, LoanRecord};

use crate::domain::{Address, Decimal, LoanId, Token, TokenRegistry};
use crate::error::{DecodeError, ReplayError};

/// Widest integer any field is decoded into.
const MAX_U128_HEX_DIGITS: usize = 32;

/// Reads typed values out of one event's positional payload.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a> {
    event: &'static str,
    data: &'a [String],
}

impl<'a> FieldReader<'a> {
    pub fn new(event: &'static str, data: &'a [String]) -> Self {
        Self { event, data }
    }

    pub fn raw(&self, index: usize) -> Result<&'a str, DecodeError> {
        self.data
            .get(index)
            .map(String::as_str)
            .ok_or(DecodeError::MissingField {
                event: self.event,
                index,
            })
    }

    pub fn uint(&self, index: usize) -> Result<u128, DecodeError> {
        let value = self.raw(index)?;
        parse_hex_u128(value).map_err(|kind| match kind {
            HexError::NotHex => DecodeError::InvalidHex {
                event: self.event,
                index,
                value: value.to_string(),
            },
            HexError::TooWide => DecodeError::Overflow {
                event: self.event,
                index,
                value: value.to_string(),
            },
        })
    }

    /// Face amount: hex -> unsigned integer -> exact decimal.
    pub fn amount(&self, index: usize) -> Result<Decimal, DecodeError> {
        let value = self.uint(index)?;
        Decimal::from_u128(value).ok_or_else(|| self.overflow(index))
    }

    pub fn loan_id(&self, index: usize) -> Result<LoanId, DecodeError> {
        let value = self.uint(index)?;
        u64::try_from(value)
            .map(LoanId::new)
            .map_err(|_| self.overflow(index))
    }

    pub fn small_uint(&self, index: usize) -> Result<u32, DecodeError> {
        let value = self.uint(index)?;
        u32::try_from(value).map_err(|_| self.overflow(index))
    }

    pub fn address(&self, index: usize) -> Result<Address, DecodeError> {
        let value = self.raw(index)?;
        Address::parse(value).map_err(|_| DecodeError::InvalidHex {
            event: self.event,
            index,
            value: value.to_string(),
        })
    }

    /// Token symbol for the address stored at `index`.
    pub fn token(&self, index: usize, registry: &TokenRegistry) -> Result<Token, ReplayError> {
        let address = self.address(index)?;
        registry.get_symbol(&address).cloned()
    }

    fn overflow(&self, index: usize) -> DecodeError {
        DecodeError::Overflow {
            event: self.event,
            index,
            value: self.data.get(index).cloned().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HexError {
    NotHex,
    TooWide,
}

fn parse_hex_u128(value: &str) -> Result<u128, HexError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(HexError::NotHex);
    }
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }
    if significant.len() > MAX_U128_HEX_DIGITS {
        return Err(HexError::TooWide);
    }
    u128::from_str_radix(significant, 16).map_err(|_| HexError::NotHex)
}

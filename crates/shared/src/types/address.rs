//! Account and contract addresses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of an address in bytes.
const ADDRESS_LEN: usize = 20;

/// Errors from parsing an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Missing the `0x` prefix.
    #[error("address must start with 0x")]
    MissingPrefix,
    /// Wrong number of hex digits.
    #[error("address must have 40 hex digits, got {0}")]
    InvalidLength(usize),
    /// A character is not a hex digit.
    #[error("invalid hex digit '{0}' in address")]
    InvalidDigit(char),
}

/// A 20-byte ledger address (wallet owner, spender contract, market).
///
/// Displayed as `0x`-prefixed lowercase hex. Parsing accepts mixed case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0; ADDRESS_LEN]);

    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Creates a deterministic address whose last byte is `n`.
    ///
    /// Handy for fixtures and the simulator.
    #[must_use]
    pub const fn from_low_byte(n: u8) -> Self {
        let mut bytes = [0; ADDRESS_LEN];
        bytes[ADDRESS_LEN - 1] = n;
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressError::MissingPrefix)?;

        let digits: Vec<char> = hex.chars().collect();
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(AddressError::InvalidLength(digits.len()));
        }

        let mut bytes = [0u8; ADDRESS_LEN];
        for (byte, pair) in bytes.iter_mut().zip(digits.chunks(2)) {
            let hi = pair[0].to_digit(16).ok_or(AddressError::InvalidDigit(pair[0]))?;
            let lo = pair[1].to_digit(16).ok_or(AddressError::InvalidDigit(pair[1]))?;
            // Both digits are < 16, so the value fits in a byte.
            #[allow(clippy::cast_possible_truncation)]
            {
                *byte = (hi * 16 + lo) as u8;
            }
        }
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

/// Hash of a submitted transaction, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Token amounts with decimal precision.
//!
//! CRITICAL: Never use floating-point for token amounts.
//! This type wraps `rust_decimal::Decimal` for arbitrary precision.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from converting an amount to ledger base units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Negative amounts have no base-unit representation.
    #[error("amount {0} is negative")]
    Negative(Decimal),
    /// The scaled amount does not fit the base-unit range.
    #[error("amount {amount} overflows base units with {decimals} decimals")]
    Overflow {
        /// The amount being converted.
        amount: Decimal,
        /// Decimals of the currency.
        decimals: u32,
    },
}

/// An amount of the payment currency in whole-token units (e.g. 1.5 THALES).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAmount(pub Decimal);

impl TokenAmount {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates an amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Converts to the ledger's integer base units (`amount * 10^decimals`).
    ///
    /// Fractional base units are truncated.
    pub fn to_base_units(&self, decimals: u32) -> Result<u128, AmountError> {
        if self.is_negative() {
            return Err(AmountError::Negative(self.0));
        }
        let overflow = || AmountError::Overflow {
            amount: self.0,
            decimals,
        };

        // Split into integer and fractional parts so large decimals do not
        // overflow Decimal's 96-bit mantissa before reaching u128.
        let scale = 10u128.checked_pow(decimals).ok_or_else(overflow)?;
        let whole = self.0.trunc();
        let fraction = self.0 - whole;

        let whole_units = whole
            .to_u128()
            .and_then(|w| w.checked_mul(scale))
            .ok_or_else(overflow)?;

        let mut fraction_units = 0u128;
        let mut remaining = fraction;
        for _ in 0..decimals {
            remaining *= Decimal::TEN;
            let digit = remaining.trunc();
            remaining -= digit;
            fraction_units = fraction_units * 10 + digit.to_u128().ok_or_else(overflow)?;
        }

        whole_units.checked_add(fraction_units).ok_or_else(overflow)
    }

    /// Creates an amount from base units.
    #[must_use]
    pub fn from_base_units(units: u128, decimals: u32) -> Option<Self> {
        let scale = 10u128.checked_pow(decimals)?;
        let whole = Decimal::from_u128(units / scale)?;
        let remainder = i128::try_from(units % scale).ok()?;
        let fraction = Decimal::try_from_i128_with_scale(remainder, decimals).ok()?;
        Some(Self(whole + fraction))
    }
}

impl From<Decimal> for TokenAmount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

//! Monetary types.
//!
//! Prices and profit estimates stay as [`Decimal`]. Anything that is compared
//! against an on-chain balance is first converted to [`TokenAmount`], the
//! settlement token's fixed-point integer representation, so funds decisions
//! never depend on decimal rounding.

use std::fmt;

use alloy_primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Number of fractional digits of the settlement token (USDC).
pub const SETTLEMENT_DECIMALS: u32 = 6;

const UNIT_SCALE: u64 = 10u64.pow(SETTLEMENT_DECIMALS);

/// An amount of settlement token in its smallest indivisible unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub const ZERO: Self = Self(U256::ZERO);

    /// The maximum allowance an ERC-20 `approve` can grant.
    pub const UNLIMITED: Self = Self(U256::MAX);

    #[must_use]
    pub const fn from_units(units: U256) -> Self {
        Self(units)
    }

    #[must_use]
    pub const fn units(&self) -> U256 {
        self.0
    }

    /// Convert a human-readable dollar amount into base units.
    ///
    /// Digits beyond the sixth fractional place are truncated. Returns `None`
    /// for negative amounts or values too large to represent.
    #[must_use]
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return None;
        }
        let scaled = amount.checked_mul(Decimal::from(UNIT_SCALE))?.trunc();
        scaled.to_u128().map(|units| Self(U256::from(units)))
    }

    /// Convert base units back to dollars.
    ///
    /// Saturates at [`Decimal::MAX`] for amounts beyond Decimal's range, which
    /// in practice only happens for an unlimited allowance.
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        let Ok(units) = u128::try_from(self.0) else {
            return Decimal::MAX;
        };
        let Ok(units) = i128::try_from(units) else {
            return Decimal::MAX;
        };
        Decimal::try_from_i128_with_scale(units, SETTLEMENT_DECIMALS)
            .map(|d| d.normalize())
            .unwrap_or(Decimal::MAX)
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Difference `self - other`, floored at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::UNLIMITED {
            return f.write_str("unlimited");
        }
        write!(f, "{}", self.to_decimal())
    }
}

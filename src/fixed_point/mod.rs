//! Fixed-point conversion between on-chain integer amounts and decimals.
//!
//! On-chain quantities are unsigned integers in base units, i.e. the
//! economic value multiplied by `10^decimals`. Two representations are
//! offered:
//! - `Amount` / `format_amount` / `parse_base_units`: exact at every
//!   precision in `0..=MAX_PRECISION`, built on alloy's unit formatting and
//!   parsing
//! - `Decimal` for the projection arithmetic. `to_decimal` refuses any value
//!   it cannot hold exactly; `to_decimal_rounded` narrows to `Decimal`'s 28
//!   significant digits, rounding half away from zero
//!
//! Going back from a decimal amount to base units (e.g. "one whole token" as
//! a call argument) rounds to the nearest base unit.

use alloy::primitives::utils::{ParseUnits, Unit};
use alloy::primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Largest decimal precision the converter accepts.
pub const MAX_PRECISION: u32 = 36;

/// Precision of ETH-denominated amounts (wei).
pub const ETH_DECIMALS: Precision = Precision(18);

/// Scale of on-chain fixed-point constants such as the auction decay rate.
pub const WAD: Precision = Precision(18);

/// Largest scale a `Decimal` can carry.
const DECIMAL_MAX_SCALE: u32 = 28;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    #[error("negative precision: {0}")]
    NegativePrecision(i64),
    #[error("precision {0} exceeds maximum of {MAX_PRECISION}")]
    PrecisionOutOfRange(i64),
    #[error("negative amount: {0}")]
    NegativeAmount(String),
    #[error("invalid amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },
    #[error("{0} has more significant digits than a decimal can hold")]
    Inexact(String),
    #[error("value {0} does not fit the target representation")]
    Overflow(String),
}

/// A validated decimal precision in `0..=MAX_PRECISION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Precision(u32);

impl Precision {
    pub fn new(decimals: i64) -> Result<Self, FixedPointError> {
        if decimals < 0 {
            return Err(FixedPointError::NegativePrecision(decimals));
        }
        if decimals > i64::from(MAX_PRECISION) {
            return Err(FixedPointError::PrecisionOutOfRange(decimals));
        }
        Ok(Self(decimals as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// `10^precision` as a base-unit integer.
    fn scale_factor(self) -> U256 {
        U256::from(10u8).pow(U256::from(self.0))
    }

    fn unit(self) -> Unit {
        // Unit accepts up to 77, precision stops at 36.
        Unit::new(self.0 as u8).unwrap_or(Unit::MAX)
    }
}

impl TryFrom<u8> for Precision {
    type Error = FixedPointError;

    fn try_from(decimals: u8) -> Result<Self, Self::Error> {
        Self::new(i64::from(decimals))
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An on-chain amount kept exactly as read, together with its precision.
///
/// Displays and serializes as exact decimal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    base_units: U256,
    precision: Precision,
}

impl Amount {
    pub fn new(base_units: U256, precision: Precision) -> Self {
        Self {
            base_units,
            precision,
        }
    }

    /// Integer part, truncated toward zero.
    pub fn whole_units(self) -> U256 {
        self.base_units / self.precision.scale_factor()
    }

    /// Narrow to `Decimal` for arithmetic; see `to_decimal_rounded`.
    pub fn to_decimal(self) -> Result<Decimal, FixedPointError> {
        to_decimal_rounded(self.base_units, self.precision)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_amount(self.base_units, self.precision))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Exact decimal text of `value / 10^precision`, trailing zeros removed.
pub fn format_amount(value: U256, precision: Precision) -> String {
    let text = ParseUnits::U256(value).format_units(precision.unit());
    match text.split_once('.') {
        Some((int_part, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                int_part.to_string()
            } else {
                format!("{int_part}.{frac}")
            }
        }
        None => text,
    }
}

/// Parse exact decimal text into base units at `precision`.
///
/// Fractional digits beyond `precision` are dropped toward zero, so the text
/// produced by `format_amount` always parses back to the same integer.
pub fn parse_base_units(input: &str, precision: Precision) -> Result<U256, FixedPointError> {
    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return Err(FixedPointError::NegativeAmount(trimmed.to_string()));
    }
    let invalid = |reason: String| FixedPointError::InvalidAmount {
        input: input.to_string(),
        reason,
    };
    if trimmed.is_empty() || trimmed == "." {
        return Err(invalid("empty amount".to_string()));
    }
    match ParseUnits::parse_units(trimmed, precision.unit()).map_err(|e| invalid(e.to_string()))? {
        ParseUnits::U256(v) => Ok(v),
        ParseUnits::I256(_) => Err(FixedPointError::NegativeAmount(trimmed.to_string())),
    }
}

/// Convert a base-unit integer to its exact decimal value.
///
/// Fails with `Inexact` when the value has more significant digits than a
/// `Decimal` holds, and with `Overflow` when its integer part is too wide.
pub fn to_decimal(value: U256, precision: Precision) -> Result<Decimal, FixedPointError> {
    let text = format_amount(value, precision);
    Decimal::from_str_exact(&text).map_err(|e| match e {
        rust_decimal::Error::Underflow => FixedPointError::Inexact(text),
        _ => FixedPointError::Overflow(text),
    })
}

/// Convert a base-unit integer to the nearest `Decimal`.
///
/// Digits past `Decimal`'s capacity are rounded half away from zero; an
/// integer part wider than that capacity is an `Overflow`.
pub fn to_decimal_rounded(value: U256, precision: Precision) -> Result<Decimal, FixedPointError> {
    let text = format_amount(value, precision);
    Decimal::from_str(&text).map_err(|_| FixedPointError::Overflow(text))
}

/// Convert a decimal amount to the nearest base-unit integer at `precision`.
///
/// Midpoints round away from zero. Negative amounts are rejected.
pub fn to_base_units(amount: Decimal, precision: Precision) -> Result<U256, FixedPointError> {
    if amount < Decimal::ZERO {
        return Err(FixedPointError::NegativeAmount(amount.to_string()));
    }

    let dp = precision.0.min(DECIMAL_MAX_SCALE);
    let rounded = amount.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let mantissa = u128::try_from(rounded.mantissa())
        .map_err(|_| FixedPointError::NegativeAmount(amount.to_string()))?;

    // rounded.scale() <= dp <= precision
    let shift = Precision(precision.0 - rounded.scale());
    U256::from(mantissa)
        .checked_mul(shift.scale_factor())
        .ok_or_else(|| FixedPointError::Overflow(amount.to_string()))
}

/// Base-unit representation of exactly one whole token at `precision`.
pub fn one_unit(precision: Precision) -> U256 {
    precision.scale_factor()
}

/// Parse a user-supplied, non-negative decimal amount.
pub fn parse_amount(input: &str) -> Result<Decimal, FixedPointError> {
    let trimmed = input.trim();
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| FixedPointError::InvalidAmount {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
    if amount < Decimal::ZERO {
        return Err(FixedPointError::NegativeAmount(amount.to_string()));
    }
    Ok(amount)
}

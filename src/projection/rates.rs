//! ETH value of one token unit under the redeem and mint bases.
//!
//! Both rates come from the token's preview calls, invoked with exactly one
//! whole token at the cycle's decimals. They move independently between
//! polls as reserve, surplus and supply change, so they are resolved fresh
//! every cycle and never cached.

use crate::fixed_point::{self, FixedPointError, Precision, ETH_DECIMALS};
use crate::onchain::types::PreviewQuotes;
use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::Serialize;

/// Valuation basis for a token unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// ETH received by redeeming one unit against the reserve.
    Redeem,
    /// ETH paid to mint one new unit.
    Mint,
}

impl std::fmt::Display for Basis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Basis::Redeem => write!(f, "redeem"),
            Basis::Mint => write!(f, "mint"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitRates {
    pub redeem: Decimal,
    pub mint: Decimal,
}

impl UnitRates {
    /// Normalize the wei outputs of the preview calls to ETH.
    pub fn resolve(quotes: &PreviewQuotes) -> Result<Self, FixedPointError> {
        Ok(Self {
            redeem: fixed_point::to_decimal_rounded(quotes.redeem, ETH_DECIMALS)?,
            mint: fixed_point::to_decimal_rounded(quotes.mint, ETH_DECIMALS)?,
        })
    }

    pub fn rate(&self, basis: Basis) -> Decimal {
        match basis {
            Basis::Redeem => self.redeem,
            Basis::Mint => self.mint,
        }
    }

    /// ETH value of `amount` token units under `basis`.
    pub fn value_of(&self, amount: Decimal, basis: Basis) -> Option<Decimal> {
        amount.checked_mul(self.rate(basis))
    }
}

/// Preview-call argument for "one whole token" at `decimals`.
pub fn unit_request_amount(decimals: Precision) -> U256 {
    fixed_point::one_unit(decimals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_resolve() {
        let quotes = PreviewQuotes {
            redeem: U256::from(50_000_000_000_000_000u64),
            mint: U256::from(55_500_000_000_000_000u64),
        };
        let rates = UnitRates::resolve(&quotes).unwrap();
        assert_eq!(rates.rate(Basis::Redeem), dec("0.05"));
        assert_eq!(rates.rate(Basis::Mint), dec("0.0555"));
        assert_eq!(rates.value_of(dec("1000"), Basis::Redeem), Some(dec("50")));
    }

    #[test]
    fn test_unit_request_amount_tracks_decimals() {
        assert_eq!(
            unit_request_amount(Precision::new(6).unwrap()),
            U256::from(1_000_000u64)
        );
        assert_eq!(
            unit_request_amount(Precision::new(18).unwrap()),
            U256::from(1_000_000_000_000_000_000u128)
        );
    }
}

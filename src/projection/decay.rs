//! Continuous exponential decay of the auction price.
//!
//! `price(t) = price0 * exp(-k * t)` where `price0` is the price observed
//! this cycle and `t` is seconds elapsed since that observation. Each poll
//! re-anchors `t = 0` at the fresh observation; the recorded auction start
//! time plays no part in the model.

use crate::fixed_point::{self, FixedPointError, Precision, WAD};
use crate::projection::eta::Eta;
use alloy::primitives::U256;
use rust_decimal::{Decimal, MathematicalOps};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayModel {
    /// Observed price in token units.
    price0: Decimal,
    /// Decay rate per second.
    k: Decimal,
}

impl DecayModel {
    pub fn new(price0: Decimal, k: Decimal) -> Self {
        Self { price0, k }
    }

    /// Build from raw on-chain values: the price in token base units at
    /// `decimals`, and the decay rate scaled by 1e18.
    pub fn from_raw(
        price: U256,
        decay_rate: U256,
        decimals: Precision,
    ) -> Result<Self, FixedPointError> {
        Ok(Self {
            price0: fixed_point::to_decimal_rounded(price, decimals)?,
            k: fixed_point::to_decimal_rounded(decay_rate, WAD)?,
        })
    }

    pub fn price0(&self) -> Decimal {
        self.price0
    }

    pub fn decay_constant(&self) -> Decimal {
        self.k
    }

    /// Price after `elapsed_secs`. `None` when the model is degenerate or the
    /// exponent leaves `Decimal` range.
    pub fn price_at(&self, elapsed_secs: Decimal) -> Option<Decimal> {
        if self.price0 <= Decimal::ZERO {
            return None;
        }
        let exponent = (-self.k).checked_mul(elapsed_secs)?;
        self.price0.checked_mul(exponent.checked_exp()?)
    }

    /// Time until the price falls to `target` token units.
    pub fn time_to_reach(&self, target: Decimal) -> Eta {
        if self.price0 <= Decimal::ZERO || target <= Decimal::ZERO {
            return Eta::Unavailable;
        }
        let Some(ratio) = self.price0.checked_div(target) else {
            return Eta::Unavailable;
        };
        if ratio <= Decimal::ONE {
            return Eta::AlreadyReached;
        }
        // A flat or rising price never comes down to the target.
        if self.k <= Decimal::ZERO {
            return Eta::Unavailable;
        }
        match ratio.checked_ln().and_then(|ln| ln.checked_div(self.k)) {
            Some(seconds) => Eta::from_seconds(seconds),
            None => Eta::Unavailable,
        }
    }
}

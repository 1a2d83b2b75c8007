//! Auction price projection.
//!
//! - `decay`: the exponential decay law and its inversion
//! - `rates`: per-unit ETH rates under the redeem and mint bases
//! - `eta`: time-to-threshold results
//!
//! The threshold projector is a single pure function over
//! `(price0, k, unit_rate, target)`. Each (target, basis) pair is evaluated
//! on its own; no intermediate state is shared between pairs.

pub mod decay;
pub mod eta;
pub mod rates;

pub use decay::DecayModel;
pub use eta::Eta;
pub use rates::{Basis, UnitRates};

use rust_decimal::Decimal;
use serde::Serialize;

/// Time until the ETH price under a basis with `unit_rate` falls to
/// `target_eth`, with the rate held at its sampled value.
pub fn project(price0: Decimal, k: Decimal, unit_rate: Decimal, target_eth: Decimal) -> Eta {
    if unit_rate <= Decimal::ZERO {
        return Eta::Unavailable;
    }
    match target_eth.checked_div(unit_rate) {
        Some(target_units) => DecayModel::new(price0, k).time_to_reach(target_units),
        None => Eta::Unavailable,
    }
}

/// One row of the threshold table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdProjection {
    pub target_eth: Decimal,
    pub eta_redeem: Eta,
    pub eta_mint: Eta,
}

impl ThresholdProjection {
    pub fn eta(&self, basis: Basis) -> Eta {
        match basis {
            Basis::Redeem => self.eta_redeem,
            Basis::Mint => self.eta_mint,
        }
    }
}

/// Project every target under both bases, preserving target order.
pub fn project_thresholds(
    model: &DecayModel,
    rates: &UnitRates,
    targets: &[Decimal],
) -> Vec<ThresholdProjection> {
    let eta = |target: Decimal, basis: Basis| {
        project(model.price0(), model.decay_constant(), rates.rate(basis), target)
    };
    targets
        .iter()
        .map(|&target| ThresholdProjection {
            target_eth: target,
            eta_redeem: eta(target, Basis::Redeem),
            eta_mint: eta(target, Basis::Mint),
        })
        .collect()
}

//! Snapshot assembly and refresh scheduling.
//!
//! One polling cycle:
//! 1. `fetch_raw` reads auction/token state, then the redeem/mint previews
//!    for one whole token at the decimals just read
//! 2. `assemble` normalizes the raw integers, resolves the unit rates and
//!    projects every configured threshold under both bases
//! 3. the resulting `EconomicSnapshot` is handed to the renderer and dropped
//!
//! Every derived value in a snapshot comes from the same cycle's reads.

pub mod scheduler;

pub use scheduler::{Scheduler, SchedulerState};

use crate::fixed_point::{self, Amount, FixedPointError, Precision, ETH_DECIMALS};
use crate::onchain::{OnChainReader, RawOnChainSnapshot};
use crate::projection::{self, Basis, DecayModel, ThresholdProjection, UnitRates};

use alloy::primitives::U256;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CycleError {
    #[error("a refresh cycle is already in flight")]
    Busy,
    #[error("on-chain read failed: {0:#}")]
    Read(anyhow::Error),
    #[error("conversion failed: {0}")]
    Conversion(#[from] FixedPointError),
}

/// Per-cycle inputs that come from configuration rather than the chain.
#[derive(Debug, Clone, Default)]
pub struct CycleSettings {
    /// ETH thresholds to project, in display order.
    pub targets_eth: Vec<Decimal>,
    /// Raw user-supplied token amount for the ad-hoc ETH preview.
    pub preview_amount: Option<String>,
}

/// Supply figures, exact at the cycle's decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SupplySnapshot {
    pub total: Amount,
    pub effective: Amount,
    pub locked: Amount,
}

/// ETH value of the user-supplied token amount, or why it could not be valued.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AmountPreview {
    Valued { amount: Decimal, eth: Decimal },
    Invalid { input: String, reason: String },
}

impl AmountPreview {
    /// Value `input` token units at the redeem rate.
    pub fn evaluate(input: &str, rates: &UnitRates) -> Self {
        let invalid = |reason: String| Self::Invalid {
            input: input.to_string(),
            reason,
        };
        match fixed_point::parse_amount(input) {
            Ok(amount) => match rates.value_of(amount, Basis::Redeem) {
                Some(eth) => Self::Valued { amount, eth },
                None => invalid("value overflows".to_string()),
            },
            Err(e) => {
                debug!(input = %input, error = %e, "preview amount not valued");
                invalid(e.to_string())
            }
        }
    }
}

/// Everything the dashboard shows for one cycle, already in economic units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomicSnapshot {
    pub observed_at: DateTime<Utc>,
    /// Token precision read this cycle.
    pub decimals: Precision,
    pub current_price_token_units: Decimal,
    pub current_price_eth_redeem: Decimal,
    pub current_price_eth_mint: Decimal,
    pub decay_constant_per_second: Decimal,
    pub unit_rate_redeem: Decimal,
    pub unit_rate_mint: Decimal,
    pub auction_active: bool,
    pub auction_id: U256,
    pub subject_id: U256,
    /// `None` when the on-chain start time is not a representable timestamp.
    pub auction_start_utc: Option<DateTime<Utc>>,
    pub supply: SupplySnapshot,
    pub reserve_eth: Amount,
    pub surplus_eth: Amount,
    pub projections: Vec<ThresholdProjection>,
    pub preview: Option<AmountPreview>,
}

/// Read one cycle's raw values. The preview argument is one whole token at
/// the decimals returned by the state batch of this same cycle.
pub async fn fetch_raw<R: OnChainReader>(reader: &R) -> Result<RawOnChainSnapshot, CycleError> {
    let state = reader.read_state().await.map_err(CycleError::Read)?;
    let decimals = Precision::try_from(state.decimals)?;
    let unit_amount = projection::rates::unit_request_amount(decimals);
    let quotes = reader
        .read_previews(unit_amount)
        .await
        .map_err(CycleError::Read)?;
    Ok(RawOnChainSnapshot::from_parts(state, unit_amount, quotes))
}

/// Derive the economic snapshot from one cycle's raw values.
pub fn assemble(
    raw: &RawOnChainSnapshot,
    settings: &CycleSettings,
    observed_at: DateTime<Utc>,
) -> Result<EconomicSnapshot, FixedPointError> {
    let decimals = Precision::try_from(raw.decimals)?;
    let model = DecayModel::from_raw(raw.current_price, raw.decay_rate, decimals)?;
    let rates = UnitRates::resolve(&raw.previews())?;

    let price = model.price0();
    let eth_price = |basis: Basis| {
        rates
            .value_of(price, basis)
            .ok_or_else(|| FixedPointError::Overflow(format!("{price} tokens at the {basis} rate")))
    };
    let units = |v: U256| Amount::new(v, decimals);
    let eth = |v: U256| Amount::new(v, ETH_DECIMALS);

    let auction_start_utc = u64::try_from(raw.auction.start_time)
        .ok()
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0));

    Ok(EconomicSnapshot {
        observed_at,
        decimals,
        current_price_token_units: price,
        current_price_eth_redeem: eth_price(Basis::Redeem)?,
        current_price_eth_mint: eth_price(Basis::Mint)?,
        decay_constant_per_second: model.decay_constant(),
        unit_rate_redeem: rates.redeem,
        unit_rate_mint: rates.mint,
        auction_active: raw.auction.active,
        auction_id: raw.auction.auction_id,
        subject_id: raw.auction.subject_id,
        auction_start_utc,
        supply: SupplySnapshot {
            total: units(raw.total_supply),
            effective: units(raw.effective_supply),
            locked: units(raw.locked_supply),
        },
        reserve_eth: eth(raw.reserve),
        surplus_eth: eth(raw.surplus),
        projections: projection::project_thresholds(&model, &rates, &settings.targets_eth),
        preview: settings
            .preview_amount
            .as_deref()
            .map(|input| AmountPreview::evaluate(input, &rates)),
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! Synthetic reader and fixtures shared by the engine tests.

    use crate::onchain::{AuctionInfo, ChainState, OnChainReader, PreviewQuotes};
    use alloy::primitives::U256;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    pub(crate) const WEI: u128 = 1_000_000_000_000_000_000;

    /// 1000 tokens (6 decimals), k = 0.0001/s, started 2024-01-01T00:00:00Z.
    pub(crate) fn sample_state() -> ChainState {
        ChainState {
            auction: AuctionInfo {
                active: true,
                auction_id: U256::from(7u8),
                subject_id: U256::from(3100u16),
                start_time: U256::from(1_704_067_200u64),
            },
            current_price: U256::from(1_000_000_000u64),
            decay_rate: U256::from(100_000_000_000_000u64),
            decimals: 6,
            total_supply: U256::from(1_000_000_500_000u64),
            effective_supply: U256::from(900_000_000_000u64),
            locked_supply: U256::from(100_000_000_000u64),
            reserve: U256::from(45_000 * WEI),
            surplus: U256::from(3 * WEI / 2),
        }
    }

    /// 0.05 ETH to redeem one token, 0.06 ETH to mint one.
    pub(crate) fn sample_quotes() -> PreviewQuotes {
        PreviewQuotes {
            redeem: U256::from(WEI / 20),
            mint: U256::from(WEI * 6 / 100),
        }
    }

    /// Serves queued results first, then the fallback values.
    pub(crate) struct FakeReader {
        states: RefCell<VecDeque<anyhow::Result<ChainState>>>,
        quotes: RefCell<VecDeque<anyhow::Result<PreviewQuotes>>>,
        fallback_state: ChainState,
        fallback_quotes: PreviewQuotes,
        pub(crate) preview_amounts: RefCell<Vec<U256>>,
    }

    impl FakeReader {
        pub(crate) fn new(state: ChainState, quotes: PreviewQuotes) -> Self {
            Self {
                states: RefCell::new(VecDeque::new()),
                quotes: RefCell::new(VecDeque::new()),
                fallback_state: state,
                fallback_quotes: quotes,
                preview_amounts: RefCell::new(Vec::new()),
            }
        }

        pub(crate) fn then_fail(self, message: &'static str) -> Self {
            self.states
                .borrow_mut()
                .push_back(Err(anyhow::anyhow!(message)));
            self
        }

        pub(crate) fn then_state(self, state: ChainState) -> Self {
            self.states.borrow_mut().push_back(Ok(state));
            self
        }

        pub(crate) fn then_quotes(self, quotes: PreviewQuotes) -> Self {
            self.quotes.borrow_mut().push_back(Ok(quotes));
            self
        }

        pub(crate) fn then_fail_previews(self, message: &'static str) -> Self {
            self.quotes
                .borrow_mut()
                .push_back(Err(anyhow::anyhow!(message)));
            self
        }
    }

    impl OnChainReader for FakeReader {
        async fn read_state(&self) -> anyhow::Result<ChainState> {
            let next = self.states.borrow_mut().pop_front();
            next.unwrap_or(Ok(self.fallback_state))
        }

        async fn read_previews(&self, unit_amount: U256) -> anyhow::Result<PreviewQuotes> {
            self.preview_amounts.borrow_mut().push(unit_amount);
            let next = self.quotes.borrow_mut().pop_front();
            next.unwrap_or(Ok(self.fallback_quotes))
        }
    }
}

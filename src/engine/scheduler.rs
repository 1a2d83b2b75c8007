//! Refresh scheduler.
//!
//! Two states: `Idle` and `Fetching`. A cycle may only start from `Idle`,
//! and always returns to `Idle` when its pipeline finishes, whether it
//! succeeded or failed. A failed cycle is logged and reported to the caller;
//! the next tick polls again.

use crate::engine::{assemble, fetch_raw, CycleError, CycleSettings, EconomicSnapshot};
use crate::onchain::OnChainReader;

use chrono::Utc;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Smallest accepted polling interval.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Fetching,
}

pub struct Scheduler<R> {
    reader: R,
    settings: CycleSettings,
    interval: Duration,
    state: SchedulerState,
    cycles: u64,
    failures: u64,
}

impl<R: OnChainReader> Scheduler<R> {
    pub fn new(reader: R, settings: CycleSettings, interval: Duration) -> Self {
        Self {
            reader,
            settings,
            interval: interval.max(MIN_INTERVAL),
            state: SchedulerState::Idle,
            cycles: 0,
            failures: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// (completed cycles, failed cycles)
    pub fn stats(&self) -> (u64, u64) {
        (self.cycles, self.failures)
    }

    /// Run one full cycle: read, derive, assemble.
    pub async fn run_cycle(&mut self) -> Result<EconomicSnapshot, CycleError> {
        if self.state == SchedulerState::Fetching {
            return Err(CycleError::Busy);
        }
        self.state = SchedulerState::Fetching;
        debug!(cycle = self.cycles + 1, "refresh cycle started");

        let result = match fetch_raw(&self.reader).await {
            Ok(raw) => {
                debug!(raw = %raw, "raw values read");
                assemble(&raw, &self.settings, Utc::now()).map_err(CycleError::from)
            }
            Err(e) => Err(e),
        };

        self.state = SchedulerState::Idle;
        self.cycles += 1;

        match &result {
            Ok(snapshot) => info!(
                cycle = self.cycles,
                auction_id = %snapshot.auction_id,
                active = snapshot.auction_active,
                price_tokens = %snapshot.current_price_token_units,
                price_eth_redeem = %snapshot.current_price_eth_redeem,
                price_eth_mint = %snapshot.current_price_eth_mint,
                "snapshot assembled"
            ),
            Err(e) => {
                self.failures += 1;
                error!(cycle = self.cycles, failures = self.failures, error = %e, "refresh cycle failed");
            }
        }
        result
    }

    /// Poll immediately, then once per interval, handing each outcome to
    /// `on_cycle` until it breaks. A slow cycle delays the next tick instead
    /// of causing a burst.
    pub async fn run<F>(&mut self, mut on_cycle: F)
    where
        F: FnMut(&Result<EconomicSnapshot, CycleError>) -> ControlFlow<()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_ms = self.interval.as_millis() as u64, "polling started");
        loop {
            ticker.tick().await;
            let outcome = self.run_cycle().await;
            if on_cycle(&outcome).is_break() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::*;
    use crate::onchain::{ChainState, PreviewQuotes};
    use alloy::primitives::U256;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tokio::time::Instant;

    fn settings() -> CycleSettings {
        CycleSettings {
            targets_eth: vec![Decimal::from(40)],
            preview_amount: None,
        }
    }

    #[tokio::test]
    async fn test_cycle_returns_to_idle() {
        let reader = FakeReader::new(sample_state(), sample_quotes()).then_fail("rpc timeout");
        let mut scheduler = Scheduler::new(reader, settings(), Duration::from_secs(5));
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        assert!(matches!(scheduler.run_cycle().await, Err(CycleError::Read(_))));
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        assert!(scheduler.run_cycle().await.is_ok());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.stats(), (2, 1));
    }

    #[tokio::test]
    async fn test_preview_failure_yields_no_snapshot() {
        let reader = FakeReader::new(sample_state(), sample_quotes())
            .then_fail_previews("rpc timeout");
        let mut scheduler = Scheduler::new(reader, settings(), Duration::from_secs(5));

        assert!(matches!(scheduler.run_cycle().await, Err(CycleError::Read(_))));
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.stats(), (1, 1));
        assert!(scheduler.run_cycle().await.is_ok());
    }

    #[tokio::test]
    async fn test_rejects_overlapping_cycle() {
        let reader = FakeReader::new(sample_state(), sample_quotes());
        let mut scheduler = Scheduler::new(reader, settings(), Duration::from_secs(5));
        scheduler.state = SchedulerState::Fetching;

        assert!(matches!(scheduler.run_cycle().await, Err(CycleError::Busy)));
        assert_eq!(scheduler.state(), SchedulerState::Fetching);
        assert!(scheduler.reader.preview_amounts.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_each_cycle_resamples_rates_and_decimals() {
        let eighteen = ChainState {
            decimals: 18,
            current_price: U256::from(1000 * WEI),
            ..sample_state()
        };
        let reader = FakeReader::new(sample_state(), sample_quotes())
            .then_state(sample_state())
            .then_state(eighteen)
            .then_quotes(sample_quotes())
            .then_quotes(PreviewQuotes {
                redeem: U256::from(WEI / 10),
                mint: U256::from(WEI / 8),
            });
        let mut scheduler = Scheduler::new(reader, settings(), Duration::from_secs(5));

        let first = scheduler.run_cycle().await.unwrap();
        let second = scheduler.run_cycle().await.unwrap();

        assert_eq!(first.unit_rate_redeem, Decimal::from_str("0.05").unwrap());
        assert_eq!(second.unit_rate_redeem, Decimal::from_str("0.1").unwrap());
        assert_eq!(second.unit_rate_mint, Decimal::from_str("0.125").unwrap());
        assert_eq!(second.decimals.get(), 18);
        assert_eq!(second.current_price_token_units, Decimal::from(1000));
        assert_eq!(
            *scheduler.reader.preview_amounts.borrow(),
            vec![U256::from(1_000_000u64), U256::from(WEI)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_cycle_does_not_stop_polling() {
        let reader = FakeReader::new(sample_state(), sample_quotes()).then_fail("rpc timeout");
        let mut scheduler = Scheduler::new(reader, settings(), Duration::from_secs(5));

        let start = Instant::now();
        let mut seen = Vec::new();
        scheduler
            .run(|outcome| {
                seen.push((outcome.is_ok(), start.elapsed()));
                if seen.len() == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;

        assert_eq!(
            seen,
            vec![
                (false, Duration::ZERO),
                (true, Duration::from_secs(5)),
                (true, Duration::from_secs(10)),
            ]
        );
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.stats(), (3, 1));
    }
}

//! Terminal dashboard for one snapshot.
//!
//! Pure presentation: every number shown is already computed in the
//! `EconomicSnapshot`. The text layout is:
//!   header            → watcher name and observation time
//!   Strategy          → auction price in tokens and ETH, auction struct,
//!                       threshold table (Target | Redeem | Mint)
//!   Token             → unit rates, supplies, reserve, surplus, ad-hoc preview

use crate::engine::{AmountPreview, EconomicSnapshot};
use crate::fixed_point::Amount;
use crate::projection::Basis;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

const RULE_WIDTH: usize = 80;

/// ANSI clear-screen + cursor-home, written before each text frame.
pub const CLEAR_SCREEN: &str = "\x1B[2J\x1B[1;1H";

fn iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn fmt_fixed(v: Decimal, dp: u32) -> String {
    let rounded = v.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

fn fmt_eth(v: Decimal) -> String {
    format!("{} ETH", fmt_fixed(v, 3))
}

/// Three decimals when the amount fits a `Decimal`, exact text otherwise.
fn fmt_eth_amount(v: Amount) -> String {
    match v.to_decimal() {
        Ok(d) => fmt_eth(d),
        Err(_) => format!("{v} ETH"),
    }
}

fn fmt_rate(v: Decimal) -> String {
    format!("{} ETH", fmt_fixed(v, 6))
}

/// Integer part only, matching how the contracts' own UIs show supply.
fn fmt_tokens(v: Decimal, symbol: &str) -> String {
    format!("{} {}", v.trunc(), symbol)
}

fn fmt_supply(v: Amount, symbol: &str) -> String {
    format!("{} {}", v.whole_units(), symbol)
}

/// Text dashboard for one snapshot.
pub struct Dashboard<'a> {
    snapshot: &'a EconomicSnapshot,
    symbol: &'a str,
}

impl<'a> Dashboard<'a> {
    pub fn new(snapshot: &'a EconomicSnapshot, symbol: &'a str) -> Self {
        Self { snapshot, symbol }
    }
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot;
        let symbol = self.symbol;

        writeln!(f, "auction watcher @ {}", iso(&snapshot.observed_at))?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;

        writeln!(f, "Strategy")?;
        writeln!(
            f,
            "- currentAuctionPrice {}",
            fmt_tokens(snapshot.current_price_token_units, symbol)
        )?;
        writeln!(f, "  - holder:           {}", fmt_eth(snapshot.current_price_eth_redeem))?;
        writeln!(f, "  - minter:           {}", fmt_eth(snapshot.current_price_eth_mint))?;
        let start = snapshot
            .auction_start_utc
            .as_ref()
            .map(iso)
            .unwrap_or_else(|| "n/a".to_string());
        writeln!(
            f,
            "- auction:            active={} id={} subjectId={} start={}",
            snapshot.auction_active, snapshot.auction_id, snapshot.subject_id, start
        )?;
        writeln!(
            f,
            "- decay:              {}/s",
            snapshot.decay_constant_per_second.normalize()
        )?;

        let rows: Vec<[String; 3]> = snapshot
            .projections
            .iter()
            .map(|p| {
                [
                    format!("{} ETH", p.target_eth.normalize()),
                    p.eta(Basis::Redeem).to_string(),
                    p.eta(Basis::Mint).to_string(),
                ]
            })
            .collect();
        write_table(f, ["Target", "Redeem", "Mint"], &rows)?;

        writeln!(f)?;
        writeln!(f, "Token")?;
        let label = format!("price (1 {symbol}):");
        writeln!(f, "- {:<20}{} (redeem)", label, fmt_rate(snapshot.unit_rate_redeem))?;
        writeln!(f, "- {:<20}{} (mint)", label, fmt_rate(snapshot.unit_rate_mint))?;
        writeln!(f, "- totalSupply:        {}", fmt_supply(snapshot.supply.total, symbol))?;
        writeln!(f, "- effectiveSupply:    {}", fmt_supply(snapshot.supply.effective, symbol))?;
        writeln!(f, "- lockedSupply:       {}", fmt_supply(snapshot.supply.locked, symbol))?;
        writeln!(f, "- reserve:            {}", fmt_eth_amount(snapshot.reserve_eth))?;
        writeln!(f, "- surplus:            {}", fmt_eth_amount(snapshot.surplus_eth))?;

        match &snapshot.preview {
            Some(AmountPreview::Valued { amount, eth }) => writeln!(
                f,
                "- previewRedeem:      {} ({} {})",
                fmt_eth(*eth),
                amount.normalize(),
                symbol
            ),
            Some(AmountPreview::Invalid { input, reason }) => writeln!(
                f,
                "- previewRedeem:      error ({}) ({} {})",
                reason, input, symbol
            ),
            None => Ok(()),
        }
    }
}

/// Render the full text dashboard.
pub fn render(snapshot: &EconomicSnapshot, symbol: &str) -> String {
    Dashboard::new(snapshot, symbol).to_string()
}

/// Render the snapshot as a single JSON line.
pub fn render_json(snapshot: &EconomicSnapshot) -> serde_json::Result<String> {
    serde_json::to_string(snapshot)
}

/// Boxed table with a header row; columns sized to their widest cell.
fn write_table<const N: usize>(
    f: &mut fmt::Formatter<'_>,
    head: [&str; N],
    rows: &[[String; N]],
) -> fmt::Result {
    let mut widths: [usize; N] = head.map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut border = String::from("+");
    for w in &widths {
        border.push_str(&"-".repeat(w + 2));
        border.push('+');
    }

    writeln!(f, "{border}")?;
    write_row(f, &head[..], &widths[..])?;
    writeln!(f, "{border}")?;
    for row in rows {
        write_row(f, &row[..], &widths[..])?;
    }
    writeln!(f, "{border}")
}

fn write_row<S: AsRef<str>>(
    f: &mut fmt::Formatter<'_>,
    cells: &[S],
    widths: &[usize],
) -> fmt::Result {
    f.write_str("|")?;
    for (cell, w) in cells.iter().zip(widths) {
        write!(f, " {:<width$} |", cell.as_ref(), width = *w)?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SupplySnapshot;
    use crate::fixed_point::{Precision, ETH_DECIMALS};
    use crate::projection::{Eta, ThresholdProjection};
    use alloy::primitives::U256;
    use std::str::FromStr;
    use std::time::Duration;

    const WEI: u128 = 1_000_000_000_000_000_000;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn snapshot(preview: Option<AmountPreview>) -> EconomicSnapshot {
        let tokens = Precision::new(6).unwrap();
        EconomicSnapshot {
            observed_at: DateTime::from_timestamp(1_704_070_800, 0).unwrap(),
            decimals: tokens,
            current_price_token_units: dec("1000.75"),
            current_price_eth_redeem: dec("50.0375"),
            current_price_eth_mint: dec("60.045"),
            decay_constant_per_second: dec("0.000100"),
            unit_rate_redeem: dec("0.05"),
            unit_rate_mint: dec("0.06"),
            auction_active: true,
            auction_id: U256::from(7u8),
            subject_id: U256::from(3100u16),
            auction_start_utc: DateTime::from_timestamp(1_704_067_200, 0),
            supply: SupplySnapshot {
                total: Amount::new(U256::from(1_000_000_500_000u64), tokens),
                effective: Amount::new(U256::from(900_000_000_000u64), tokens),
                locked: Amount::new(U256::from(100_000_000_000u64), tokens),
            },
            reserve_eth: Amount::new(U256::from(45_000u64) * U256::from(WEI), ETH_DECIMALS),
            surplus_eth: Amount::new(U256::from(3 * WEI / 2), ETH_DECIMALS),
            projections: vec![
                ThresholdProjection {
                    target_eth: dec("50.0"),
                    eta_redeem: Eta::AlreadyReached,
                    eta_mint: Eta::After(Duration::from_secs(1823)),
                },
                ThresholdProjection {
                    target_eth: dec("40"),
                    eta_redeem: Eta::After(Duration::from_secs(2231)),
                    eta_mint: Eta::Unavailable,
                },
            ],
            preview,
        }
    }

    #[test]
    fn test_render_sections() {
        let text = render(&snapshot(None), "PAST");

        assert!(text.starts_with("auction watcher @ 2024-01-01T01:00:00.000Z\n"));
        assert!(text.contains("- currentAuctionPrice 1000 PAST\n"));
        assert!(text.contains("  - holder:           50.038 ETH\n"));
        assert!(text.contains("  - minter:           60.045 ETH\n"));
        assert!(text.contains("active=true id=7 subjectId=3100 start=2024-01-01T00:00:00.000Z"));
        assert!(text.contains("- price (1 PAST):     0.050000 ETH (redeem)\n"));
        assert!(text.contains("- price (1 PAST):     0.060000 ETH (mint)\n"));
        assert!(text.contains("- totalSupply:        1000000 PAST\n"));
        assert!(text.contains("- reserve:            45000.000 ETH\n"));
        assert!(text.contains("- surplus:            1.500 ETH\n"));
        assert!(!text.contains("previewRedeem"));
    }

    #[test]
    fn test_render_threshold_table() {
        let text = render(&snapshot(None), "PAST");
        assert!(text.contains("| Target | Redeem             | Mint               |\n"));
        assert!(text.contains("| 50 ETH | 0 hours 0 minutes  | 0 hours 30 minutes |\n"));
        assert!(text.contains("| 40 ETH | 0 hours 37 minutes | n/a                |\n"));
    }

    #[test]
    fn test_render_preview_lines() {
        let valued = render(
            &snapshot(Some(AmountPreview::Valued {
                amount: dec("250"),
                eth: dec("12.5"),
            })),
            "PAST",
        );
        assert!(valued.contains("- previewRedeem:      12.500 ETH (250 PAST)\n"));

        let invalid = render(
            &snapshot(Some(AmountPreview::Invalid {
                input: "abc".to_string(),
                reason: "bad number".to_string(),
            })),
            "PAST",
        );
        assert!(invalid.contains("- previewRedeem:      error (bad number) (abc PAST)\n"));
        // The rest of the dashboard is unaffected.
        assert!(invalid.contains("- holder:           50.038 ETH"));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&snapshot(None)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["auction_active"], serde_json::json!(true));
        assert_eq!(value["projections"][0]["eta_redeem"]["status"], "already_reached");
        assert_eq!(value["projections"][1]["eta_mint"]["status"], "unavailable");
        assert!(value["preview"].is_null());
    }
}

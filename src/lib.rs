//! Watcher for a decaying-price auction and its reserve-backed token.
//!
//! Each polling cycle reads the strategy and token contracts, converts the
//! raw fixed-point values to economic units and projects when the auction
//! price will cross the configured ETH thresholds under the redeem and mint
//! valuation bases.

pub mod config;
pub mod dashboard;
pub mod engine;
pub mod fixed_point;
pub mod onchain;
pub mod projection;

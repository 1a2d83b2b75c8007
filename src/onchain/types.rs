//! Raw values read from the strategy and token contracts.
//!
//! Everything here is an unconverted on-chain integer. Conversion to
//! economic units happens in the snapshot assembler.

use alloy::primitives::U256;

/// Auction struct as stored by the strategy contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuctionInfo {
    pub active: bool,
    pub auction_id: U256,
    /// Identifier of the item being auctioned.
    pub subject_id: U256,
    /// Unix seconds.
    pub start_time: U256,
}

/// First read batch: auction and token state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainState {
    pub auction: AuctionInfo,
    /// Token base units.
    pub current_price: U256,
    /// Fixed point, scale 1e18.
    pub decay_rate: U256,
    pub decimals: u8,
    pub total_supply: U256,
    pub effective_supply: U256,
    pub locked_supply: U256,
    /// Wei.
    pub reserve: U256,
    /// Wei.
    pub surplus: U256,
}

/// Second read batch: preview outputs for one whole token, in wei.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PreviewQuotes {
    pub redeem: U256,
    pub mint: U256,
}

/// All raw values of one polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawOnChainSnapshot {
    pub auction: AuctionInfo,
    pub current_price: U256,
    pub decay_rate: U256,
    pub decimals: u8,
    pub total_supply: U256,
    pub effective_supply: U256,
    pub locked_supply: U256,
    pub reserve: U256,
    pub surplus: U256,
    /// Argument the previews were called with.
    pub unit_amount: U256,
    pub preview_redeem: U256,
    pub preview_mint: U256,
}

impl RawOnChainSnapshot {
    pub fn from_parts(state: ChainState, unit_amount: U256, quotes: PreviewQuotes) -> Self {
        Self {
            auction: state.auction,
            current_price: state.current_price,
            decay_rate: state.decay_rate,
            decimals: state.decimals,
            total_supply: state.total_supply,
            effective_supply: state.effective_supply,
            locked_supply: state.locked_supply,
            reserve: state.reserve,
            surplus: state.surplus,
            unit_amount,
            preview_redeem: quotes.redeem,
            preview_mint: quotes.mint,
        }
    }

    pub fn previews(&self) -> PreviewQuotes {
        PreviewQuotes {
            redeem: self.preview_redeem,
            mint: self.preview_mint,
        }
    }
}

impl std::fmt::Display for RawOnChainSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Raw(auction={}, active={}, price={}, decay={}, decimals={})",
            self.auction.auction_id,
            self.auction.active,
            self.current_price,
            self.decay_rate,
            self.decimals
        )
    }
}

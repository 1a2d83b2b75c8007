//! Batched contract reads.
//!
//! `OnChainReader` is the capability the refresh cycle depends on. The
//! production implementation, `AlloyReader`, issues each batch as a single
//! Multicall3 `aggregate` over an HTTP provider; tests substitute synthetic
//! readers.

use crate::onchain::abi::{IAuctionStrategy, IReserveToken};
use crate::onchain::types::{AuctionInfo, ChainState, PreviewQuotes};

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use std::future::Future;
use tracing::{debug, info};

/// Source of raw contract state for one polling cycle.
///
/// The token's decimals come from the first batch, and the preview calls
/// take an amount expressed in those decimals, so the two batches are
/// separate round trips.
pub trait OnChainReader {
    /// Auction and token state.
    fn read_state(&self) -> impl Future<Output = anyhow::Result<ChainState>>;

    /// Redeem and mint previews for `unit_amount` token base units.
    fn read_previews(
        &self,
        unit_amount: U256,
    ) -> impl Future<Output = anyhow::Result<PreviewQuotes>>;
}

/// Reads the strategy and token contracts through an alloy provider.
pub struct AlloyReader {
    provider: DynProvider,
    strategy: Address,
    token: Address,
}

impl AlloyReader {
    pub fn new(provider: DynProvider, strategy: Address, token: Address) -> Self {
        Self {
            provider,
            strategy,
            token,
        }
    }

    /// Build an HTTP provider for `rpc_url` and wrap it.
    pub async fn connect(rpc_url: &str, strategy: Address, token: Address) -> anyhow::Result<Self> {
        let provider = ProviderBuilder::new().connect(rpc_url).await?.erased();
        info!(rpc = %rpc_url, strategy = %strategy, token = %token, "RPC provider ready");
        Ok(Self::new(provider, strategy, token))
    }
}

impl OnChainReader for AlloyReader {
    async fn read_state(&self) -> anyhow::Result<ChainState> {
        let strategy = IAuctionStrategy::new(self.strategy, &self.provider);
        let token = IReserveToken::new(self.token, &self.provider);

        let (
            auction,
            current_price,
            decay_rate,
            decimals,
            total_supply,
            effective_supply,
            locked_supply,
            reserve,
            surplus,
        ) = self
            .provider
            .multicall()
            .add(strategy.auction())
            .add(strategy.currentAuctionPrice())
            .add(strategy.AUCTION_DECAY_RATE())
            .add(token.decimals())
            .add(token.totalSupply())
            .add(token.effectiveSupply())
            .add(token.lockedSupply())
            .add(token.reserve())
            .add(token.surplus())
            .aggregate()
            .await?;

        debug!(
            auction_id = %auction.auctionId,
            price = %current_price,
            decay_rate = %decay_rate,
            decimals = decimals,
            "state batch read"
        );

        Ok(ChainState {
            auction: AuctionInfo {
                active: auction.active,
                auction_id: auction.auctionId,
                subject_id: auction.punkId,
                start_time: auction.startTime,
            },
            current_price,
            decay_rate,
            decimals,
            total_supply,
            effective_supply,
            locked_supply,
            reserve,
            surplus,
        })
    }

    async fn read_previews(&self, unit_amount: U256) -> anyhow::Result<PreviewQuotes> {
        let token = IReserveToken::new(self.token, &self.provider);

        let (redeem, mint) = self
            .provider
            .multicall()
            .add(token.previewRedeem(unit_amount))
            .add(token.previewMint(unit_amount))
            .aggregate()
            .await?;

        debug!(amount = %unit_amount, redeem = %redeem, mint = %mint, "preview batch read");
        Ok(PreviewQuotes { redeem, mint })
    }
}

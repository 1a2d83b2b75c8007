//! Contract bindings for the auction strategy and its reserve-backed token.
//!
//! Only the view functions the watcher reads are declared.

use alloy::sol;

sol! {
    /// Decaying-price auction strategy.
    #[sol(rpc)]
    interface IAuctionStrategy {
        /// Public getter for the auction struct.
        function auction() external view returns (bool active, uint256 auctionId, uint256 punkId, uint256 startTime);

        /// Price of the running auction in token base units.
        function currentAuctionPrice() external view returns (uint256);

        /// Per-second continuous decay rate, scaled by 1e18.
        function AUCTION_DECAY_RATE() external view returns (uint256);
    }

    /// Reserve-backed token paid into the auction.
    #[sol(rpc)]
    interface IReserveToken {
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function effectiveSupply() external view returns (uint256);
        function lockedSupply() external view returns (uint256);
        function reserve() external view returns (uint256);
        function surplus() external view returns (uint256);

        /// ETH (wei) received for redeeming `amount` base units.
        function previewRedeem(uint256 amount) external view returns (uint256);

        /// ETH (wei) required to mint `amount` base units.
        function previewMint(uint256 amount) external view returns (uint256);
    }
}

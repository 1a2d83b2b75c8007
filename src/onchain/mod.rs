//! On-chain reads for the auction strategy and its reserve token.
//!
//! Architecture:
//! - `abi`: `sol!` bindings for the view functions we call
//! - `types`: raw integer values exactly as returned by the contracts
//! - `reader`: the `OnChainReader` capability and its Multicall3-backed
//!   implementation over an HTTP RPC endpoint
//!
//! Each polling cycle issues two batches: auction/token state, then the
//! redeem/mint previews for one whole token at the freshly read decimals.

pub mod abi;
pub mod reader;
pub mod types;

pub use reader::{AlloyReader, OnChainReader};
pub use types::{AuctionInfo, ChainState, PreviewQuotes, RawOnChainSnapshot};

//! On-chain access: typed contract handles and the wallet session.
//!
//! Handles are cheap to build and are constructed fresh from a just-resolved
//! [`ChainContext`] for every operation — the context carries the provider
//! and chain id, the accessors only bind an address to an interface.

pub mod abi;
pub mod session;

pub use session::{ChainContext, SessionError, WalletSession};

use abi::{
    BridgeHandle, ConsumerHandle, ICcipBetBridge, IERC20, IFunctionsConsumer, IMarketRegistry,
    IPredictionMarket, MarketHandle, RegistryHandle, TokenHandle,
};
use alloy::primitives::Address;

pub fn registry_at(ctx: &ChainContext, address: Address) -> RegistryHandle {
    IMarketRegistry::new(address, ctx.provider.clone())
}

pub fn market_at(ctx: &ChainContext, address: Address) -> MarketHandle {
    IPredictionMarket::new(address, ctx.provider.clone())
}

pub fn consumer_at(ctx: &ChainContext, address: Address) -> ConsumerHandle {
    IFunctionsConsumer::new(address, ctx.provider.clone())
}

pub fn bridge_at(ctx: &ChainContext, address: Address) -> BridgeHandle {
    ICcipBetBridge::new(address, ctx.provider.clone())
}

pub fn token_at(ctx: &ChainContext, address: Address) -> TokenHandle {
    IERC20::new(address, ctx.provider.clone())
}

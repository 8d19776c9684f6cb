//! Wallet session and per-operation chain context.
//!
//! The signer/provider pair is process-wide state that can be repointed (a
//! different RPC URL, a node that switched networks) between operations.
//! Nothing here caches a resolved context: `WalletSession::resolve` re-reads
//! the chain id from the node every time, so each operation routes against
//! the chain it will actually execute on rather than a stale one.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),
    #[error("invalid wallet private key: {0}")]
    InvalidKey(String),
    #[error("no wallet key configured - set WALLET_PRIVATE_KEY")]
    NoWallet,
    #[error("rpc error: {0}")]
    Rpc(#[from] alloy::transports::TransportError),
}

/// A point-in-time view of the connected chain, resolved per operation.
#[derive(Clone)]
pub struct ChainContext {
    /// Chain id reported by the node at resolve time.
    pub chain_id: u64,
    /// The signing account, when a wallet key is configured.
    pub account: Option<Address>,
    pub provider: DynProvider,
}

impl ChainContext {
    /// The signing account, required for anything that submits a transaction.
    pub fn signer_account(&self) -> Result<Address, SessionError> {
        self.account.ok_or(SessionError::NoWallet)
    }
}

/// Lazily-connecting session over one RPC endpoint.
pub struct WalletSession {
    rpc_url: String,
    signer: Option<PrivateKeySigner>,
}

impl WalletSession {
    pub fn new(rpc_url: String, wallet_key: Option<&str>) -> Result<Self, SessionError> {
        let signer = match wallet_key {
            Some(key) => Some(
                key.trim()
                    .parse::<PrivateKeySigner>()
                    .map_err(|e| SessionError::InvalidKey(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Self { rpc_url, signer })
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Resolve a fresh context: build the provider and re-read the chain id.
    pub async fn resolve(&self) -> Result<ChainContext, SessionError> {
        let url = self
            .rpc_url
            .parse()
            .map_err(|_| SessionError::InvalidRpcUrl(self.rpc_url.clone()))?;

        let (provider, account) = match &self.signer {
            Some(signer) => {
                let wallet = EthereumWallet::from(signer.clone());
                let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);
                (provider.erased(), Some(signer.address()))
            }
            None => {
                let provider = ProviderBuilder::new().connect_http(url);
                (provider.erased(), None)
            }
        };

        let chain_id = provider.get_chain_id().await?;
        debug!(chain_id = chain_id, account = ?account, "resolved chain context");

        Ok(ChainContext {
            chain_id,
            account,
            provider,
        })
    }
}

//! Deployment engine for the prediction-market and CCIP-bridge contracts.
//!
//! The contracts are compiled elsewhere (Foundry); this module loads their
//! artifacts, deploys them as raw create transactions with ABI-encoded
//! constructor args, wires the cross-chain allowlists, and writes timestamped
//! JSON manifests of everything it deployed.

use crate::amount::format_eth;
use crate::config::{ChainSettings, Config, NetworkName};
use crate::onchain::abi::ICcipBetBridge;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolValue;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, info, warn};

/// Contracts this deployer knows how to deploy.
pub const DEPLOYABLE_CONTRACTS: [&str; 2] = ["PredictionMarketExtended", "CCIPBetBridge"];

/// Token bet amount baked into new markets: 0.001 CCIP-BnM.
const TOKEN_BET_AMOUNT_WEI: u64 = 1_000_000_000_000_000;

/// New markets close 24h out and settle an hour after close.
const CLOSE_DELAY_SECS: u64 = 24 * 60 * 60;
const SETTLE_DELAY_SECS: u64 = 60 * 60;

const DEFAULT_QUESTION: &str = "Will Team A beat Team B in the championship?";

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("could not find artifacts for {0} - compile with `forge build` first")]
    ArtifactNotFound(String),
    #[error("artifact for {0} has no bytecode - make sure the contract is compiled")]
    NoBytecode(String),
    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse artifact: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing required env var: {0}")]
    MissingEnv(String),
    #[error("invalid wallet private key: {0}")]
    InvalidKey(String),
    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),
    #[error("no balance on {network} - get test {currency} from a faucet")]
    NoBalance { network: String, currency: String },
    #[error("no valid prediction market addresses found in the environment")]
    NoMarketsConfigured,
    #[error("no bridges were successfully deployed")]
    NoBridgesDeployed,
    #[error("deployment of {0} produced no contract address")]
    NoContractAddress(String),
    #[error("failed to register market: {0}")]
    Registration(String),
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),
    #[error("transaction failed: {0}")]
    Pending(#[from] alloy::providers::PendingTransactionError),
    #[error("rpc error: {0}")]
    Rpc(#[from] alloy::transports::TransportError),
}

// ─── Artifacts ───────────────────────────────────────────────────────────────

pub struct Artifact {
    pub abi: serde_json::Value,
    pub bytecode: Vec<u8>,
}

/// Candidate artifact locations, in lookup order: Foundry `out/` first, then
/// the Hardhat-style layouts.
fn artifact_paths(name: &str) -> [PathBuf; 3] {
    [
        PathBuf::from(format!("out/{name}.sol/{name}.json")),
        PathBuf::from(format!("artifacts/contracts/{name}.sol/{name}.json")),
        PathBuf::from(format!("artifacts/{name}.json")),
    ]
}

pub fn load_artifact(name: &str) -> Result<Artifact, DeployError> {
    for path in artifact_paths(name) {
        if !path.exists() {
            continue;
        }
        let raw = std::fs::read_to_string(&path)?;
        let parsed: serde_json::Value = serde_json::from_str(&raw)?;

        let abi = parsed
            .get("abi")
            .cloned()
            .ok_or_else(|| DeployError::ArtifactNotFound(name.to_string()))?;

        // Foundry nests the hex under bytecode.object; Hardhat inlines it.
        let bytecode_hex = parsed
            .get("bytecode")
            .and_then(|b| b.get("object").or(Some(b)))
            .and_then(|b| b.as_str())
            .unwrap_or_default();
        let bytecode = alloy::hex::decode(bytecode_hex.trim_start_matches("0x"))
            .map_err(|_| DeployError::NoBytecode(name.to_string()))?;

        return Ok(Artifact { abi, bytecode });
    }
    Err(DeployError::ArtifactNotFound(name.to_string()))
}

/// Report which deployable contracts have compiled artifacts on disk.
pub fn check_compiled() -> Vec<(String, bool)> {
    DEPLOYABLE_CONTRACTS
        .iter()
        .map(|name| (name.to_string(), load_artifact(name).is_ok()))
        .collect()
}

// ─── Manifests ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NetworkDeployment {
    pub network: String,
    pub chain_id: u64,
    pub prediction_market: Address,
    pub ccip_bridge: Address,
    pub close_time: u64,
    pub settle_time: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BridgeDeployment {
    pub market_id: u32,
    pub market_env_key: String,
    /// The market on its home chain (Sepolia), even for Fuji-side bridges.
    pub prediction_market: Address,
    /// Bridge address on the network that was deployed to.
    pub ccip_bridge: Address,
    pub network: String,
    pub chain_id: u64,
    pub bridge_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiBridgeManifest {
    pub timestamp: String,
    pub network: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub total_deployed: usize,
    pub deployments: Vec<BridgeDeployment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossChainRoute {
    pub source: Address,
    pub destination: Address,
    pub chain_selector: u64,
    pub prediction_market: Address,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullManifest {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sepolia: NetworkDeployment,
    pub fuji: NetworkDeployment,
    pub cross_chain_config: HashMap<String, CrossChainRoute>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiFullManifest {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sepolia: MultiBridgeManifest,
    pub fuji: MultiBridgeManifest,
    pub cross_chain_config: HashMap<String, CrossChainRoute>,
}

fn write_manifest<T: Serialize>(filename: &str, manifest: &T) -> Result<(), DeployError> {
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(filename, json)?;
    info!(file = filename, "deployment manifest written");
    Ok(())
}

// ─── Deployer ────────────────────────────────────────────────────────────────

pub struct Deployer {
    chain: ChainSettings,
    signer: PrivateKeySigner,
}

impl Deployer {
    pub fn new(chain: &ChainSettings, wallet_key: &str) -> Result<Self, DeployError> {
        let signer = wallet_key
            .trim()
            .parse::<PrivateKeySigner>()
            .map_err(|e| DeployError::InvalidKey(e.to_string()))?;
        Ok(Self {
            chain: chain.clone(),
            signer,
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Connect a signing provider and refuse to proceed on an empty wallet.
    async fn connect(&self) -> Result<DynProvider, DeployError> {
        let url = self
            .chain
            .rpc_url
            .parse()
            .map_err(|_| DeployError::InvalidRpcUrl(self.chain.rpc_url.clone()))?;
        let wallet = EthereumWallet::from(self.signer.clone());
        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url).erased();

        let balance = provider.get_balance(self.signer.address()).await?;
        info!(
            network = %self.chain.name,
            deployer = %self.signer.address(),
            balance = %format!("{} {}", format_eth(balance), self.chain.currency),
            "connected"
        );
        if balance.is_zero() {
            return Err(DeployError::NoBalance {
                network: self.chain.name.clone(),
                currency: self.chain.currency.clone(),
            });
        }
        Ok(provider)
    }

    /// Deploy one contract: creation bytecode plus ABI-encoded constructor
    /// args as a raw create transaction, confirmed before returning.
    async fn deploy_contract(
        &self,
        provider: &DynProvider,
        name: &str,
        constructor_args: &[u8],
    ) -> Result<Address, DeployError> {
        let artifact = load_artifact(name)?;
        if artifact.bytecode.is_empty() {
            return Err(DeployError::NoBytecode(name.to_string()));
        }

        let mut code = artifact.bytecode;
        code.extend_from_slice(constructor_args);

        info!(contract = name, "deploying");
        let pending = provider
            .send_transaction(TransactionRequest::default().with_deploy_code(code))
            .await?;
        info!(tx = %pending.tx_hash(), "waiting for confirmation");

        let receipt = pending.get_receipt().await?;
        let address = receipt
            .contract_address
            .ok_or_else(|| DeployError::NoContractAddress(name.to_string()))?;
        info!(contract = name, address = %address, "deployed");
        Ok(address)
    }

    /// Which source chains a bridge on this network accepts messages from:
    /// the receiver on Sepolia allows Fuji; a Fuji sender allows none.
    fn allowed_source_chains(&self, config: &Config) -> Vec<u64> {
        if self.chain.chain_id == config.sepolia.chain_id {
            vec![config.fuji.ccip_selector]
        } else {
            Vec::new()
        }
    }

    /// Deploy a market plus its bridge on this network, and register the
    /// market when a registry is available (Sepolia only — the functions
    /// consumer is deployed separately and wired in later).
    pub async fn deploy_market_system(
        &self,
        config: &Config,
        question: &str,
        registry: Option<Address>,
    ) -> Result<NetworkDeployment, DeployError> {
        let provider = self.connect().await?;

        let now = Utc::now().timestamp() as u64;
        let close_time = now + CLOSE_DELAY_SECS;
        let settle_time = close_time + SETTLE_DELAY_SECS;

        let market_args = encode_market_args(
            question,
            close_time,
            settle_time,
            self.chain.ccip_bnm,
            U256::from(TOKEN_BET_AMOUNT_WEI),
            true,
        );
        let market = self
            .deploy_contract(&provider, "PredictionMarketExtended", &market_args)
            .await?;

        let bridge_args = encode_bridge_args(
            self.chain.router,
            self.chain.link_token,
            market,
            self.allowed_source_chains(config),
            vec![self.signer.address()],
        );
        let bridge = self
            .deploy_contract(&provider, "CCIPBetBridge", &bridge_args)
            .await?;

        if let Some(registry) = registry {
            let ctx = crate::onchain::ChainContext {
                chain_id: self.chain.chain_id,
                account: Some(self.signer.address()),
                provider: provider.clone(),
            };
            // no functions consumer yet; the registry slot is rewired once
            // one is deployed against this market
            let tx = crate::market::register_market(
                &ctx,
                registry,
                market,
                Address::ZERO,
                question,
                close_time,
                settle_time,
            )
            .await
            .map_err(|e| DeployError::Registration(e.to_string()))?;
            info!(registry = %registry, market = %market, tx = %tx, "market registered");
        }

        info!(network = %self.chain.name, market = %market, bridge = %bridge, "network deployment complete");

        Ok(NetworkDeployment {
            network: self.chain.name.clone(),
            chain_id: self.chain.chain_id,
            prediction_market: market,
            ccip_bridge: bridge,
            close_time,
            settle_time,
        })
    }

    /// Deploy one bridge per configured market address. On Sepolia the market
    /// must already have code; on Fuji the bridges are senders pointed at the
    /// Sepolia markets, so no local code check applies. A single market's
    /// failure skips that market, never the batch.
    pub async fn deploy_multi_bridges(
        &self,
        config: &Config,
        markets: &[EnvMarket],
    ) -> Result<MultiBridgeManifest, DeployError> {
        if markets.is_empty() {
            return Err(DeployError::NoMarketsConfigured);
        }
        let provider = self.connect().await?;
        let is_receiver_side = self.chain.chain_id == config.sepolia.chain_id;
        let allowed_chains = self.allowed_source_chains(config);

        let mut deployments = Vec::new();
        for market in markets {
            if is_receiver_side {
                let code = provider.get_code_at(market.address).await?;
                if code.is_empty() {
                    warn!(market = %market.address, "no contract code on Sepolia, skipping");
                    continue;
                }
            }

            let bridge_args = encode_bridge_args(
                self.chain.router,
                self.chain.link_token,
                market.address,
                allowed_chains.clone(),
                vec![self.signer.address()],
            );
            match self
                .deploy_contract(&provider, "CCIPBetBridge", &bridge_args)
                .await
            {
                Ok(bridge) => {
                    let deployment = BridgeDeployment {
                        market_id: market.id,
                        market_env_key: market.env_key.clone(),
                        prediction_market: market.address,
                        ccip_bridge: bridge,
                        network: self.chain.name.clone(),
                        chain_id: self.chain.chain_id,
                        bridge_type: if is_receiver_side { "receiver" } else { "sender" },
                    };
                    info!(
                        market = %market.env_key,
                        bridge = %bridge,
                        kind = deployment.bridge_type,
                        "bridge deployed"
                    );
                    deployments.push(deployment);
                }
                Err(e) => {
                    error!(market = %market.env_key, error = %e, "bridge deployment failed");
                }
            }
        }

        if deployments.is_empty() {
            return Err(DeployError::NoBridgesDeployed);
        }

        let manifest = MultiBridgeManifest {
            timestamp: Utc::now().to_rfc3339(),
            network: self.chain.name.clone(),
            kind: "multi-ccip-bridges",
            total_deployed: deployments.len(),
            deployments,
        };
        let filename = format!(
            "multi-bridge-deployment-{}-{}.json",
            network_slug(&self.chain),
            Utc::now().timestamp_millis()
        );
        write_manifest(&filename, &manifest)?;
        log_funding_steps(&manifest);
        Ok(manifest)
    }
}

fn network_slug(chain: &ChainSettings) -> String {
    chain
        .name
        .split_whitespace()
        .last()
        .unwrap_or("network")
        .to_lowercase()
}

/// Sender bridges pay CCIP fees in LINK and must be funded before use.
fn log_funding_steps(manifest: &MultiBridgeManifest) {
    for d in &manifest.deployments {
        info!(
            bridge = %d.ccip_bridge,
            market = %d.market_env_key,
            kind = d.bridge_type,
            "next step: fund this bridge with LINK for CCIP fees"
        );
    }
}

// ─── Constructor encoding ────────────────────────────────────────────────────

fn encode_market_args(
    question: &str,
    close_time: u64,
    settle_time: u64,
    bet_token: Address,
    token_bet_amount: U256,
    enable_token_betting: bool,
) -> Vec<u8> {
    (
        question.to_string(),
        U256::from(close_time),
        U256::from(settle_time),
        bet_token,
        token_bet_amount,
        enable_token_betting,
    )
        .abi_encode_params()
}

fn encode_bridge_args(
    router: Address,
    link: Address,
    market: Address,
    allowed_chains: Vec<u64>,
    allowed_senders: Vec<Address>,
) -> Vec<u8> {
    (router, link, market, allowed_chains, allowed_senders).abi_encode_params()
}

// ─── Env-configured markets ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EnvMarket {
    pub id: u32,
    pub env_key: String,
    pub address: Address,
}

/// Markets to bridge, from `PREDICT_MARKET_1..4`. Missing or malformed
/// entries are skipped with a warning.
pub fn markets_from_env() -> Vec<EnvMarket> {
    let mut markets = Vec::new();
    for id in 1u32..=4 {
        let env_key = format!("PREDICT_MARKET_{id}");
        match std::env::var(&env_key) {
            Ok(raw) => match raw.trim().parse::<Address>() {
                Ok(address) => {
                    info!(key = %env_key, address = %address, "found market");
                    markets.push(EnvMarket {
                        id,
                        env_key,
                        address,
                    });
                }
                Err(_) => warn!(key = %env_key, value = %raw, "invalid market address, skipping"),
            },
            Err(_) => warn!(key = %env_key, "not set, skipping"),
        }
    }
    markets
}

// ─── Whole-system flows ──────────────────────────────────────────────────────

fn wallet_key(config: &Config) -> Result<&str, DeployError> {
    config
        .wallet_key
        .as_deref()
        .ok_or_else(|| DeployError::MissingEnv("WALLET_PRIVATE_KEY".to_string()))
}

/// Deploy a market + bridge pair on one network.
pub async fn deploy_network(
    config: &Config,
    network: NetworkName,
) -> Result<NetworkDeployment, DeployError> {
    let key = wallet_key(config)?;
    let deployer = Deployer::new(config.chain(network), key)?;
    let registry = (network == NetworkName::Sepolia).then_some(config.contracts.market_registry);
    deployer
        .deploy_market_system(config, DEFAULT_QUESTION, registry)
        .await
}

/// Deploy the complete system on both chains and pair the bridges.
pub async fn deploy_full_system(config: &Config) -> Result<FullManifest, DeployError> {
    let sepolia = deploy_network(config, NetworkName::Sepolia).await?;
    let fuji = deploy_network(config, NetworkName::Fuji).await?;

    let mut cross_chain_config = HashMap::new();
    cross_chain_config.insert(
        "fuji_to_sepolia".to_string(),
        CrossChainRoute {
            source: fuji.ccip_bridge,
            destination: sepolia.ccip_bridge,
            chain_selector: config.sepolia.ccip_selector,
            prediction_market: sepolia.prediction_market,
        },
    );

    let manifest = FullManifest {
        timestamp: Utc::now().to_rfc3339(),
        kind: "full-ccip-system",
        sepolia,
        fuji,
        cross_chain_config,
    };
    let filename = format!("deployment-{}.json", Utc::now().timestamp_millis());
    write_manifest(&filename, &manifest)?;
    Ok(manifest)
}

/// Deploy bridges for every env-configured market on one network.
pub async fn deploy_multi_bridges(
    config: &Config,
    network: NetworkName,
) -> Result<MultiBridgeManifest, DeployError> {
    let key = wallet_key(config)?;
    let deployer = Deployer::new(config.chain(network), key)?;
    let markets = markets_from_env();
    deployer.deploy_multi_bridges(config, &markets).await
}

/// Deploy bridges for every env-configured market on both networks, then
/// pair each market's sender and receiver into a cross-chain route.
pub async fn deploy_full_multi(config: &Config) -> Result<MultiFullManifest, DeployError> {
    let sepolia = deploy_multi_bridges(config, NetworkName::Sepolia).await?;
    let fuji = deploy_multi_bridges(config, NetworkName::Fuji).await?;

    let cross_chain_config = pair_bridges(&sepolia, &fuji, config.sepolia.ccip_selector);

    let manifest = MultiFullManifest {
        timestamp: Utc::now().to_rfc3339(),
        kind: "full-multi-ccip-system",
        sepolia,
        fuji,
        cross_chain_config,
    };
    let filename = format!(
        "full-multi-bridge-deployment-{}.json",
        Utc::now().timestamp_millis()
    );
    write_manifest(&filename, &manifest)?;
    Ok(manifest)
}

/// Pair sender and receiver bridges by market id. Markets that only
/// deployed on one side are left out of the routing table.
fn pair_bridges(
    sepolia: &MultiBridgeManifest,
    fuji: &MultiBridgeManifest,
    sepolia_selector: u64,
) -> HashMap<String, CrossChainRoute> {
    let mut routes = HashMap::new();
    for receiver in &sepolia.deployments {
        let Some(sender) = fuji
            .deployments
            .iter()
            .find(|d| d.market_id == receiver.market_id)
        else {
            continue;
        };
        routes.insert(
            format!("market_{}_fuji_to_sepolia", receiver.market_id),
            CrossChainRoute {
                source: sender.ccip_bridge,
                destination: receiver.ccip_bridge,
                chain_selector: sepolia_selector,
                prediction_market: receiver.prediction_market,
            },
        );
    }
    routes
}

// ─── Verification ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub market_deployed: bool,
    pub bridge_deployed: bool,
    /// Whether the peer chain is allowlisted; only checked on the receiver.
    pub source_chain_allowed: Option<bool>,
    /// Whether the bridge points at the expected market.
    pub market_wired: bool,
}

/// Re-read a deployment: code presence, the receiver's source-chain
/// allowlist, and the bridge's market wiring.
pub async fn verify_deployment(
    config: &Config,
    network: NetworkName,
    market: Address,
    bridge: Address,
) -> Result<VerifyReport, DeployError> {
    let chain = config.chain(network);
    let url = chain
        .rpc_url
        .parse()
        .map_err(|_| DeployError::InvalidRpcUrl(chain.rpc_url.clone()))?;
    let provider = ProviderBuilder::new().connect_http(url).erased();

    let market_code = provider.get_code_at(market).await?;
    let bridge_code = provider.get_code_at(bridge).await?;

    let bridge_contract = ICcipBetBridge::new(bridge, provider.clone());

    let source_chain_allowed = if network == NetworkName::Sepolia {
        Some(
            bridge_contract
                .allowlistedSourceChains(config.fuji.ccip_selector)
                .call()
                .await?,
        )
    } else {
        None
    };

    let wired_market = bridge_contract.predictionMarket().call().await?;

    let report = VerifyReport {
        market_deployed: !market_code.is_empty(),
        bridge_deployed: !bridge_code.is_empty(),
        source_chain_allowed,
        market_wired: wired_market == market,
    };
    info!(
        network = %chain.name,
        market_deployed = report.market_deployed,
        bridge_deployed = report.bridge_deployed,
        source_chain_allowed = ?report.source_chain_allowed,
        market_wired = report.market_wired,
        "verification complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_artifact_lookup_order() {
        let paths = artifact_paths("CCIPBetBridge");
        assert_eq!(
            paths[0],
            PathBuf::from("out/CCIPBetBridge.sol/CCIPBetBridge.json")
        );
        assert_eq!(
            paths[1],
            PathBuf::from("artifacts/contracts/CCIPBetBridge.sol/CCIPBetBridge.json")
        );
        assert_eq!(paths[2], PathBuf::from("artifacts/CCIPBetBridge.json"));
    }

    #[test]
    fn test_market_constructor_encoding() {
        let args = encode_market_args(
            "Will it rain?",
            1_700_000_000,
            1_700_003_600,
            address!("D21341536c5cF5EB1bcb58f6723cE26e8D8E90e4"),
            U256::from(TOKEN_BET_AMOUNT_WEI),
            true,
        );
        // six head slots, then the string tail
        assert!(args.len() > 6 * 32);
        assert_eq!(args.len() % 32, 0);
        // first head slot is the offset to the dynamic string: 0xc0
        assert_eq!(args[31], 0xc0);
        assert!(args[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_bridge_constructor_encoding() {
        let args = encode_bridge_args(
            address!("F694E193200268f9a4868e4Aa017A0118C9a8177"),
            address!("0b9d5D9136855f6FEc3c0993feE6E9CE8a297846"),
            address!("ABc561948eFE3e0E37D28B483a5B9d1EbC8f0899"),
            vec![16_015_286_601_757_825_753],
            vec![Address::ZERO],
        );
        // five head slots plus two dynamic arrays of one element each
        assert_eq!(args.len(), 5 * 32 + 2 * (2 * 32));
    }

    #[test]
    fn test_pair_bridges_skips_unmatched_markets() {
        let receiver = |id| BridgeDeployment {
            market_id: id,
            market_env_key: format!("PREDICT_MARKET_{id}"),
            prediction_market: address!("ABc561948eFE3e0E37D28B483a5B9d1EbC8f0899"),
            ccip_bridge: address!("d0825e9db3BBb1Fd142C5cFCEE5b362F043f6260"),
            network: "Sepolia".to_string(),
            chain_id: 11_155_111,
            bridge_type: "receiver",
        };
        let sender = |id| BridgeDeployment {
            market_id: id,
            market_env_key: format!("PREDICT_MARKET_{id}"),
            prediction_market: address!("ABc561948eFE3e0E37D28B483a5B9d1EbC8f0899"),
            ccip_bridge: address!("d716B3F4B000c4Dc8Adb5Da8491a32A99c97108A"),
            network: "Avalanche Fuji".to_string(),
            chain_id: 43_113,
            bridge_type: "sender",
        };
        let sepolia = MultiBridgeManifest {
            timestamp: "t".to_string(),
            network: "Sepolia".to_string(),
            kind: "multi-ccip-bridges",
            total_deployed: 2,
            deployments: vec![receiver(1), receiver(2)],
        };
        let fuji = MultiBridgeManifest {
            timestamp: "t".to_string(),
            network: "Avalanche Fuji".to_string(),
            kind: "multi-ccip-bridges",
            total_deployed: 1,
            deployments: vec![sender(2)],
        };

        let routes = pair_bridges(&sepolia, &fuji, 16_015_286_601_757_825_753);
        assert_eq!(routes.len(), 1);
        let route = routes.get("market_2_fuji_to_sepolia").unwrap();
        assert_eq!(route.source, sender(2).ccip_bridge);
        assert_eq!(route.destination, receiver(2).ccip_bridge);
    }

    #[test]
    fn test_markets_from_env_skips_invalid() {
        std::env::set_var(
            "PREDICT_MARKET_1",
            "0xABc561948eFE3e0E37D28B483a5B9d1EbC8f0899",
        );
        std::env::set_var("PREDICT_MARKET_2", "not-an-address");
        std::env::remove_var("PREDICT_MARKET_3");
        std::env::remove_var("PREDICT_MARKET_4");

        let markets = markets_from_env();
        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0].id, 1);
        assert_eq!(markets[0].env_key, "PREDICT_MARKET_1");

        std::env::remove_var("PREDICT_MARKET_1");
        std::env::remove_var("PREDICT_MARKET_2");
    }

    #[test]
    fn test_network_slug() {
        let sepolia = crate::config::Config::from_env().unwrap().sepolia;
        assert_eq!(network_slug(&sepolia), "sepolia");
        let fuji = crate::config::Config::from_env().unwrap().fuji;
        assert_eq!(network_slug(&fuji), "fuji");
    }
}

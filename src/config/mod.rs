use alloy::primitives::{address, Address};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown network name: {0}")]
    UnknownNetwork(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Which network the dashboard session targets by default.
    #[serde(default)]
    pub network: NetworkName,
    #[serde(default = "default_sepolia")]
    pub sepolia: ChainSettings,
    #[serde(default = "default_fuji")]
    pub fuji: ChainSettings,
    #[serde(default)]
    pub contracts: ContractsConfig,
    #[serde(default)]
    pub chainlink: ChainlinkConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub bridges: BridgeTable,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Wallet private key - loaded from env WALLET_PRIVATE_KEY, never from file.
    #[serde(skip)]
    pub wallet_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkName {
    Sepolia,
    Fuji,
}

impl Default for NetworkName {
    fn default() -> Self {
        NetworkName::Sepolia
    }
}

impl FromStr for NetworkName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sepolia" => Ok(NetworkName::Sepolia),
            "fuji" => Ok(NetworkName::Fuji),
            other => Err(ConfigError::UnknownNetwork(other.to_string())),
        }
    }
}

impl std::fmt::Display for NetworkName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkName::Sepolia => write!(f, "sepolia"),
            NetworkName::Fuji => write!(f, "fuji"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainSettings {
    pub chain_id: u64,
    pub name: String,
    /// Native currency symbol (gas + direct bets).
    pub currency: String,
    pub rpc_url: String,
    /// CCIP chain selector for this network.
    pub ccip_selector: u64,
    /// CCIP router contract.
    pub router: Address,
    /// LINK token used for CCIP fees.
    pub link_token: Address,
    /// CCIP-BnM test token (the bridge-chain bet asset).
    pub ccip_bnm: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
    /// Market registry on the direct chain.
    #[serde(default = "default_registry")]
    pub market_registry: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainlinkConfig {
    /// Chainlink Functions subscription (from functions.chain.link).
    #[serde(default = "default_subscription_id")]
    pub subscription_id: u64,
    /// Callback gas limit for requestOdds.
    #[serde(default = "default_functions_gas_limit")]
    pub functions_gas_limit: u32,
    /// Gas limit for the CCIP receive leg.
    #[serde(default = "default_ccip_gas_limit")]
    pub ccip_gas_limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Dashboard auto-refresh interval in milliseconds.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    /// Odds poll tick interval in milliseconds.
    #[serde(default = "default_odds_poll_interval_ms")]
    pub odds_poll_interval_ms: u64,
    /// Odds poll attempt cap.
    #[serde(default = "default_max_polling_attempts")]
    pub max_polling_attempts: u32,
    /// Listing stats refresh interval in milliseconds.
    #[serde(default = "default_stats_refresh_ms")]
    pub stats_refresh_ms: u64,
}

/// Static per-market CCIP routing: which sender bridge on the bridge chain
/// pairs with which receiver bridge on the market's home chain.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeTable {
    #[serde(default = "default_bridge_routes")]
    pub routes: HashMap<Address, BridgeRoute>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BridgeRoute {
    /// Sender-side bridge deployed on Fuji.
    pub fuji_bridge: Address,
    /// Receiver-side bridge deployed on Sepolia.
    pub sepolia_receiver: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_sepolia() -> ChainSettings {
    ChainSettings {
        chain_id: 11_155_111,
        name: "Sepolia".to_string(),
        currency: "ETH".to_string(),
        rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
        ccip_selector: 16_015_286_601_757_825_753,
        router: address!("0BF3dE8c5D3e8A2B34D2BEeB17ABfCeBaf363A59"),
        link_token: address!("779877A7B0D9E8603169DdbD7836e478b4624789"),
        ccip_bnm: address!("Fd57b4ddBf88a4e07fF4e34C487b99af2Fe82a05"),
    }
}

fn default_fuji() -> ChainSettings {
    ChainSettings {
        chain_id: 43_113,
        name: "Avalanche Fuji".to_string(),
        currency: "AVAX".to_string(),
        rpc_url: "https://api.avax-test.network/ext/bc/C/rpc".to_string(),
        ccip_selector: 14_767_482_510_784_806_043,
        router: address!("F694E193200268f9a4868e4Aa017A0118C9a8177"),
        link_token: address!("0b9d5D9136855f6FEc3c0993feE6E9CE8a297846"),
        ccip_bnm: address!("D21341536c5cF5EB1bcb58f6723cE26e8D8E90e4"),
    }
}

fn default_registry() -> Address {
    address!("2FeAFA8823B542928fd90eb4534C7EE27946B758")
}

fn default_subscription_id() -> u64 {
    4922
}
fn default_functions_gas_limit() -> u32 {
    300_000
}
fn default_ccip_gas_limit() -> u64 {
    900_000
}
fn default_refresh_interval_ms() -> u64 {
    10_000
}
fn default_odds_poll_interval_ms() -> u64 {
    5_000
}
fn default_max_polling_attempts() -> u32 {
    12
}
fn default_stats_refresh_ms() -> u64 {
    30_000
}
fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

fn default_bridge_routes() -> HashMap<Address, BridgeRoute> {
    HashMap::from([
        (
            address!("ABc561948eFE3e0E37D28B483a5B9d1EbC8f0899"),
            BridgeRoute {
                fuji_bridge: address!("d716B3F4B000c4Dc8Adb5Da8491a32A99c97108A"),
                sepolia_receiver: address!("d0825e9db3BBb1Fd142C5cFCEE5b362F043f6260"),
            },
        ),
        (
            address!("252CA7101A32619CE922455f0a84AFdDE41F0843"),
            BridgeRoute {
                fuji_bridge: address!("44C3A367124DEAC71CaeB5c583bd3525A65A4BB0"),
                sepolia_receiver: address!("87EE37a5D3D266Ab6391FA95f1aCd3E532201412"),
            },
        ),
        (
            address!("119bdDbEb434447A0045966F23364E53EbE45270"),
            BridgeRoute {
                fuji_bridge: address!("c5DeC4B6E97f5A6Ce3451E62a3BC7126322AF8AF"),
                sepolia_receiver: address!("33C3b22998f74B1AA9ba016389D24cA6E6f437F3"),
            },
        ),
        (
            address!("CB287A95e48D651Ee5793E02A6923502B34cA7e6"),
            BridgeRoute {
                fuji_bridge: address!("239Ba0fc64B183E0b3cbaccBC4689E31F0001771"),
                sepolia_receiver: address!("02109d94B50662710f1DB07fB27A4D5BfD68b84d"),
            },
        ),
    ])
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            market_registry: default_registry(),
        }
    }
}

impl Default for ChainlinkConfig {
    fn default() -> Self {
        Self {
            subscription_id: default_subscription_id(),
            functions_gas_limit: default_functions_gas_limit(),
            ccip_gas_limit: default_ccip_gas_limit(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            odds_poll_interval_ms: default_odds_poll_interval_ms(),
            max_polling_attempts: default_max_polling_attempts(),
            stats_refresh_ms: default_stats_refresh_ms(),
        }
    }
}

impl Default for BridgeTable {
    fn default() -> Self {
        Self {
            routes: default_bridge_routes(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load config from a TOML file, then overlay environment variables for
    /// secrets and RPC URLs.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.apply_env();
        Ok(config)
    }

    /// Default config with env-only overrides (no file needed).
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config {
            network: NetworkName::default(),
            sepolia: default_sepolia(),
            fuji: default_fuji(),
            contracts: ContractsConfig::default(),
            chainlink: ChainlinkConfig::default(),
            polling: PollingConfig::default(),
            bridges: BridgeTable::default(),
            dashboard: DashboardConfig::default(),
            logging: LoggingConfig::default(),
            wallet_key: None,
        };
        config.apply_env();
        if let Ok(name) = std::env::var("CROSSBET_NETWORK") {
            config.network = name.parse()?;
        }
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SEPOLIA_RPC_URL") {
            self.sepolia.rpc_url = url;
        }
        if let Ok(url) = std::env::var("FUJI_RPC_URL") {
            self.fuji.rpc_url = url;
        }
        if let Ok(key) = std::env::var("WALLET_PRIVATE_KEY") {
            if !key.is_empty() {
                self.wallet_key = Some(key);
            }
        }
    }

    pub fn chain(&self, network: NetworkName) -> &ChainSettings {
        match network {
            NetworkName::Sepolia => &self.sepolia,
            NetworkName::Fuji => &self.fuji,
        }
    }

    /// The chain the current session targets.
    pub fn active_chain(&self) -> &ChainSettings {
        self.chain(self.network)
    }

    /// CCIP route for a market, if one is configured.
    pub fn bridge_route(&self, market: Address) -> Option<BridgeRoute> {
        self.bridges.routes.get(&market).copied()
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment_constants() {
        let config = Config {
            network: NetworkName::default(),
            sepolia: default_sepolia(),
            fuji: default_fuji(),
            contracts: ContractsConfig::default(),
            chainlink: ChainlinkConfig::default(),
            polling: PollingConfig::default(),
            bridges: BridgeTable::default(),
            dashboard: DashboardConfig::default(),
            logging: LoggingConfig::default(),
            wallet_key: None,
        };
        assert_eq!(config.sepolia.chain_id, 11_155_111);
        assert_eq!(config.fuji.chain_id, 43_113);
        assert_eq!(config.sepolia.ccip_selector, 16_015_286_601_757_825_753);
        assert_eq!(config.fuji.ccip_selector, 14_767_482_510_784_806_043);
        assert_eq!(config.chainlink.subscription_id, 4922);
        assert_eq!(config.chainlink.functions_gas_limit, 300_000);
        assert_eq!(config.polling.max_polling_attempts, 12);
        assert_eq!(config.bridges.routes.len(), 4);
    }

    #[test]
    fn test_bridge_route_lookup() {
        let table = BridgeTable::default();
        let market = address!("ABc561948eFE3e0E37D28B483a5B9d1EbC8f0899");
        let route = table.routes.get(&market).expect("route for market 1");
        assert_eq!(
            route.sepolia_receiver,
            address!("d0825e9db3BBb1Fd142C5cFCEE5b362F043f6260")
        );
        assert!(!table
            .routes
            .contains_key(&address!("0000000000000000000000000000000000000001")));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let parsed: Config = toml::from_str("network = \"fuji\"\n").unwrap();
        assert_eq!(parsed.network, NetworkName::Fuji);
        assert_eq!(parsed.active_chain().chain_id, 43_113);
        assert_eq!(parsed.polling.refresh_interval_ms, 10_000);
    }
}

//! Chain classification: which bet path a connected network takes.
//!
//! Sepolia is the market's home chain — bets are paid in native ETH straight
//! into the market contract. Fuji has no market contracts; bets there are paid
//! in CCIP-BnM and relayed to Sepolia through the CCIP bridge.

use rust_decimal::Decimal;

pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;
pub const FUJI_CHAIN_ID: u64 = 43_113;

/// How bets reach the market contract from a given network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainRole {
    /// Native-currency bets paid directly into the market contract.
    Direct,
    /// Token bets routed through the cross-chain bridge.
    Bridge,
}

/// Classify a chain id. Returns `None` for any network the dispatcher does
/// not support; callers must fail before issuing any read in that case.
pub fn classify(chain_id: u64) -> Option<ChainRole> {
    match chain_id {
        SEPOLIA_CHAIN_ID => Some(ChainRole::Direct),
        FUJI_CHAIN_ID => Some(ChainRole::Bridge),
        _ => None,
    }
}

pub fn is_direct_chain(chain_id: u64) -> bool {
    chain_id == SEPOLIA_CHAIN_ID
}

pub fn is_bridge_chain(chain_id: u64) -> bool {
    chain_id == FUJI_CHAIN_ID
}

impl ChainRole {
    pub fn network_name(self) -> &'static str {
        match self {
            ChainRole::Direct => "Sepolia",
            ChainRole::Bridge => "Avalanche Fuji",
        }
    }

    /// The asset bets are denominated in on this chain.
    pub fn bet_currency(self) -> &'static str {
        match self {
            ChainRole::Direct => "ETH",
            ChainRole::Bridge => "CCIP-BnM",
        }
    }

    /// Minimum accepted bet, in whole units of the bet currency.
    pub fn minimum_bet(self) -> Decimal {
        match self {
            // 0.01 ETH
            ChainRole::Direct => Decimal::new(1, 2),
            // 0.001 CCIP-BnM
            ChainRole::Bridge => Decimal::new(1, 3),
        }
    }
}

impl std::fmt::Display for ChainRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainRole::Direct => write!(f, "direct"),
            ChainRole::Bridge => write!(f, "bridge"),
        }
    }
}

/// Currency symbol for a chain id, `"Unknown"` when unsupported.
pub fn chain_currency(chain_id: u64) -> &'static str {
    match classify(chain_id) {
        Some(role) => role.bet_currency(),
        None => "Unknown",
    }
}

/// Amount with the chain's bet currency appended, e.g. `"0.5 ETH"`.
/// Unsupported chains get the bare amount back.
pub fn format_bet_amount(amount: &str, chain_id: u64) -> String {
    match classify(chain_id) {
        Some(role) => format!("{} {}", amount, role.bet_currency()),
        None => amount.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_classify_known_chains() {
        assert_eq!(classify(SEPOLIA_CHAIN_ID), Some(ChainRole::Direct));
        assert_eq!(classify(FUJI_CHAIN_ID), Some(ChainRole::Bridge));
    }

    #[test]
    fn test_classify_rejects_everything_else() {
        for id in [0u64, 1, 137, 43_114, 11_155_112, u64::MAX] {
            assert_eq!(classify(id), None, "chain {id} should be unsupported");
        }
    }

    #[test]
    fn test_minimums() {
        assert_eq!(
            ChainRole::Direct.minimum_bet(),
            Decimal::from_str("0.01").unwrap()
        );
        assert_eq!(
            ChainRole::Bridge.minimum_bet(),
            Decimal::from_str("0.001").unwrap()
        );
    }

    #[test]
    fn test_bet_amount_formatting() {
        assert_eq!(format_bet_amount("0.5", SEPOLIA_CHAIN_ID), "0.5 ETH");
        assert_eq!(format_bet_amount("0.5", FUJI_CHAIN_ID), "0.5 CCIP-BnM");
        assert_eq!(format_bet_amount("0.5", 1), "0.5");
        assert_eq!(chain_currency(1), "Unknown");
    }
}

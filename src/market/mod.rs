//! Market reads: registry listing, per-market snapshots, and the per-user
//! bet list.
//!
//! A snapshot is fetched as one all-or-nothing unit — every required read is
//! issued concurrently and a single failure fails the whole fetch, so callers
//! keep rendering their previous snapshot instead of a half-updated one.
//! The listing path is the opposite: per-market stat failures degrade to a
//! missing entry so one broken market cannot blank the list.

use crate::amount::format_eth;
use crate::onchain::abi::{IMarketRegistry, IPredictionMarket};
use crate::onchain::{market_at, registry_at, ChainContext};
use alloy::primitives::{Address, B256, U256};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarketStatus {
    Open,
    Closed,
    Settled,
}

impl MarketStatus {
    /// Contract enum ordinal → status. The contract only ever reports 0..=2.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => MarketStatus::Closed,
            2 => MarketStatus::Settled,
            _ => MarketStatus::Open,
        }
    }
}

impl std::fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketStatus::Open => write!(f, "Open"),
            MarketStatus::Closed => write!(f, "Closed"),
            MarketStatus::Settled => write!(f, "Settled"),
        }
    }
}

/// Point-in-time aggregated read of a market's public state.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub address: Address,
    pub question: String,
    pub odds_yes: u64,
    pub odds_no: u64,
    pub status: MarketStatus,
    pub result: bool,
    pub close_time_ms: u64,
    pub settle_time_ms: u64,
    pub close_remaining_ms: u64,
    pub settle_remaining_ms: u64,
    pub total_yes_native: String,
    pub total_no_native: String,
    pub total_yes_token: String,
    pub total_no_token: String,
    pub total_native: String,
    pub total_token: String,
    pub token_betting_enabled: bool,
    pub bet_token: Option<Address>,
}

/// One entry of the user's on-chain bet array.
#[derive(Debug, Clone, Serialize)]
pub struct UserBet {
    pub index: usize,
    pub amount: String,
    pub prediction: bool,
    pub claimed: bool,
    pub is_token: bool,
    pub asset: &'static str,
}

/// A market as registered in the on-chain registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryEntry {
    pub address: Address,
    pub functions_consumer: Address,
    pub question: String,
    pub close_time_ms: u64,
    pub settle_time_ms: u64,
    pub created_at_ms: u64,
    pub creator: Address,
    pub is_active: bool,
}

/// Per-market summary for the listing view.
#[derive(Debug, Clone, Serialize)]
pub struct MarketStats {
    pub address: Address,
    pub question: String,
    pub status: MarketStatus,
    pub odds_yes: u64,
    pub odds_no: u64,
    pub total_yes_native: String,
    pub total_no_native: String,
    pub total_yes_token: String,
    pub total_no_token: String,
    pub total_native_pool: String,
    pub total_token_pool: String,
    /// Native + token pools combined, display only.
    pub total_pool: String,
    pub close_remaining_ms: u64,
    pub settle_remaining_ms: u64,
    pub token_betting_enabled: bool,
}

/// Listing view state: every registered market, plus whatever stats could be
/// fetched. A market missing from `stats` is still loading (or its reads are
/// failing) — it is never dropped from `markets`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    pub markets: Vec<RegistryEntry>,
    pub stats: HashMap<Address, MarketStats>,
}

fn to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn epoch_secs_to_ms(value: U256) -> u64 {
    to_u64(value).saturating_mul(1000)
}

/// The contract reports the zero address when no bet token is configured.
fn normalize_bet_token(address: Address) -> Option<Address> {
    (address != Address::ZERO).then_some(address)
}

fn user_bet_from(index: usize, bet: &IPredictionMarket::Bet) -> UserBet {
    UserBet {
        index,
        amount: format_eth(bet.amount),
        prediction: bet.prediction,
        claimed: bet.claimed,
        is_token: bet.isToken,
        asset: if bet.isToken { "CCIP-BnM" } else { "ETH" },
    }
}

fn registry_entry_from(info: &IMarketRegistry::MarketInfo) -> RegistryEntry {
    RegistryEntry {
        address: info.marketAddress,
        functions_consumer: info.functionsConsumer,
        question: info.question.clone(),
        close_time_ms: epoch_secs_to_ms(info.closeTime),
        settle_time_ms: epoch_secs_to_ms(info.settleTime),
        created_at_ms: epoch_secs_to_ms(info.createdAt),
        creator: info.creator,
        is_active: info.isActive,
    }
}

/// Fetch a full market snapshot plus the given account's bet list.
///
/// All required reads run concurrently; any failure fails the whole fetch.
/// Two deliberate exceptions mirror the contracts' behaviour: `result()`
/// reverts before settlement and defaults to `false`, and a failing
/// `getUserBets` degrades to an empty list so the snapshot itself survives.
pub async fn fetch_market_data(
    ctx: &ChainContext,
    market_address: Address,
    account: Option<Address>,
) -> anyhow::Result<(MarketSnapshot, Vec<UserBet>)> {
    let market = market_at(ctx, market_address);

    let (question, odds_yes, odds_no, status, times, remaining, pools, token_betting, bet_token) =
        tokio::try_join!(
            async { market.question().call().await },
            async { market.oddsYes().call().await },
            async { market.oddsNo().call().await },
            async { market.status().call().await },
            async { market.getMarketTimes().call().await },
            async { market.getTimeRemaining().call().await },
            async { market.getPoolTotals().call().await },
            async { market.tokenBettingEnabled().call().await },
            async { market.betToken().call().await },
        )?;

    let result = market.result().call().await.unwrap_or(false);

    let snapshot = MarketSnapshot {
        address: market_address,
        question,
        odds_yes: to_u64(odds_yes),
        odds_no: to_u64(odds_no),
        status: MarketStatus::from_u8(status),
        result,
        close_time_ms: epoch_secs_to_ms(times.closeTime),
        settle_time_ms: epoch_secs_to_ms(times.settleTime),
        close_remaining_ms: epoch_secs_to_ms(remaining.untilClose),
        settle_remaining_ms: epoch_secs_to_ms(remaining.untilSettle),
        total_yes_native: format_eth(pools.ethYes),
        total_no_native: format_eth(pools.ethNo),
        total_yes_token: format_eth(pools.tokenYes),
        total_no_token: format_eth(pools.tokenNo),
        total_native: format_eth(pools.totalEth),
        total_token: format_eth(pools.totalToken),
        token_betting_enabled: token_betting,
        bet_token: normalize_bet_token(bet_token),
    };

    let user_bets = match account {
        Some(account) => match market.getUserBets(account).call().await {
            Ok(bets) => bets
                .iter()
                .enumerate()
                .map(|(index, bet)| user_bet_from(index, bet))
                .collect(),
            Err(e) => {
                warn!(market = %market_address, error = %e, "failed to fetch user bets");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    debug!(
        market = %market_address,
        status = %snapshot.status,
        bets = user_bets.len(),
        "fetched market snapshot"
    );

    Ok((snapshot, user_bets))
}

/// Fetch the active-market list from the registry.
pub async fn fetch_active_markets(
    ctx: &ChainContext,
    registry_address: Address,
) -> anyhow::Result<Vec<RegistryEntry>> {
    let registry = registry_at(ctx, registry_address);
    let markets = registry.getActiveMarkets().call().await?;
    Ok(markets.iter().map(registry_entry_from).collect())
}

/// Fetch every market known to the registry, active or not.
pub async fn fetch_all_markets(
    ctx: &ChainContext,
    registry_address: Address,
) -> anyhow::Result<Vec<RegistryEntry>> {
    let registry = registry_at(ctx, registry_address);
    let markets = registry.getAllMarkets().call().await?;
    Ok(markets.iter().map(registry_entry_from).collect())
}

/// Register a deployed market with the registry.
pub async fn register_market(
    ctx: &ChainContext,
    registry_address: Address,
    market: Address,
    functions_consumer: Address,
    question: &str,
    close_time_secs: u64,
    settle_time_secs: u64,
) -> anyhow::Result<B256> {
    let registry = registry_at(ctx, registry_address);
    let receipt = registry
        .registerMarket(
            market,
            functions_consumer,
            question.to_string(),
            U256::from(close_time_secs),
            U256::from(settle_time_secs),
        )
        .send()
        .await?
        .get_receipt()
        .await?;
    Ok(receipt.transaction_hash)
}

/// Fetch the listing-view summary for one market. All reads concurrent,
/// all-or-nothing; the caller decides how a failure degrades.
pub async fn fetch_market_stats(
    ctx: &ChainContext,
    market_address: Address,
) -> anyhow::Result<MarketStats> {
    let market = market_at(ctx, market_address);

    let (question, status, odds_yes, odds_no, remaining, pools, token_betting) = tokio::try_join!(
        async { market.question().call().await },
        async { market.status().call().await },
        async { market.oddsYes().call().await },
        async { market.oddsNo().call().await },
        async { market.getTimeRemaining().call().await },
        async { market.getPoolTotals().call().await },
        async { market.tokenBettingEnabled().call().await },
    )?;

    let total_native_pool = format_eth(pools.totalEth);
    let total_token_pool = format_eth(pools.totalToken);

    Ok(MarketStats {
        address: market_address,
        question,
        status: MarketStatus::from_u8(status),
        odds_yes: to_u64(odds_yes),
        odds_no: to_u64(odds_no),
        total_yes_native: format_eth(pools.ethYes),
        total_no_native: format_eth(pools.ethNo),
        total_yes_token: format_eth(pools.tokenYes),
        total_no_token: format_eth(pools.tokenNo),
        total_pool: combined_pool(&total_native_pool, &total_token_pool),
        total_native_pool,
        total_token_pool,
        close_remaining_ms: epoch_secs_to_ms(remaining.untilClose),
        settle_remaining_ms: epoch_secs_to_ms(remaining.untilSettle),
        token_betting_enabled: token_betting,
    })
}

/// Native + token pool display totals combined into one figure.
fn combined_pool(native: &str, token: &str) -> String {
    let native = Decimal::from_str(native).unwrap_or_default();
    let token = Decimal::from_str(token).unwrap_or_default();
    format!("{:.4}", native + token)
}

/// Fetch registry entries and all per-market stats in parallel. One market's
/// stats failing yields a missing map entry, never a failed batch.
pub async fn fetch_listing(
    ctx: &ChainContext,
    registry_address: Address,
) -> anyhow::Result<Listing> {
    let markets = fetch_active_markets(ctx, registry_address).await?;

    let fetched = join_all(
        markets
            .iter()
            .map(|entry| fetch_market_stats(ctx, entry.address)),
    )
    .await;

    let fetched: Vec<Option<MarketStats>> = markets
        .iter()
        .zip(fetched)
        .map(|(entry, result)| match result {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(market = %entry.address, error = %e, "failed to fetch market stats");
                None
            }
        })
        .collect();

    let stats = merge_stats(&markets, fetched);
    Ok(Listing { markets, stats })
}

/// Merge fetched stats into the per-address map, dropping failed fetches.
fn merge_stats(
    markets: &[RegistryEntry],
    fetched: Vec<Option<MarketStats>>,
) -> HashMap<Address, MarketStats> {
    markets
        .iter()
        .zip(fetched)
        .filter_map(|(entry, stats)| stats.map(|s| (entry.address, s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn entry(addr: Address) -> RegistryEntry {
        RegistryEntry {
            address: addr,
            functions_consumer: Address::ZERO,
            question: "Will it rain?".to_string(),
            close_time_ms: 1_700_000_000_000,
            settle_time_ms: 1_700_003_600_000,
            created_at_ms: 1_699_000_000_000,
            creator: Address::ZERO,
            is_active: true,
        }
    }

    fn stats(addr: Address) -> MarketStats {
        MarketStats {
            address: addr,
            question: "Will it rain?".to_string(),
            status: MarketStatus::Open,
            odds_yes: 60,
            odds_no: 40,
            total_yes_native: "1.0000".to_string(),
            total_no_native: "0.5000".to_string(),
            total_yes_token: "0.0000".to_string(),
            total_no_token: "0.0000".to_string(),
            total_native_pool: "1.5000".to_string(),
            total_token_pool: "0.0000".to_string(),
            total_pool: "1.5000".to_string(),
            close_remaining_ms: 60_000,
            settle_remaining_ms: 120_000,
            token_betting_enabled: false,
        }
    }

    #[test]
    fn test_status_ordinals() {
        assert_eq!(MarketStatus::from_u8(0), MarketStatus::Open);
        assert_eq!(MarketStatus::from_u8(1), MarketStatus::Closed);
        assert_eq!(MarketStatus::from_u8(2), MarketStatus::Settled);
        assert_eq!(MarketStatus::Settled.to_string(), "Settled");
    }

    #[test]
    fn test_bet_token_normalization() {
        assert_eq!(normalize_bet_token(Address::ZERO), None);
        let token = address!("D21341536c5cF5EB1bcb58f6723cE26e8D8E90e4");
        assert_eq!(normalize_bet_token(token), Some(token));
    }

    #[test]
    fn test_user_bet_mapping() {
        let bet = IPredictionMarket::Bet {
            amount: U256::from(10u64).pow(U256::from(16)), // 0.01
            prediction: true,
            claimed: false,
            isToken: false,
        };
        let mapped = user_bet_from(3, &bet);
        assert_eq!(mapped.index, 3);
        assert_eq!(mapped.amount, "0.0100");
        assert_eq!(mapped.asset, "ETH");

        let token_bet = IPredictionMarket::Bet {
            amount: U256::from(10u64).pow(U256::from(15)),
            prediction: false,
            claimed: true,
            isToken: true,
        };
        assert_eq!(user_bet_from(0, &token_bet).asset, "CCIP-BnM");
        assert_eq!(user_bet_from(0, &token_bet).amount, "0.0010");
    }

    #[test]
    fn test_merge_stats_tolerates_one_failure() {
        let a = address!("ABc561948eFE3e0E37D28B483a5B9d1EbC8f0899");
        let b = address!("252CA7101A32619CE922455f0a84AFdDE41F0843");
        let c = address!("119bdDbEb434447A0045966F23364E53EbE45270");
        let markets = vec![entry(a), entry(b), entry(c)];

        // middle market's stats fetch failed
        let merged = merge_stats(&markets, vec![Some(stats(a)), None, Some(stats(c))]);

        assert_eq!(merged.len(), 2);
        assert!(merged.contains_key(&a));
        assert!(!merged.contains_key(&b));
        assert!(merged.contains_key(&c));
        // the failed market stays in the listing
        assert_eq!(markets.len(), 3);
    }

    #[test]
    fn test_combined_pool() {
        assert_eq!(combined_pool("1.5000", "0.2500"), "1.7500");
        assert_eq!(combined_pool("0.0000", "0.0000"), "0.0000");
        // unparseable side degrades to zero rather than poisoning the total
        assert_eq!(combined_pool("garbage", "1.0000"), "1.0000");
    }
}

//! The chain-aware bet dispatcher.
//!
//! Given the resolved chain context, an amount, and a side, the dispatcher
//! validates, checks the relevant balance, and routes to one of two paths:
//! a single payable call on the direct chain, or the approve-then-send pair
//! on the bridge chain. Validation and balance failures surface before any
//! transaction; chain rejections and reverts propagate unchanged with no
//! retry and no rollback of earlier steps.

pub mod bridge;

use crate::amount::{format_eth, parse_eth};
use crate::chains::{classify, ChainRole};
use crate::config::Config;
use crate::onchain::{market_at, token_at, ChainContext};
use crate::payout::BetSide;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::Provider;
use bridge::TokenBridgeBet;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum BetError {
    #[error("unsupported chain id {0}: switch to Sepolia (11155111) or Fuji (43113)")]
    UnsupportedChain(u64),
    #[error("please enter a valid amount")]
    InvalidAmount,
    #[error("minimum bet is {minimum} {currency}")]
    BelowMinimum {
        minimum: Decimal,
        currency: &'static str,
    },
    #[error("insufficient {currency} balance: required {required}, available {available}")]
    InsufficientBalance {
        currency: &'static str,
        required: String,
        available: String,
    },
    #[error("no bridge mapping configured for market {0}")]
    NoBridgeMapping(Address),
    #[error("no wallet key configured - set WALLET_PRIVATE_KEY")]
    NoWallet,
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),
    #[error("transaction failed: {0}")]
    Pending(#[from] alloy::providers::PendingTransactionError),
    #[error("rpc error: {0}")]
    Rpc(#[from] alloy::transports::TransportError),
    #[error("transaction {0} reverted")]
    Reverted(B256),
}

impl BetError {
    /// True for errors raised before anything was submitted to the chain —
    /// the user can fix the input and retry freely.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            BetError::UnsupportedChain(_)
                | BetError::InvalidAmount
                | BetError::BelowMinimum { .. }
                | BetError::InsufficientBalance { .. }
                | BetError::NoBridgeMapping(_)
                | BetError::NoWallet
        )
    }
}

/// Where a dispatch currently is. Observable through the watch channel so a
/// UI can render progress; the `Approving`/`BridgeSend` pair is where the
/// non-atomic two-step flow becomes visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BetPhase {
    Idle,
    Validating,
    CheckingBalance,
    DirectSend,
    Approving,
    BridgeSend,
    Confirmed,
    Failed,
}

/// A bet as requested by the user: display-unit amount, side, target market.
#[derive(Debug, Clone)]
pub struct BetRequest {
    pub market: Address,
    pub side: BetSide,
    pub amount: String,
}

/// Validate an amount string against the chain's minimum. No I/O.
pub fn validate_amount(amount: &str, role: ChainRole) -> Result<Decimal, BetError> {
    let value = Decimal::from_str(amount.trim()).map_err(|_| BetError::InvalidAmount)?;
    if value <= Decimal::ZERO {
        return Err(BetError::InvalidAmount);
    }
    let minimum = role.minimum_bet();
    if value < minimum {
        return Err(BetError::BelowMinimum {
            minimum,
            currency: role.bet_currency(),
        });
    }
    Ok(value)
}

/// Routes bets to the right per-chain path and reports phase transitions.
///
/// A bridge bet that confirmed its approval but failed the send is retained;
/// retrying the same bet resumes at the send step rather than approving a
/// second time.
pub struct BetDispatcher {
    phase_tx: watch::Sender<BetPhase>,
    pending_bridge: tokio::sync::Mutex<Option<TokenBridgeBet>>,
}

impl BetDispatcher {
    pub fn new() -> Self {
        let (phase_tx, _) = watch::channel(BetPhase::Idle);
        Self {
            phase_tx,
            pending_bridge: tokio::sync::Mutex::new(None),
        }
    }

    pub fn phase(&self) -> watch::Receiver<BetPhase> {
        self.phase_tx.subscribe()
    }

    fn enter(&self, phase: BetPhase) {
        let _ = self.phase_tx.send(phase);
    }

    /// Dispatch a bet on whatever chain the context resolved to.
    ///
    /// Direct chain: one payable `placeBet` carrying the native amount.
    /// Bridge chain: exact-amount approval, then the CCIP send; strictly in
    /// that order. Returns the hash of the confirmed (final) transaction.
    pub async fn place_bet(
        &self,
        config: &Config,
        ctx: &ChainContext,
        request: &BetRequest,
    ) -> Result<B256, BetError> {
        let outcome = self.place_bet_inner(config, ctx, request).await;
        match &outcome {
            Ok(hash) => {
                self.enter(BetPhase::Confirmed);
                info!(market = %request.market, tx = %hash, "bet confirmed");
            }
            Err(e) => {
                self.enter(BetPhase::Failed);
                warn!(market = %request.market, error = %e, "bet failed");
            }
        }
        outcome
    }

    async fn place_bet_inner(
        &self,
        config: &Config,
        ctx: &ChainContext,
        request: &BetRequest,
    ) -> Result<B256, BetError> {
        self.enter(BetPhase::Validating);
        let role = classify(ctx.chain_id).ok_or(BetError::UnsupportedChain(ctx.chain_id))?;
        validate_amount(&request.amount, role)?;
        let account = ctx.account.ok_or(BetError::NoWallet)?;

        // Both assets carry 18 decimals, so one parse covers both paths.
        let required = parse_eth(&request.amount).ok_or(BetError::InvalidAmount)?;

        match role {
            ChainRole::Direct => {
                self.enter(BetPhase::CheckingBalance);
                check_native_balance(ctx, account, required).await?;

                self.enter(BetPhase::DirectSend);
                self.direct_send(ctx, request, required).await
            }
            ChainRole::Bridge => {
                // No mapping means no destination for the message; fail
                // before spending anything on an approval.
                let route = config
                    .bridge_route(request.market)
                    .ok_or(BetError::NoBridgeMapping(request.market))?;
                let token = config.fuji.ccip_bnm;

                self.enter(BetPhase::CheckingBalance);
                check_token_balance(ctx, token, account, required).await?;

                // resume a matching half-done bet instead of approving again
                let mut pending = self.pending_bridge.lock().await;
                let mut op = match pending.take() {
                    Some(op) if op.matches(request.market, request.side, required) => op,
                    _ => TokenBridgeBet::new(
                        request.market,
                        route.fuji_bridge,
                        route.sepolia_receiver,
                        config.sepolia.ccip_selector,
                        token,
                        required,
                        request.side,
                    ),
                };

                self.enter(BetPhase::Approving);
                if let Err(e) = op.approve(ctx).await {
                    *pending = Some(op);
                    return Err(e);
                }

                self.enter(BetPhase::BridgeSend);
                match op.send(ctx).await {
                    Ok(hash) => Ok(hash),
                    Err(e) => {
                        // the approval is already spent; keep the operation
                        // so the next attempt re-drives only the send
                        *pending = Some(op);
                        Err(e)
                    }
                }
            }
        }
    }

    async fn direct_send(
        &self,
        ctx: &ChainContext,
        request: &BetRequest,
        value: U256,
    ) -> Result<B256, BetError> {
        let market = market_at(ctx, request.market);
        let receipt = market
            .placeBet(request.side.is_yes())
            .value(value)
            .send()
            .await?
            .get_receipt()
            .await?;
        if !receipt.status() {
            return Err(BetError::Reverted(receipt.transaction_hash));
        }
        Ok(receipt.transaction_hash)
    }
}

impl Default for BetDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

async fn check_native_balance(
    ctx: &ChainContext,
    account: Address,
    required: U256,
) -> Result<(), BetError> {
    let balance = ctx.provider.get_balance(account).await?;
    if balance < required {
        return Err(BetError::InsufficientBalance {
            currency: "ETH",
            required: format_eth(required),
            available: format_eth(balance),
        });
    }
    Ok(())
}

async fn check_token_balance(
    ctx: &ChainContext,
    token: Address,
    account: Address,
    required: U256,
) -> Result<(), BetError> {
    let balance = token_at(ctx, token).balanceOf(account).call().await?;
    if balance < required {
        return Err(BetError::InsufficientBalance {
            currency: "CCIP-BnM",
            required: format_eth(required),
            available: format_eth(balance),
        });
    }
    Ok(())
}

/// Claim winnings on a settled market. Pays out whichever assets the winning
/// bets were placed in.
pub async fn claim_winnings(ctx: &ChainContext, market_address: Address) -> Result<B256, BetError> {
    ctx.account.ok_or(BetError::NoWallet)?;
    let market = market_at(ctx, market_address);
    let receipt = market.claimWinnings().send().await?.get_receipt().await?;
    if !receipt.status() {
        return Err(BetError::Reverted(receipt.transaction_hash));
    }
    info!(market = %market_address, tx = %receipt.transaction_hash, "winnings claimed");
    Ok(receipt.transaction_hash)
}

/// Nudge a market past its close time if it is due.
pub async fn check_and_close_market(
    ctx: &ChainContext,
    market_address: Address,
) -> Result<B256, BetError> {
    ctx.account.ok_or(BetError::NoWallet)?;
    let market = market_at(ctx, market_address);
    let receipt = market
        .checkAndCloseMarket()
        .send()
        .await?
        .get_receipt()
        .await?;
    if !receipt.status() {
        return Err(BetError::Reverted(receipt.transaction_hash));
    }
    Ok(receipt.transaction_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::{FUJI_CHAIN_ID, SEPOLIA_CHAIN_ID};

    #[test]
    fn test_validate_rejects_non_numbers() {
        for bad in ["", "abc", "1.2.3", "--1"] {
            assert!(matches!(
                validate_amount(bad, ChainRole::Direct),
                Err(BetError::InvalidAmount)
            ));
        }
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        assert!(matches!(
            validate_amount("0", ChainRole::Direct),
            Err(BetError::InvalidAmount)
        ));
        assert!(matches!(
            validate_amount("-0.5", ChainRole::Direct),
            Err(BetError::InvalidAmount)
        ));
    }

    #[test]
    fn test_validate_enforces_chain_minimums() {
        // 0.005 ETH is below the 0.01 direct-chain minimum
        match validate_amount("0.005", ChainRole::Direct) {
            Err(BetError::BelowMinimum { minimum, currency }) => {
                assert_eq!(minimum, Decimal::from_str("0.01").unwrap());
                assert_eq!(currency, "ETH");
            }
            other => panic!("expected BelowMinimum, got {other:?}"),
        }

        // the same amount is fine on the bridge chain
        assert!(validate_amount("0.005", ChainRole::Bridge).is_ok());
        assert!(matches!(
            validate_amount("0.0005", ChainRole::Bridge),
            Err(BetError::BelowMinimum { .. })
        ));

        assert!(validate_amount("0.01", ChainRole::Direct).is_ok());
    }

    #[test]
    fn test_unsupported_chain_fails_before_any_read() {
        // classification is pure; a bad chain id never reaches the provider
        assert!(classify(1).is_none());
        assert!(classify(SEPOLIA_CHAIN_ID).is_some());
        assert!(classify(FUJI_CHAIN_ID).is_some());

        let err = BetError::UnsupportedChain(1);
        assert!(err.is_user_error());
        assert!(err.to_string().contains("11155111"));
    }

    #[test]
    fn test_error_taxonomy() {
        assert!(BetError::InvalidAmount.is_user_error());
        assert!(BetError::NoBridgeMapping(Address::ZERO).is_user_error());
        assert!(BetError::InsufficientBalance {
            currency: "ETH",
            required: "1.0000".into(),
            available: "0.5000".into(),
        }
        .is_user_error());
        assert!(!BetError::Reverted(B256::ZERO).is_user_error());
    }
}

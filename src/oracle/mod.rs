//! Odds refresh through the Chainlink Functions consumer.
//!
//! `request_odds` submits the on-chain request; the oracle network writes the
//! result back to the market contract some ticks later, so callers follow up
//! with a bounded poll that re-fetches the snapshot until the cap is reached.

use crate::config::ChainlinkConfig;
use crate::onchain::{consumer_at, ChainContext};
use alloy::primitives::{Address, B256};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Trigger an off-chain odds computation via the functions consumer.
/// Returns once the request transaction is confirmed; the fulfilled odds
/// land on-chain asynchronously.
pub async fn request_odds(
    ctx: &ChainContext,
    chainlink: &ChainlinkConfig,
    consumer_address: Address,
) -> Result<B256, crate::bet::BetError> {
    ctx.account.ok_or(crate::bet::BetError::NoWallet)?;
    let consumer = consumer_at(ctx, consumer_address);
    let receipt = consumer
        .requestOdds(
            Vec::new(),
            chainlink.subscription_id,
            chainlink.functions_gas_limit,
        )
        .send()
        .await?
        .get_receipt()
        .await?;
    if !receipt.status() {
        return Err(crate::bet::BetError::Reverted(receipt.transaction_hash));
    }
    debug!(consumer = %consumer_address, tx = %receipt.transaction_hash, "odds request confirmed");
    Ok(receipt.transaction_hash)
}

/// A capped, cancellable polling task.
///
/// Each tick awaits the callback before the next tick is considered, so
/// callbacks never overlap. A failed tick is logged and skipped — the poll
/// moves on to the next tick rather than retrying. Cancellation takes effect
/// between ticks; an in-flight callback is never interrupted.
pub struct OddsPoll {
    handle: Option<JoinHandle<u32>>,
    cancelled: Arc<AtomicBool>,
}

impl OddsPoll {
    pub fn spawn<F, Fut>(interval: Duration, max_attempts: u32, mut tick: F) -> Self
    where
        F: FnMut(u32) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately; the first poll should wait one period
            timer.tick().await;

            let mut completed = 0u32;
            for attempt in 1..=max_attempts {
                timer.tick().await;
                if flag.load(Ordering::SeqCst) {
                    debug!(attempt = attempt, "odds poll cancelled");
                    break;
                }
                debug!(attempt = attempt, max = max_attempts, "odds poll tick");
                if let Err(e) = tick(attempt).await {
                    warn!(attempt = attempt, error = %e, "odds poll tick failed");
                }
                completed = attempt;
            }
            debug!(ticks = completed, "odds poll finished");
            completed
        });

        Self {
            handle: Some(handle),
            cancelled,
        }
    }

    /// Stop polling after the current tick, if one is running.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Wait for the task to wind down; returns the number of completed ticks.
    pub async fn join(mut self) -> u32 {
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or(0),
            None => 0,
        }
    }
}

impl Drop for OddsPoll {
    fn drop(&mut self) {
        // dropping the handle must not leave a timer running forever
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test]
    async fn test_poll_stops_at_attempt_cap() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let poll = OddsPoll::spawn(Duration::from_millis(2), 5, move |_| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        let ticks = poll.join().await;
        assert_eq!(ticks, 5);
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_failed_tick_does_not_stop_the_poll() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let poll = OddsPoll::spawn(Duration::from_millis(2), 4, move |attempt| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                if attempt == 2 {
                    anyhow::bail!("transient read error");
                }
                Ok(())
            }
        });
        assert_eq!(poll.join().await, 4);
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_cancel_stops_before_cap() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = count.clone();
        let poll = OddsPoll::spawn(Duration::from_millis(20), 1_000, move |_| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        poll.cancel();
        let ticks = poll.join().await;
        assert!(ticks < 1_000, "cancelled poll ran to the cap");
        assert_eq!(count.load(Ordering::SeqCst), ticks);
    }
}

//! Axum-based front end over the market contracts.
//!
//! Provides:
//!   GET  /                            → HTML listing (auto-refresh)
//!   GET  /api/markets                 → JSON listing + per-market stats
//!   GET  /api/market/:address         → JSON snapshot + user bets
//!   POST /api/market/:address/bet     → dispatch a bet on the active chain
//!   POST /api/market/:address/claim   → claim winnings
//!   POST /api/market/:address/odds    → request odds + start bounded poll
//!   POST /api/market/:address/close   → checkAndCloseMarket
//!
//! UI state lives here and only here: the listing and snapshot caches are
//! point-in-time reads that a failed refresh must never clear.

use crate::amount::{countdown_text, format_time_since};
use crate::bet::{claim_winnings, check_and_close_market, BetDispatcher, BetRequest};
use crate::config::Config;
use crate::market::{fetch_listing, fetch_market_data, Listing, MarketSnapshot, UserBet};
use crate::onchain::WalletSession;
use crate::oracle::{request_odds, OddsPoll};
use crate::payout::BetSide;
use alloy::primitives::{Address, B256};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Listing cache: last-good data plus freshness metadata.
#[derive(Default)]
pub struct ListingView {
    pub listing: Listing,
    pub refreshed_at: Option<Instant>,
    pub last_error: Option<String>,
}

/// Snapshot cache entry for one market.
#[derive(Clone)]
pub struct MarketView {
    pub snapshot: MarketSnapshot,
    pub bets: Vec<UserBet>,
    pub stale: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: Arc<WalletSession>,
    pub dispatcher: Arc<BetDispatcher>,
    pub listing: Arc<RwLock<ListingView>>,
    pub snapshots: Arc<RwLock<HashMap<Address, MarketView>>>,
    odds_poll: Arc<Mutex<Option<OddsPoll>>>,
}

impl AppState {
    pub fn new(config: Arc<Config>, session: Arc<WalletSession>) -> Self {
        Self {
            config,
            session,
            dispatcher: Arc::new(BetDispatcher::new()),
            listing: Arc::new(RwLock::new(ListingView::default())),
            snapshots: Arc::new(RwLock::new(HashMap::new())),
            odds_poll: Arc::new(Mutex::new(None)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/markets", get(markets))
        .route("/api/market/:address", get(market_detail))
        .route("/api/market/:address/bet", post(place_bet))
        .route("/api/market/:address/claim", post(claim))
        .route("/api/market/:address/odds", post(refresh_odds))
        .route("/api/market/:address/close", post(close_market))
        .with_state(state)
}

pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let listen = state.config.dashboard.listen.clone();
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    info!(addr = %listen, "dashboard listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Background listing refresh. Ticks are strictly sequential — a slow fetch
/// delays the next tick rather than overlapping it — and a failed fetch
/// keeps the previous listing in place.
pub fn spawn_listing_refresh(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer =
            tokio::time::interval(Duration::from_millis(state.config.polling.stats_refresh_ms));
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            timer.tick().await;
            refresh_listing_once(&state).await;
        }
    })
}

async fn refresh_listing_once(state: &AppState) {
    let registry = state.config.contracts.market_registry;
    let result = async {
        let ctx = state.session.resolve().await?;
        fetch_listing(&ctx, registry).await
    }
    .await;

    let mut view = state.listing.write().await;
    match result {
        Ok(listing) => {
            info!(
                markets = listing.markets.len(),
                stats = listing.stats.len(),
                "listing refreshed"
            );
            view.listing = listing;
            view.refreshed_at = Some(Instant::now());
            view.last_error = None;
        }
        Err(e) => {
            // last-good listing stays in place
            warn!(error = %e, "listing refresh failed");
            view.last_error = Some(e.to_string());
        }
    }
}

// ─── Route payloads ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MarketResponse {
    snapshot: MarketSnapshot,
    bets: Vec<UserBet>,
    /// True when a live fetch failed and this is the last-good snapshot.
    stale: bool,
}

#[derive(Deserialize)]
struct BetBody {
    side: BetSide,
    amount: String,
}

#[derive(Serialize)]
struct TxResponse {
    tx_hash: B256,
}

type ApiError = (StatusCode, String);

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, message.into())
}

fn upstream_error(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_GATEWAY, message.into())
}

fn parse_address(raw: &str) -> Result<Address, ApiError> {
    raw.parse::<Address>()
        .map_err(|_| bad_request(format!("invalid market address: {raw}")))
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn markets(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.listing.read().await;
    Json(serde_json::json!({
        "markets": &view.listing.markets,
        "stats": &view.listing.stats,
        "refreshed": view.refreshed_at.map(|t| format_time_since(t.elapsed())),
        "error": view.last_error.clone(),
    }))
}

async fn market_detail(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<MarketResponse>, ApiError> {
    let market = parse_address(&address)?;

    let fetched = async {
        let ctx = state.session.resolve().await?;
        let account = ctx.account;
        fetch_market_data(&ctx, market, account).await
    }
    .await;

    match fetched {
        Ok((snapshot, bets)) => {
            let view = MarketView {
                snapshot: snapshot.clone(),
                bets: bets.clone(),
                stale: false,
            };
            state.snapshots.write().await.insert(market, view);
            Ok(Json(MarketResponse {
                snapshot,
                bets,
                stale: false,
            }))
        }
        Err(e) => {
            warn!(market = %market, error = %e, "snapshot fetch failed");
            // serve the previous snapshot rather than clearing the view
            let cached = state.snapshots.read().await.get(&market).cloned();
            match cached {
                Some(view) => Ok(Json(MarketResponse {
                    snapshot: view.snapshot,
                    bets: view.bets,
                    stale: true,
                })),
                None => Err(upstream_error(e.to_string())),
            }
        }
    }
}

async fn place_bet(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(body): Json<BetBody>,
) -> Result<Json<TxResponse>, ApiError> {
    let market = parse_address(&address)?;
    let ctx = state
        .session
        .resolve()
        .await
        .map_err(|e| upstream_error(e.to_string()))?;

    let request = BetRequest {
        market,
        side: body.side,
        amount: body.amount,
    };

    match state.dispatcher.place_bet(&state.config, &ctx, &request).await {
        Ok(tx_hash) => Ok(Json(TxResponse { tx_hash })),
        Err(e) if e.is_user_error() => Err(bad_request(e.to_string())),
        Err(e) => Err(upstream_error(e.to_string())),
    }
}

async fn claim(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<TxResponse>, ApiError> {
    let market = parse_address(&address)?;
    let ctx = state
        .session
        .resolve()
        .await
        .map_err(|e| upstream_error(e.to_string()))?;

    match claim_winnings(&ctx, market).await {
        Ok(tx_hash) => Ok(Json(TxResponse { tx_hash })),
        Err(e) if e.is_user_error() => Err(bad_request(e.to_string())),
        Err(e) => Err(upstream_error(e.to_string())),
    }
}

async fn close_market(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<TxResponse>, ApiError> {
    let market = parse_address(&address)?;
    let ctx = state
        .session
        .resolve()
        .await
        .map_err(|e| upstream_error(e.to_string()))?;

    match check_and_close_market(&ctx, market).await {
        Ok(tx_hash) => Ok(Json(TxResponse { tx_hash })),
        Err(e) if e.is_user_error() => Err(bad_request(e.to_string())),
        Err(e) => Err(upstream_error(e.to_string())),
    }
}

/// Request a fresh odds computation, then poll the snapshot for the
/// configured number of attempts so the fulfilled odds land in the cache.
/// A new request replaces (cancels) any poll still running.
async fn refresh_odds(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<TxResponse>, ApiError> {
    let market = parse_address(&address)?;

    // the consumer address comes from the registry listing
    let consumer = {
        let view = state.listing.read().await;
        view.listing
            .markets
            .iter()
            .find(|m| m.address == market)
            .map(|m| m.functions_consumer)
    };
    let Some(consumer) = consumer else {
        return Err(bad_request(format!("unknown market: {market}")));
    };

    let ctx = state
        .session
        .resolve()
        .await
        .map_err(|e| upstream_error(e.to_string()))?;

    let tx_hash = match request_odds(&ctx, &state.config.chainlink, consumer).await {
        Ok(hash) => hash,
        Err(e) if e.is_user_error() => return Err(bad_request(e.to_string())),
        Err(e) => return Err(upstream_error(e.to_string())),
    };

    let poll_state = state.clone();
    let poll = OddsPoll::spawn(
        Duration::from_millis(state.config.polling.odds_poll_interval_ms),
        state.config.polling.max_polling_attempts,
        move |_attempt| {
            let state = poll_state.clone();
            async move {
                // re-resolve per tick: the wallet may have moved underneath us
                let ctx = state.session.resolve().await?;
                let account = ctx.account;
                let (snapshot, bets) = fetch_market_data(&ctx, market, account).await?;
                state.snapshots.write().await.insert(
                    market,
                    MarketView {
                        snapshot,
                        bets,
                        stale: false,
                    },
                );
                Ok(())
            }
        },
    );

    // cancel whatever poll was still running for the previous request
    if let Some(previous) = state.odds_poll.lock().await.replace(poll) {
        previous.cancel();
    }

    Ok(Json(TxResponse { tx_hash }))
}

// ─── HTML ────────────────────────────────────────────────────────────────────

async fn index(State(state): State<AppState>) -> Html<String> {
    let view = state.listing.read().await;
    let refresh_secs = state.config.polling.refresh_interval_ms / 1000;

    let mut rows = String::new();
    for entry in &view.listing.markets {
        match view.listing.stats.get(&entry.address) {
            Some(stats) => {
                rows.push_str(&format!(
                    "<tr><td><code>{addr}</code></td><td>{question}</td><td>{status}</td>\
                     <td>{yes}% / {no}%</td><td>{pool}</td><td>{closes}</td></tr>\n",
                    addr = entry.address,
                    question = stats.question,
                    status = stats.status,
                    yes = stats.odds_yes,
                    no = stats.odds_no,
                    pool = stats.total_pool,
                    closes = countdown_text(stats.close_remaining_ms as i64),
                ));
            }
            None => {
                rows.push_str(&format!(
                    "<tr><td><code>{addr}</code></td><td>{question}</td>\
                     <td colspan=\"4\"><em>loading…</em></td></tr>\n",
                    addr = entry.address,
                    question = entry.question,
                ));
            }
        }
    }

    let freshness = match view.refreshed_at {
        Some(t) => format_time_since(t.elapsed()),
        None => "never".to_string(),
    };
    let error_banner = match &view.last_error {
        Some(e) => format!("<p class=\"err\">last refresh failed: {e}</p>"),
        None => String::new(),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{refresh_secs}">
<title>crossbet</title>
<style>
body {{ font-family: monospace; background: #101418; color: #d8dee4; margin: 2em; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #2a313a; padding: 6px 10px; text-align: left; }}
th {{ background: #1a2026; }}
.err {{ color: #e06c75; }}
code {{ color: #7aa2f7; }}
</style>
</head>
<body>
<h1>crossbet markets</h1>
<p>network: {network} · refreshed {freshness}</p>
{error_banner}
<table>
<tr><th>market</th><th>question</th><th>status</th><th>odds yes/no</th><th>total pool</th><th>closes in</th></tr>
{rows}
</table>
</body>
</html>"#,
        network = state.config.active_chain().name,
    ))
}

use crossbet::config::Config;
use crossbet::dashboard::{self, AppState};
use crossbet::onchain::WalletSession;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Load config
    let config = if Path::new("crossbet.toml").exists() {
        Config::load(Path::new("crossbet.toml"))?
    } else {
        Config::from_env()?
    };

    // Initialize logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    info!(
        network = %config.active_chain().name,
        "crossbet v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if !config.has_wallet() {
        warn!(
            "no wallet key configured - running in read-only mode \
             (set WALLET_PRIVATE_KEY to place bets and claim winnings)"
        );
    }

    let session = Arc::new(WalletSession::new(
        config.active_chain().rpc_url.clone(),
        config.wallet_key.as_deref(),
    )?);

    let state = AppState::new(Arc::new(config), session);

    // Background listing refresh; ticks never overlap.
    let refresh = dashboard::spawn_listing_refresh(state.clone());

    let served = dashboard::serve(state).await;
    refresh.abort();
    served
}

//! Deployment CLI for the prediction-market system.
//!
//! Usage:
//!   deploy full                       # market + bridge on both chains
//!   deploy multi-bridges <network>    # bridges for PREDICT_MARKET_1..4
//!   deploy multi-full                 # multi-bridges on both chains, paired
//!   deploy sepolia                    # market + bridge on Sepolia only
//!   deploy fuji                       # market + bridge on Fuji only
//!   deploy verify <network> <market> <bridge>
//!   deploy check                      # are the artifacts compiled?
//!
//! Reads the wallet key and RPC URLs from the environment; writes a
//! timestamped JSON manifest for every deployment.

use alloy::primitives::Address;
use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use crossbet::config::{Config, NetworkName};
use crossbet::deploy;
use std::path::Path;

#[derive(Parser)]
#[command(name = "deploy", about = "Deploy prediction markets and CCIP bridges")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the complete system on both chains
    Full,
    /// Deploy CCIP bridges for the env-configured markets on one network
    MultiBridges { network: Network },
    /// Deploy CCIP bridges for the env-configured markets on both chains
    MultiFull,
    /// Deploy a market + bridge on Sepolia only
    Sepolia,
    /// Deploy a market + bridge on Fuji only
    Fuji,
    /// Verify an existing deployment
    Verify {
        network: Network,
        market: Address,
        bridge: Address,
    },
    /// Check that the contract artifacts are compiled
    Check,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Network {
    Sepolia,
    Fuji,
}

impl From<Network> for NetworkName {
    fn from(network: Network) -> Self {
        match network {
            Network::Sepolia => NetworkName::Sepolia,
            Network::Fuji => NetworkName::Fuji,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = if Path::new("crossbet.toml").exists() {
        Config::load(Path::new("crossbet.toml"))?
    } else {
        Config::from_env()?
    };

    match args.command {
        Commands::Full => {
            let manifest = deploy::deploy_full_system(&config).await?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
            println!();
            println!("Next steps:");
            println!(
                "  1. Fund the Fuji bridge with LINK for CCIP fees: {}",
                manifest.fuji.ccip_bridge
            );
            println!("  2. Update crossbet.toml with the new addresses:");
            println!("     fuji sender   = {}", manifest.fuji.ccip_bridge);
            println!("     sepolia recv  = {}", manifest.sepolia.ccip_bridge);
            println!("     market        = {}", manifest.sepolia.prediction_market);
        }
        Commands::MultiBridges { network } => {
            let manifest = deploy::deploy_multi_bridges(&config, network.into()).await?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Commands::MultiFull => {
            let manifest = deploy::deploy_full_multi(&config).await?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Commands::Sepolia => {
            let deployment = deploy::deploy_network(&config, NetworkName::Sepolia).await?;
            println!("{}", serde_json::to_string_pretty(&deployment)?);
        }
        Commands::Fuji => {
            let deployment = deploy::deploy_network(&config, NetworkName::Fuji).await?;
            println!("{}", serde_json::to_string_pretty(&deployment)?);
        }
        Commands::Verify {
            network,
            market,
            bridge,
        } => {
            let report = deploy::verify_deployment(&config, network.into(), market, bridge).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.market_deployed || !report.bridge_deployed || !report.market_wired {
                bail!("verification failed");
            }
        }
        Commands::Check => {
            let mut all_found = true;
            for (contract, found) in deploy::check_compiled() {
                println!(
                    "  {} {}",
                    if found { "✓" } else { "✗" },
                    contract
                );
                all_found &= found;
            }
            if !all_found {
                bail!("missing artifacts - compile contracts with `forge build` first");
            }
        }
    }

    Ok(())
}

//! Universal Router Sandwich Bot
//!
//! Main entry point. Watches the public mempool for Universal Router
//! WETH → token swaps, plans a V2 sandwich around each one and sends the
//! four-transaction bundle to a private relay for the next block.
//!
//! Architecture:
//! - HTTP provider: ledger queries (tx details, pair reserves, nonces, receipts)
//! - WS provider: newPendingTransactions subscription, auto-reconnect on drop
//! - One tokio task per pending hash on a single-threaded runtime
//! - Relay: eth_callBundle → eth_sendBundle → wait → stats
//!
//! Created: 2026-10-17

use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use ur_sandwich_bot::bundle::FlashbotsRelay;
use ur_sandwich_bot::config::{load_config, load_config_from_file};
use ur_sandwich_bot::ledger::RpcLedger;
use ur_sandwich_bot::mempool::run_listener;
use ur_sandwich_bot::pipeline::SandwichPipeline;

/// Universal Router sandwich bot
#[derive(Parser)]
#[command(name = "ur-sandwich-bot")]
struct Args {
    /// Env file to load (defaults to .env in the working directory)
    #[arg(short, long, env = "ENV_FILE")]
    env_file: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    json_logs: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.json_logs {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }

    let config = match &args.env_file {
        Some(path) => load_config_from_file(path)?,
        None => load_config()?,
    };
    info!("Configuration loaded (chain_id: {})", config.chain_id);
    info!("Universal router: {:?}", config.universal_router);
    info!("V2 router: {:?} | factory: {:?}", config.v2_router, config.v2_factory);
    info!(
        "Front-run size: {} wei | bribe: {} wei",
        config.buy_amount_in, config.bribe_wei
    );

    let signer: PrivateKeySigner = config
        .private_key
        .trim()
        .trim_start_matches("0x")
        .parse()
        .context("PRIVATE_KEY is not a valid secp256k1 key")?;
    let auth_signer: PrivateKeySigner = match &config.relay_auth_key {
        Some(key) => key
            .trim()
            .trim_start_matches("0x")
            .parse()
            .context("FLASHBOTS_AUTH_KEY is not a valid secp256k1 key")?,
        None => signer.clone(),
    };
    info!("Signer: {:?} | relay identity: {:?}", signer.address(), auth_signer.address());

    let http_url = config
        .http_rpc_url
        .parse()
        .context("HTTP_PROVIDER_URL is not a URL")?;
    let provider = ProviderBuilder::new().connect_http(http_url).erased();

    let block = provider
        .get_block_number()
        .await
        .context("HTTP provider unreachable")?;
    info!("Connected! Current block: {}", block);

    let ledger = Arc::new(RpcLedger::new(provider, config.v2_factory));
    let relay = Arc::new(FlashbotsRelay::new(
        config.relay_url.clone(),
        auth_signer,
        Arc::clone(&ledger),
        Duration::from_millis(config.wait_poll_ms),
    ));
    let pipeline = Arc::new(SandwichPipeline::new(&config, signer, ledger, relay));

    info!("Listening for pending transactions on {}", config.ws_rpc_url);
    run_listener(&config.ws_rpc_url, pipeline).await
}

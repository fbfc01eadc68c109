//! Configuration management
//!
//! Loads settings from a .env file plus the process environment. Required
//! keys fail start-up with the key name in the error; optional keys fall
//! back to the defaults below.

use alloy::primitives::utils::{parse_ether, parse_units};
use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use std::str::FromStr;

// Re-export BotConfig for external access
pub use crate::types::BotConfig;

const DEFAULT_CHAIN_ID: u64 = 5;
const DEFAULT_BRIBE_GWEI: &str = "20";
const DEFAULT_BUY_AMOUNT_ETH: &str = "0.1";
const DEFAULT_GAS_LIMIT: u64 = 300_000;
const DEFAULT_DEADLINE_SECS: u64 = 3600;
const DEFAULT_WAIT_POLL_MS: u64 = 1000;

/// Load configuration from `.env` in the working directory (if present).
pub fn load_config() -> Result<BotConfig> {
    dotenv::dotenv().ok();
    config_from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration from a specific env file. Variables already set in
/// the process environment take precedence.
pub fn load_config_from_file(path: &str) -> Result<BotConfig> {
    dotenv::from_filename(path).with_context(|| format!("Failed to load env file {}", path))?;
    config_from_lookup(|key| std::env::var(key).ok())
}

/// Build the configuration from any key lookup.
pub fn config_from_lookup<F>(lookup: F) -> Result<BotConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| -> Result<String> {
        lookup(key)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{} not set", key))
    };
    let address = |key: &str| -> Result<Address> {
        let raw = required(key)?;
        Address::from_str(raw.trim()).with_context(|| format!("{} is not an address: {}", key, raw))
    };
    let number = |key: &str, default: u64| -> Result<u64> {
        match lookup(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("{} is not a number: {}", key, raw)),
            None => Ok(default),
        }
    };

    let bribe_gwei = lookup("BRIBE_TO_MINERS_GWEI").unwrap_or_else(|| DEFAULT_BRIBE_GWEI.to_string());
    let bribe: U256 = parse_units(bribe_gwei.trim(), "gwei")
        .with_context(|| format!("BRIBE_TO_MINERS_GWEI is not an amount: {}", bribe_gwei))?
        .get_absolute();
    let bribe_wei = u128::try_from(bribe)
        .ok()
        .context("BRIBE_TO_MINERS_GWEI out of range")?;

    let buy_eth = lookup("BUY_AMOUNT_ETH").unwrap_or_else(|| DEFAULT_BUY_AMOUNT_ETH.to_string());
    let buy_amount_in = parse_ether(buy_eth.trim())
        .with_context(|| format!("BUY_AMOUNT_ETH is not an amount: {}", buy_eth))?;
    if buy_amount_in.is_zero() {
        anyhow::bail!("BUY_AMOUNT_ETH must be greater than zero");
    }

    let amm_fee_numerator = number("AMM_FEE_NUMERATOR", 997)?;
    let amm_fee_denominator = number("AMM_FEE_DENOMINATOR", 1000)?;
    if amm_fee_denominator == 0 || amm_fee_numerator > amm_fee_denominator {
        anyhow::bail!(
            "AMM fee {}/{} is not a fraction of at most 1",
            amm_fee_numerator,
            amm_fee_denominator
        );
    }

    Ok(BotConfig {
        http_rpc_url: required("HTTP_PROVIDER_URL")?,
        ws_rpc_url: required("WS_PROVIDER_URL")?,
        chain_id: number("CHAIN_ID", DEFAULT_CHAIN_ID)?,

        private_key: required("PRIVATE_KEY")?,
        relay_auth_key: lookup("FLASHBOTS_AUTH_KEY").filter(|v| !v.trim().is_empty()),

        universal_router: address("UNIVERSAL_ROUTER_ADDRESS")?,
        v2_router: address("UNISWAP_ADDRESS")?,
        v2_factory: address("UNISWAP_FACTORY_ADDRESS")?,
        weth: address("WETH_ADDRESS")?,

        relay_url: required("FLASHBOTS_URL")?,

        bribe_wei,
        buy_amount_in,
        gas_limit: number("GAS_LIMIT", DEFAULT_GAS_LIMIT)?,
        deadline_secs: number("DEADLINE_SECS", DEFAULT_DEADLINE_SECS)?,
        amm_fee_numerator,
        amm_fee_denominator,

        wait_poll_ms: number("WAIT_POLL_MS", DEFAULT_WAIT_POLL_MS)?,
    })
}

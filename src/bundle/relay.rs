//! Bundle Relay Client
//!
//! Purpose:
//!     Talk to a Flashbots-style private relay: simulate, submit, wait for
//!     resolution and fetch post-mortem statistics.
//!
//! Created: 2026-10-17
//!
//! Dependencies:
//!     - reqwest (JSON-RPC over HTTPS)
//!     - alloy (request signing, block/receipt/nonce queries via LedgerClient)
//!
//! Wire protocol:
//!     eth_callBundle              [{txs, blockNumber, stateBlockNumber}]
//!     eth_sendBundle              [{txs, blockNumber}]
//!     flashbots_getBundleStatsV2  [{bundleHash, blockNumber}]
//!     flashbots_getUserStatsV2    [{blockNumber}]
//!
//! Every request carries `X-Flashbots-Signature: <address>:<signature>`,
//! an EIP-191 signature of the hex keccak-256 of the request body.

use alloy::primitives::{hex, keccak256, Address, TxHash};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::ledger::LedgerClient;
use crate::types::{Bundle, EntryKind, SubmissionOutcome};

const RELAY_TIMEOUT_MS: u64 = 5_000;

// ── Relay results ───────────────────────────────────────────────────────────

/// Per-transaction result of a bundle simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedTx {
    pub hash: TxHash,
    /// Some(reason) if the transaction reverted or errored
    pub revert: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationResult {
    pub results: Vec<SimulatedTx>,
}

impl SimulationResult {
    /// First reverting transaction, in bundle order
    pub fn first_revert(&self) -> Option<(usize, &SimulatedTx)> {
        self.results
            .iter()
            .enumerate()
            .find(|(_, tx)| tx.revert.is_some())
    }
}

/// What the waiter needs to know about one submitted entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedEntry {
    pub kind: EntryKind,
    pub hash: TxHash,
    pub sender: Address,
    pub nonce: u64,
}

/// Handle returned by `submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSubmission {
    pub bundle_hash: String,
    pub target_block: u64,
    pub entries: Vec<SubmittedEntry>,
}

impl BundleSubmission {
    pub fn new(bundle: &Bundle, bundle_hash: String, target_block: u64) -> Self {
        let entries = bundle
            .entries()
            .iter()
            .map(|e| SubmittedEntry {
                kind: e.kind,
                hash: e.hash,
                sender: e.sender,
                nonce: e.nonce,
            })
            .collect();
        Self {
            bundle_hash,
            target_block,
            entries,
        }
    }
}

// ── Relay interface ─────────────────────────────────────────────────────────

#[async_trait]
pub trait BundleRelay: Send + Sync {
    async fn simulate(&self, bundle: &Bundle, block: u64) -> Result<SimulationResult>;

    async fn submit(&self, bundle: &Bundle, block: u64) -> Result<BundleSubmission>;

    /// Block until the target block has passed and classify the result
    async fn wait(&self, submission: &BundleSubmission) -> Result<SubmissionOutcome>;

    async fn bundle_stats(&self, bundle_hash: &str, block: u64) -> Result<Value>;

    async fn user_stats(&self, block: u64) -> Result<Value>;
}

// ── Flashbots relay ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    message: String,
}

pub struct FlashbotsRelay<L> {
    client: reqwest::Client,
    url: String,
    auth: PrivateKeySigner,
    ledger: Arc<L>,
    poll_interval: Duration,
}

impl<L: LedgerClient> FlashbotsRelay<L> {
    pub fn new(url: String, auth: PrivateKeySigner, ledger: Arc<L>, poll_interval: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            auth,
            ledger,
            poll_interval,
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": [params],
        });
        let body = serde_json::to_vec(&payload).context("Failed to serialize relay request")?;
        let signature = sign_request(&self.auth, &body)?;

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("X-Flashbots-Signature", signature)
            .body(body)
            .timeout(Duration::from_millis(RELAY_TIMEOUT_MS))
            .send()
            .await
            .with_context(|| format!("{} request failed", method))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .with_context(|| format!("{} response unreadable", method))?;
        if !status.is_success() {
            bail!("{} returned HTTP {}: {}", method, status, text);
        }

        let parsed: RpcResponse = serde_json::from_str(&text)
            .with_context(|| format!("{} returned invalid JSON: {}", method, text))?;
        if let Some(err) = parsed.error {
            bail!("{} error {}: {}", method, err.code, err.message);
        }
        parsed
            .result
            .with_context(|| format!("{} returned no result", method))
    }
}

#[async_trait]
impl<L: LedgerClient> BundleRelay for FlashbotsRelay<L> {
    async fn simulate(&self, bundle: &Bundle, block: u64) -> Result<SimulationResult> {
        let params = json!({
            "txs": bundle.raw_transactions(),
            "blockNumber": format!("0x{:x}", block),
            "stateBlockNumber": "latest",
        });
        let result = self.call("eth_callBundle", params).await?;
        parse_simulation(&result)
    }

    async fn submit(&self, bundle: &Bundle, block: u64) -> Result<BundleSubmission> {
        let params = json!({
            "txs": bundle.raw_transactions(),
            "blockNumber": format!("0x{:x}", block),
        });
        let result = self.call("eth_sendBundle", params).await?;
        let bundle_hash = result
            .get("bundleHash")
            .and_then(Value::as_str)
            .context("eth_sendBundle result has no bundleHash")?
            .to_string();
        debug!("Bundle {} submitted for block {}", bundle_hash, block);
        Ok(BundleSubmission::new(bundle, bundle_hash, block))
    }

    async fn wait(&self, submission: &BundleSubmission) -> Result<SubmissionOutcome> {
        resolve_submission(self.ledger.as_ref(), submission, self.poll_interval).await
    }

    async fn bundle_stats(&self, bundle_hash: &str, block: u64) -> Result<Value> {
        self.call(
            "flashbots_getBundleStatsV2",
            json!({ "bundleHash": bundle_hash, "blockNumber": format!("0x{:x}", block) }),
        )
        .await
    }

    async fn user_stats(&self, block: u64) -> Result<Value> {
        self.call(
            "flashbots_getUserStatsV2",
            json!({ "blockNumber": format!("0x{:x}", block) }),
        )
        .await
    }
}

/// `<address>:<0x signature>` where the signature is EIP-191 over the hex
/// string of keccak256(body).
pub fn sign_request(signer: &PrivateKeySigner, body: &[u8]) -> Result<String> {
    let message = keccak256(body).to_string();
    let signature = signer
        .sign_message_sync(message.as_bytes())
        .context("Failed to sign relay request")?;
    Ok(format!(
        "{}:0x{}",
        signer.address(),
        hex::encode(signature.as_bytes())
    ))
}

/// Parse an `eth_callBundle` result. Entries with an `error` or `revert`
/// field count as reverted.
pub fn parse_simulation(result: &Value) -> Result<SimulationResult> {
    let entries = result
        .get("results")
        .and_then(Value::as_array)
        .context("eth_callBundle result has no results array")?;

    let mut results = Vec::with_capacity(entries.len());
    for entry in entries {
        let hash: TxHash = entry
            .get("txHash")
            .and_then(Value::as_str)
            .context("simulation entry has no txHash")?
            .parse()
            .context("simulation entry has an invalid txHash")?;
        let revert = ["error", "revert"]
            .iter()
            .filter_map(|key| entry.get(*key))
            .find(|v| !v.is_null())
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()));
        results.push(SimulatedTx { hash, revert });
    }
    Ok(SimulationResult { results })
}

/// Wait until the chain has moved past the target block, then decide the
/// outcome from receipts and nonces.
pub async fn resolve_submission<L: LedgerClient + ?Sized>(
    ledger: &L,
    submission: &BundleSubmission,
    poll_interval: Duration,
) -> Result<SubmissionOutcome> {
    loop {
        let current = ledger.block_number().await?;
        if current > submission.target_block {
            break;
        }
        tokio::time::sleep(poll_interval).await;
    }

    let mut all_included = true;
    for entry in &submission.entries {
        if ledger.receipt_block(entry.hash).await? != Some(submission.target_block) {
            all_included = false;
            break;
        }
    }
    if all_included {
        return Ok(SubmissionOutcome::Included);
    }

    for entry in &submission.entries {
        let confirmed = ledger.confirmed_nonce(entry.sender).await?;
        if confirmed > entry.nonce {
            debug!(
                "{} entry nonce {} already consumed (account at {})",
                entry.kind, entry.nonce, confirmed
            );
            return Ok(SubmissionOutcome::NonceTooHigh);
        }
    }

    Ok(SubmissionOutcome::NotIncluded)
}

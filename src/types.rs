//! Core data structures for the sandwich pipeline
//!
//! Purpose:
//!     Observed transactions, decoded swap intents, reserve snapshots,
//!     sandwich plans, bundles and submission outcomes. Everything here is
//!     built once per candidate and never mutated afterwards.
//!
//! Created: 2026-10-17
//!
//! Dependencies:
//!     - alloy (Address, Bytes, TxHash, I256, U256, consensus transaction accessors)

use alloy::consensus::Transaction as _;
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, I256, U256};
use std::fmt;

// ── Observed transaction ────────────────────────────────────────────────────

/// A pending transaction as observed in the mempool.
///
/// `raw` is the EIP-2718 encoding of the signed envelope exactly as the
/// sender broadcast it; it carries the original signature and is what goes
/// into the bundle for the victim slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
    pub from: Address,
    /// None for contract creation
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub nonce: u64,
    /// EIP-1559 fee cap (None for legacy / EIP-2930 transactions)
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub raw: Bytes,
}

impl PendingTransaction {
    /// Convert an RPC transaction into the pipeline's view of it.
    pub fn from_rpc(tx: &alloy::rpc::types::Transaction) -> Self {
        let dynamic = tx.is_dynamic_fee();
        Self {
            hash: *tx.inner.tx_hash(),
            from: tx.inner.signer(),
            to: tx.to(),
            value: tx.value(),
            input: tx.input().clone(),
            nonce: tx.nonce(),
            max_fee_per_gas: dynamic.then(|| tx.max_fee_per_gas()),
            max_priority_fee_per_gas: tx.max_priority_fee_per_gas(),
            raw: tx.inner.encoded_2718().into(),
        }
    }
}

// ── Decoded swap intent ─────────────────────────────────────────────────────

/// Universal Router V2_SWAP_EXACT_IN (command 0x08) arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSwap {
    /// Recipient word read as an integer. Small values are router sentinels
    /// (1 = msg.sender, 2 = the router itself).
    pub recipient_marker: U256,
    pub amount_in: U256,
    pub min_amount_out: U256,
    /// Exactly two entries when `has_two_path`, otherwise empty
    pub path: Vec<Address>,
    pub has_two_path: bool,
}

/// A transaction that passed every classifier predicate.
#[derive(Debug, Clone)]
pub struct SwapCandidate {
    pub transaction: PendingTransaction,
    /// The victim's native value (what actually enters the pair)
    pub amount_in: U256,
    pub min_amount_out: U256,
    pub token_to_capture: Address,
}

// ── Reserves ────────────────────────────────────────────────────────────────

/// Pair reserves re-ordered so that `reserve_a` is always the wrapped native
/// token and `reserve_b` the captured token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveSnapshot {
    pub pair: Address,
    pub reserve_a: U256,
    pub reserve_b: U256,
}

// ── Plan ────────────────────────────────────────────────────────────────────

/// EIP-1559 fee fields shared by all of our bundle entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeFields {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

impl FeeFields {
    /// Fees that dominate the victim's: victim fee + bribe on both fields.
    /// A victim without a fee cap (legacy tx) yields a cap of just the bribe.
    pub fn dominating(victim: &PendingTransaction, bribe: u128) -> Self {
        let max_fee_per_gas = match victim.max_fee_per_gas {
            Some(fee) => fee.saturating_add(bribe),
            None => bribe,
        };
        let max_priority_fee_per_gas = victim
            .max_priority_fee_per_gas
            .unwrap_or(0)
            .saturating_add(bribe);
        Self {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        }
    }
}

/// Exact amounts for one sandwich.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandwichPlan {
    pub buy_amount_in: U256,
    /// Tokens bought by the front-run
    pub first_amount_out: U256,
    /// Tokens the victim receives after the front-run (checked against their minimum)
    pub second_amount_out: U256,
    /// Native asset received by the back-run
    pub third_amount_out: U256,
    /// Absolute unix timestamp
    pub deadline: u64,
    pub fees: FeeFields,
}

impl SandwichPlan {
    /// Gross native-asset result of the round trip (may be negative before gas).
    /// Saturates at the I256 bounds.
    pub fn gross_profit(&self) -> I256 {
        if self.third_amount_out >= self.buy_amount_in {
            I256::try_from(self.third_amount_out - self.buy_amount_in).unwrap_or(I256::MAX)
        } else {
            I256::try_from(self.buy_amount_in - self.third_amount_out)
                .map(|loss| -loss)
                .unwrap_or(I256::MIN)
        }
    }
}

// ── Bundle ──────────────────────────────────────────────────────────────────

/// Position of an entry in the bundle. Order is load-bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    FrontRun,
    Victim,
    Approval,
    BackRun,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntryKind::FrontRun => write!(f, "front-run"),
            EntryKind::Victim => write!(f, "victim"),
            EntryKind::Approval => write!(f, "approval"),
            EntryKind::BackRun => write!(f, "back-run"),
        }
    }
}

/// One signed, serialized transaction in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub kind: EntryKind,
    pub raw: Bytes,
    pub hash: TxHash,
    pub sender: Address,
    pub nonce: u64,
}

/// The four ordered entries of a sandwich.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    entries: [BundleEntry; 4],
}

impl Bundle {
    pub fn new(
        front_run: BundleEntry,
        victim: BundleEntry,
        approval: BundleEntry,
        back_run: BundleEntry,
    ) -> Self {
        Self {
            entries: [front_run, victim, approval, back_run],
        }
    }

    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    pub fn entry(&self, kind: EntryKind) -> &BundleEntry {
        match kind {
            EntryKind::FrontRun => &self.entries[0],
            EntryKind::Victim => &self.entries[1],
            EntryKind::Approval => &self.entries[2],
            EntryKind::BackRun => &self.entries[3],
        }
    }

    pub fn raw_transactions(&self) -> Vec<Bytes> {
        self.entries.iter().map(|e| e.raw.clone()).collect()
    }
}

// ── Submission ──────────────────────────────────────────────────────────────

/// Terminal result of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Included,
    /// An entry's nonce was consumed elsewhere (usually the victim confirmed
    /// on its own). Benign.
    NonceTooHigh,
    /// Target block passed without the bundle
    NotIncluded,
    SimulationFailed,
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubmissionOutcome::Included => write!(f, "BundleIncluded"),
            SubmissionOutcome::NonceTooHigh => write!(f, "AccountNonceTooHigh"),
            SubmissionOutcome::NotIncluded => write!(f, "BlockPassedWithoutInclusion"),
            SubmissionOutcome::SimulationFailed => write!(f, "SimulationFailed"),
        }
    }
}

/// The entry the relay reported as reverting during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertedEntry {
    pub kind: EntryKind,
    pub hash: TxHash,
    pub reason: String,
}

/// Post-mortem statistics fetched after a missed block.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticStats {
    pub bundle_stats: Option<serde_json::Value>,
    pub user_stats: Option<serde_json::Value>,
}

/// Everything the coordinator learned about one bundle.
#[derive(Debug, Clone)]
pub struct SubmissionReport {
    pub outcome: SubmissionOutcome,
    pub target_block: u64,
    pub bundle_hash: Option<String>,
    pub first_revert: Option<RevertedEntry>,
    pub stats: Option<DiagnosticStats>,
}

// ── Configuration ───────────────────────────────────────────────────────────

/// Bot configuration, loaded once at start-up and shared read-only.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct BotConfig {
    // Network
    pub http_rpc_url: String,
    pub ws_rpc_url: String,
    pub chain_id: u64,

    // Wallet
    pub private_key: String,
    /// Key used only to authenticate relay requests (falls back to private_key)
    pub relay_auth_key: Option<String>,

    // Contracts
    pub universal_router: Address,
    pub v2_router: Address,
    pub v2_factory: Address,
    pub weth: Address,

    // Relay
    pub relay_url: String,

    // Sandwich parameters
    pub bribe_wei: u128,
    pub buy_amount_in: U256,
    pub gas_limit: u64,
    pub deadline_secs: u64,
    pub amm_fee_numerator: u64,
    pub amm_fee_denominator: u64,

    // Performance
    pub wait_poll_ms: u64,
}

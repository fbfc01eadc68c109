//! Pipeline error taxonomy
//!
//! Rejections and aborts are expected, high-frequency results and are
//! matched on by callers; `PipelineError` covers the transient failures
//! (RPC, relay, signing) that drop a candidate.

use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Why a pending transaction is not a sandwich candidate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("transaction not found")]
    NotFound,
    #[error("transaction has no destination")]
    NoDestination,
    #[error("transaction carries no value")]
    ZeroValue,
    #[error("destination {0} is not the universal router")]
    WrongDestination(Address),
    #[error("malformed call data: {0}")]
    Malformed(String),
    #[error("no V2_SWAP_EXACT_IN command")]
    NoSwapCommand,
    #[error("path is not a two-token path")]
    NotTwoHop,
    #[error("recipient is resolved by the router")]
    RouterRecipient,
    #[error("path starts at {0}, not the wrapped native token")]
    NotFromWrappedNative(Address),
}

/// Why a classified candidate was dropped before anything was signed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortReason {
    #[error("no pair for token {0}")]
    NoPair(Address),
    #[error("victim would receive {second} < minimum {minimum}")]
    VictimSlippage { second: U256, minimum: U256 },
    #[error("front-run buys nothing")]
    EmptyFrontRun,
    #[error("arithmetic overflow in amount calculation")]
    Overflow,
}

/// Transient failures. The candidate is dropped and never retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("ledger query failed: {0:#}")]
    Query(anyhow::Error),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("relay request failed: {0:#}")]
    Relay(anyhow::Error),
}

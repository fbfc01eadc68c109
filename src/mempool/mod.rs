//! Mempool intake
//!
//! Purpose:
//!     Watch pending transactions and pick out Universal Router swaps that
//!     can be sandwiched.
//!
//! Created: 2026-10-17
//!
//! Architecture:
//!     decoder.rs:    execute() call data → DecodedSwap (command 0x08)
//!     classifier.rs: eligibility predicates → SwapCandidate | Rejection
//!     listener.rs:   WS subscription loop, one pipeline run per hash

pub mod classifier;
pub mod decoder;
pub mod listener;

pub use classifier::{Classification, TransactionClassifier};
pub use listener::run_listener;

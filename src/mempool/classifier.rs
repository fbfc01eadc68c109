//! Transaction Classifier
//!
//! Purpose:
//!     Decide whether a pending transaction is a sandwich candidate: a
//!     native-value Universal Router V2 exact-in swap from WETH into a
//!     single token.
//!
//! Created: 2026-10-17
//!
//! Notes:
//!     - Predicates run cheapest-first and stop at the first failure
//!     - Only the detail fetch touches the network

use alloy::primitives::{Address, TxHash, U256};
use std::sync::Arc;

use crate::error::{PipelineError, Rejection};
use crate::ledger::LedgerClient;
use crate::types::{DecodedSwap, PendingTransaction, SwapCandidate};

use super::decoder::decode_universal_router_swap;

/// Recipient sentinel meaning "the router itself"; the real recipient is
/// only known at execution time.
pub const ROUTER_RECIPIENT_MARKER: u64 = 2;

/// Classifier outcome for one pending hash.
#[derive(Debug)]
pub enum Classification {
    Candidate(SwapCandidate),
    Rejected(Rejection),
}

pub struct TransactionClassifier<L> {
    ledger: Arc<L>,
    universal_router: Address,
    weth: Address,
}

impl<L: LedgerClient> TransactionClassifier<L> {
    pub fn new(ledger: Arc<L>, universal_router: Address, weth: Address) -> Self {
        Self {
            ledger,
            universal_router,
            weth,
        }
    }

    /// Fetch full details for `hash` and classify the transaction.
    pub async fn classify(&self, hash: TxHash) -> Result<Classification, PipelineError> {
        let transaction = self
            .ledger
            .transaction_by_hash(hash)
            .await
            .map_err(PipelineError::Query)?;

        let Some(transaction) = transaction else {
            return Ok(Classification::Rejected(Rejection::NotFound));
        };

        Ok(match self.check(transaction) {
            Ok(candidate) => Classification::Candidate(candidate),
            Err(rejection) => Classification::Rejected(rejection),
        })
    }

    /// Apply the eligibility predicates in order.
    pub fn check(&self, transaction: PendingTransaction) -> Result<SwapCandidate, Rejection> {
        let to = transaction.to.ok_or(Rejection::NoDestination)?;

        if transaction.value.is_zero() {
            return Err(Rejection::ZeroValue);
        }

        // Address equality ignores checksum case
        if to != self.universal_router {
            return Err(Rejection::WrongDestination(to));
        }

        let swap = decode_universal_router_swap(&transaction.input)?;
        let token_to_capture = self.check_swap(&swap)?;

        Ok(SwapCandidate {
            amount_in: transaction.value,
            min_amount_out: swap.min_amount_out,
            token_to_capture,
            transaction,
        })
    }

    /// Swap-level predicates. Returns the token the victim is buying.
    fn check_swap(&self, swap: &DecodedSwap) -> Result<Address, Rejection> {
        if !swap.has_two_path {
            return Err(Rejection::NotTwoHop);
        }
        if swap.recipient_marker == U256::from(ROUTER_RECIPIENT_MARKER) {
            return Err(Rejection::RouterRecipient);
        }
        match swap.path.as_slice() {
            [token_in, token_out] if *token_in == self.weth => Ok(*token_out),
            [token_in, _] => Err(Rejection::NotFromWrappedNative(*token_in)),
            _ => Err(Rejection::NotTwoHop),
        }
    }
}

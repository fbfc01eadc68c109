//! V2 Reserve Oracle
//!
//! Resolves the WETH/token pair through the factory and reads its current
//! reserves, re-ordered so the wrapped native reserve always comes first.
//! Reserves are read fresh for every candidate.
//!
//! Created: 2026-10-17
//! Modified: 2026-10-17 - Replaces the whitelist-driven V2 pool syncer

use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AbortReason, PipelineError};
use crate::ledger::LedgerClient;
use crate::types::ReserveSnapshot;

/// Result of a reserve lookup. A missing pair is an abort, not an error.
#[derive(Debug)]
pub enum ReserveLookup {
    Found(ReserveSnapshot),
    Missing(AbortReason),
}

/// Reserve oracle for pairs against the wrapped native token.
pub struct ReserveOracle<L> {
    ledger: Arc<L>,
    weth: Address,
}

impl<L: LedgerClient> ReserveOracle<L> {
    pub fn new(ledger: Arc<L>, weth: Address) -> Self {
        Self { ledger, weth }
    }

    /// Fetch (reserve of WETH, reserve of token) for the WETH/token pair.
    pub async fn fetch(&self, token: Address) -> Result<ReserveLookup, PipelineError> {
        let pair = self
            .ledger
            .get_pair(self.weth, token)
            .await
            .map_err(PipelineError::Query)?;

        if pair.is_zero() {
            return Ok(ReserveLookup::Missing(AbortReason::NoPair(token)));
        }

        let (reserve0, reserve1) = self
            .ledger
            .get_reserves(pair)
            .await
            .map_err(PipelineError::Query)?;

        let (reserve_a, reserve_b) = order_reserves(self.weth, token, reserve0, reserve1);

        debug!(
            "Reserves for {:?}: pair={:?} weth={} token={}",
            token, pair, reserve_a, reserve_b
        );

        Ok(ReserveLookup::Found(ReserveSnapshot {
            pair,
            reserve_a,
            reserve_b,
        }))
    }
}

/// True if `a` occupies slot 0 of the a/b pair.
///
/// Byte-wise address order is the same as lowercase hex string order, so
/// the result does not depend on checksum casing.
pub fn is_token0(a: Address, b: Address) -> bool {
    a < b
}

/// Map raw pair reserves onto (reserve of `base`, reserve of `token`).
pub fn order_reserves(base: Address, token: Address, reserve0: U256, reserve1: U256) -> (U256, U256) {
    if is_token0(base, token) {
        (reserve0, reserve1)
    } else {
        (reserve1, reserve0)
    }
}

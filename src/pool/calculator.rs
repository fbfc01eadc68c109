//! Sandwich Calculator
//!
//! Constant-product (x * y = k) amounts for a front-run / victim / back-run
//! sequence on a single V2 pair. All math is exact U256 with truncating
//! division, identical to UniswapV2Library.getAmountOut.
//!
//! Created: 2026-10-17
//! Modified: 2026-10-17 - Checked arithmetic, configurable fee, sandwich planning

use alloy::primitives::U256;
use tracing::debug;

use crate::error::AbortReason;
use crate::types::{FeeFields, ReserveSnapshot, SandwichPlan};

/// V2 fee factor: 997/1000 = 0.30% fee
pub const V2_FEE_NUMERATOR: u64 = 997;
pub const V2_FEE_DENOMINATOR: u64 = 1000;

/// Pair fee expressed as numerator / denominator of the amount kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmmFee {
    pub numerator: u64,
    pub denominator: u64,
}

impl Default for AmmFee {
    fn default() -> Self {
        Self {
            numerator: V2_FEE_NUMERATOR,
            denominator: V2_FEE_DENOMINATOR,
        }
    }
}

/// Calculate amount out for a given input using constant product formula
///
/// Formula: amount_out = (amount_in * fee_num * reserve_out) / (reserve_in * fee_den + amount_in * fee_num)
///
/// Returns None on overflow. Zero inputs give zero output.
pub fn get_amount_out(amount_in: U256, reserve_in: U256, reserve_out: U256, fee: AmmFee) -> Option<U256> {
    if amount_in.is_zero() || reserve_in.is_zero() || reserve_out.is_zero() {
        return Some(U256::ZERO);
    }

    let amount_in_with_fee = amount_in.checked_mul(U256::from(fee.numerator))?;
    let numerator = amount_in_with_fee.checked_mul(reserve_out)?;
    let denominator = reserve_in
        .checked_mul(U256::from(fee.denominator))?
        .checked_add(amount_in_with_fee)?;

    Some(numerator / denominator)
}

/// Computes sandwich plans from a reserve snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SandwichCalculator {
    /// Fixed front-run size in wei
    pub buy_amount_in: U256,
    pub fee: AmmFee,
}

impl SandwichCalculator {
    pub fn new(buy_amount_in: U256, fee: AmmFee) -> Self {
        Self { buy_amount_in, fee }
    }

    /// Plan a sandwich around a victim buying with `amount_in` native and
    /// requiring at least `min_amount_out` tokens.
    ///
    /// Aborts when the victim's minimum would no longer be met after our
    /// front-run, since their swap (and with it the whole bundle) would revert.
    pub fn plan(
        &self,
        reserves: &ReserveSnapshot,
        amount_in: U256,
        min_amount_out: U256,
        fees: FeeFields,
        deadline: u64,
    ) -> Result<SandwichPlan, AbortReason> {
        let buy = self.buy_amount_in;
        let (reserve_a, reserve_b) = (reserves.reserve_a, reserves.reserve_b);

        // 1. Front-run buy
        let first_amount_out = self.amount_out(buy, reserve_a, reserve_b)?;
        if first_amount_out.is_zero() {
            return Err(AbortReason::EmptyFrontRun);
        }

        // 2. Reserves after the front-run
        let reserve_a1 = reserve_a.checked_add(buy).ok_or(AbortReason::Overflow)?;
        let reserve_b1 = reserve_b
            .checked_add(first_amount_out)
            .ok_or(AbortReason::Overflow)?;

        // 3. Victim
        let second_amount_out = self.amount_out(amount_in, reserve_a1, reserve_b1)?;
        if second_amount_out < min_amount_out {
            return Err(AbortReason::VictimSlippage {
                second: second_amount_out,
                minimum: min_amount_out,
            });
        }

        // 4. Reserves after the victim
        let reserve_a2 = reserve_a1.checked_add(amount_in).ok_or(AbortReason::Overflow)?;
        let reserve_b2 = reserve_b1
            .checked_add(second_amount_out)
            .ok_or(AbortReason::Overflow)?;

        // 5. Back-run sell: token -> native
        let third_amount_out = self.amount_out(first_amount_out, reserve_b2, reserve_a2)?;

        debug!(
            "Sandwich amounts: buy={} first={} second={} (min {}) third={}",
            buy, first_amount_out, second_amount_out, min_amount_out, third_amount_out
        );

        Ok(SandwichPlan {
            buy_amount_in: buy,
            first_amount_out,
            second_amount_out,
            third_amount_out,
            deadline,
            fees,
        })
    }

    fn amount_out(&self, amount_in: U256, reserve_in: U256, reserve_out: U256) -> Result<U256, AbortReason> {
        get_amount_out(amount_in, reserve_in, reserve_out, self.fee).ok_or(AbortReason::Overflow)
    }
}

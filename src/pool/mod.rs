//! V2 pair state and sandwich math
//!
//! Reads WETH/token pair reserves fresh per candidate and computes exact
//! constant-product amounts for the front-run, victim and back-run.
//!
//! Created: 2026-10-17

pub mod calculator;
pub mod reserves;

pub use calculator::{get_amount_out, AmmFee, SandwichCalculator};
pub use reserves::{ReserveLookup, ReserveOracle};

//! Universal Router Sandwich Bot Library
//!
//! Decodes pending Universal Router swaps, plans constant-product sandwiches
//! around them and drives four-transaction bundles through a private relay.
//!
//! Created: 2026-10-17

pub mod bundle;
pub mod config;
pub mod contracts;
pub mod error;
pub mod ledger;
pub mod mempool;
pub mod pipeline;
pub mod pool;
pub mod types;

// Re-export commonly used types
pub use config::{load_config, load_config_from_file};
pub use error::{AbortReason, PipelineError, Rejection};
pub use pipeline::{PipelineOutcome, SandwichPipeline};
pub use types::{BotConfig, Bundle, SandwichPlan, SubmissionOutcome, SubmissionReport};

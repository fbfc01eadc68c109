//! Bundle construction and submission
//!
//! - `assembler`: four ordered entries with fees dominating the victim's
//! - `relay`: private relay client (simulate, submit, wait, stats)
//! - `coordinator`: single-block simulate → submit → resolve protocol

pub mod assembler;
pub mod coordinator;
pub mod relay;

pub use assembler::BundleAssembler;
pub use coordinator::SubmissionCoordinator;
pub use relay::{BundleRelay, BundleSubmission, FlashbotsRelay, SimulationResult};

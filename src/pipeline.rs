//! Sandwich Pipeline
//!
//! Purpose:
//!     One run per pending transaction hash:
//!     Classifier → Reserve Oracle → Calculator → Assembler → Coordinator.
//!
//! Created: 2026-10-17
//!
//! Notes:
//!     - Runs share only the immutable services held here; nothing is
//!       written that another run reads
//!     - Every branch ends in a `PipelineOutcome` or a `PipelineError`

use alloy::primitives::TxHash;
use alloy::signers::local::PrivateKeySigner;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::bundle::{BundleAssembler, BundleRelay, SubmissionCoordinator};
use crate::error::{AbortReason, PipelineError, Rejection};
use crate::ledger::LedgerClient;
use crate::mempool::classifier::{Classification, TransactionClassifier};
use crate::pool::calculator::{AmmFee, SandwichCalculator};
use crate::pool::reserves::{ReserveLookup, ReserveOracle};
use crate::types::{BotConfig, FeeFields, SubmissionOutcome, SubmissionReport};

/// Result of one pipeline run.
#[derive(Debug)]
pub enum PipelineOutcome {
    Rejected(Rejection),
    Aborted(AbortReason),
    Submitted(SubmissionReport),
}

pub struct SandwichPipeline<L, R> {
    ledger: Arc<L>,
    classifier: TransactionClassifier<L>,
    oracle: ReserveOracle<L>,
    calculator: SandwichCalculator,
    assembler: BundleAssembler,
    coordinator: SubmissionCoordinator<L, R>,
    bribe_wei: u128,
    deadline_secs: u64,
}

impl<L: LedgerClient, R: BundleRelay> SandwichPipeline<L, R> {
    pub fn new(config: &BotConfig, signer: PrivateKeySigner, ledger: Arc<L>, relay: Arc<R>) -> Self {
        let fee = AmmFee {
            numerator: config.amm_fee_numerator,
            denominator: config.amm_fee_denominator,
        };
        Self {
            classifier: TransactionClassifier::new(
                Arc::clone(&ledger),
                config.universal_router,
                config.weth,
            ),
            oracle: ReserveOracle::new(Arc::clone(&ledger), config.weth),
            calculator: SandwichCalculator::new(config.buy_amount_in, fee),
            assembler: BundleAssembler::new(
                signer,
                config.chain_id,
                config.v2_router,
                config.weth,
                config.gas_limit,
            ),
            coordinator: SubmissionCoordinator::new(Arc::clone(&ledger), relay),
            ledger,
            bribe_wei: config.bribe_wei,
            deadline_secs: config.deadline_secs,
        }
    }

    /// Run the pipeline for one pending hash and log the result.
    pub async fn handle(&self, hash: TxHash) {
        match self.process(hash).await {
            Ok(PipelineOutcome::Rejected(reason)) => {
                debug!("{:?} not eligible: {}", hash, reason);
            }
            Ok(PipelineOutcome::Aborted(reason)) => {
                info!("{:?} aborted: {}", hash, reason);
            }
            Ok(PipelineOutcome::Submitted(report)) => log_report(hash, &report),
            Err(e) => {
                warn!("{:?} dropped: {}", hash, e);
            }
        }
    }

    pub async fn process(&self, hash: TxHash) -> Result<PipelineOutcome, PipelineError> {
        let candidate = match self.classifier.classify(hash).await? {
            Classification::Candidate(candidate) => candidate,
            Classification::Rejected(reason) => return Ok(PipelineOutcome::Rejected(reason)),
        };

        info!(
            "Candidate {:?}: {} wei into {:?} (min out {})",
            hash, candidate.amount_in, candidate.token_to_capture, candidate.min_amount_out
        );

        let reserves = match self.oracle.fetch(candidate.token_to_capture).await? {
            ReserveLookup::Found(reserves) => reserves,
            ReserveLookup::Missing(reason) => return Ok(PipelineOutcome::Aborted(reason)),
        };

        let fees = FeeFields::dominating(&candidate.transaction, self.bribe_wei);
        let deadline = (Utc::now().timestamp().max(0) as u64).saturating_add(self.deadline_secs);

        let plan = match self.calculator.plan(
            &reserves,
            candidate.amount_in,
            candidate.min_amount_out,
            fees,
            deadline,
        ) {
            Ok(plan) => plan,
            Err(reason) => return Ok(PipelineOutcome::Aborted(reason)),
        };

        info!(
            "Plan for {:?}: buy {} → {} tokens, sell → {} wei (gross {})",
            hash,
            plan.buy_amount_in,
            plan.first_amount_out,
            plan.third_amount_out,
            plan.gross_profit()
        );

        let base_nonce = self
            .ledger
            .pending_nonce(self.assembler.address())
            .await
            .map_err(PipelineError::Query)?;
        let bundle = self.assembler.assemble(&candidate, &plan, base_nonce)?;

        let report = self.coordinator.run(&bundle).await?;
        Ok(PipelineOutcome::Submitted(report))
    }
}

fn log_report(hash: TxHash, report: &SubmissionReport) {
    match report.outcome {
        SubmissionOutcome::Included => info!(
            "{:?}: {} in block {}",
            hash, report.outcome, report.target_block
        ),
        SubmissionOutcome::NonceTooHigh => info!(
            "{:?}: {} (victim confirmed without us)",
            hash, report.outcome
        ),
        SubmissionOutcome::NotIncluded => warn!(
            "{:?}: {} for block {} stats={:?}",
            hash, report.outcome, report.target_block, report.stats
        ),
        SubmissionOutcome::SimulationFailed => match &report.first_revert {
            Some(revert) => warn!(
                "{:?}: {} at {} entry {:?}: {}",
                hash, report.outcome, revert.kind, revert.hash, revert.reason
            ),
            None => warn!("{:?}: {}", hash, report.outcome),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::relay::fake::FakeRelay;
    use crate::ledger::fake::FakeLedger;
    use crate::mempool::decoder::tests::{execute_calldata, swap_blob, TOKEN, WETH};
    use crate::mempool::decoder::V2_SWAP_EXACT_IN;
    use crate::types::{EntryKind, PendingTransaction};
    use alloy::primitives::{address, Address, Bytes, U256};
    use std::sync::atomic::Ordering;

    const TEST_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ROUTER: Address = address!("3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad");
    const PAIR: Address = address!("00000000000000000000000000000000000000ee");

    fn e18(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18))
    }

    fn config() -> BotConfig {
        BotConfig {
            http_rpc_url: "http://localhost:8545".to_string(),
            ws_rpc_url: "ws://localhost:8546".to_string(),
            chain_id: 5,
            private_key: TEST_KEY.to_string(),
            relay_auth_key: None,
            universal_router: ROUTER,
            v2_router: address!("7a250d5630b4cf539739df2c5dacb4c659f2488d"),
            v2_factory: address!("5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f"),
            weth: WETH,
            relay_url: "http://localhost:9000".to_string(),
            bribe_wei: 20_000_000_000,
            buy_amount_in: U256::from(100_000_000_000_000_000u64),
            gas_limit: 300_000,
            deadline_secs: 3600,
            amm_fee_numerator: 997,
            amm_fee_denominator: 1000,
            wait_poll_ms: 0,
        }
    }

    fn victim(min_out: U256) -> PendingTransaction {
        let calldata = execute_calldata(
            vec![0x0b, V2_SWAP_EXACT_IN],
            vec![
                Vec::new(),
                swap_blob(Address::with_last_byte(1), e18(1), min_out, &[WETH, TOKEN]),
            ],
        );
        PendingTransaction {
            hash: TxHash::with_last_byte(0x77),
            from: Address::with_last_byte(0x11),
            to: Some(ROUTER),
            value: e18(1),
            input: Bytes::from(calldata),
            nonce: 3,
            max_fee_per_gas: Some(30_000_000_000),
            max_priority_fee_per_gas: Some(1_000_000_000),
            raw: Bytes::from_static(&[0x02, 0xf8, 0x01]),
        }
    }

    fn setup(
        min_out: U256,
        relay: FakeRelay,
    ) -> (Arc<FakeLedger>, Arc<FakeRelay>, SandwichPipeline<FakeLedger, FakeRelay>) {
        let ledger = Arc::new(FakeLedger::default());
        ledger.add_transaction(victim(min_out));
        // WETH (0xb4..) sorts above TOKEN (0x1f..), so WETH is token1
        ledger.add_pair(WETH, TOKEN, PAIR, (e18(2_000_000), e18(1000)));
        ledger.block.store(900, Ordering::SeqCst);

        let relay = Arc::new(relay);
        let signer: PrivateKeySigner = TEST_KEY.parse().unwrap();
        ledger
            .confirmed_nonces
            .lock()
            .unwrap()
            .insert(signer.address(), 8);
        let pipeline = SandwichPipeline::new(&config(), signer, Arc::clone(&ledger), Arc::clone(&relay));
        (ledger, relay, pipeline)
    }

    #[tokio::test]
    async fn test_candidate_is_submitted() {
        let (_ledger, relay, pipeline) =
            setup(e18(900), FakeRelay::with_outcome(SubmissionOutcome::Included));

        match pipeline.process(TxHash::with_last_byte(0x77)).await.unwrap() {
            PipelineOutcome::Submitted(report) => {
                assert_eq!(report.outcome, SubmissionOutcome::Included);
                assert_eq!(report.target_block, 901);
            }
            other => panic!("expected submission, got {:?}", other),
        }
        assert_eq!(relay.simulate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(relay.submit_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_victim_simulation_revert_never_submits() {
        let (_ledger, relay, pipeline) = setup(
            e18(900),
            FakeRelay {
                revert_at: Some(1),
                ..Default::default()
            },
        );

        match pipeline.process(TxHash::with_last_byte(0x77)).await.unwrap() {
            PipelineOutcome::Submitted(report) => {
                assert_eq!(report.outcome, SubmissionOutcome::SimulationFailed);
                let revert = report.first_revert.unwrap();
                assert_eq!(revert.kind, EntryKind::Victim);
                assert_eq!(revert.hash, TxHash::with_last_byte(0x77));
            }
            other => panic!("expected simulation failure, got {:?}", other),
        }
        assert_eq!(relay.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_slippage_abort_skips_assembly_and_relay() {
        let (_ledger, relay, pipeline) = setup(e18(3000), FakeRelay::default());

        match pipeline.process(TxHash::with_last_byte(0x77)).await.unwrap() {
            PipelineOutcome::Aborted(AbortReason::VictimSlippage { minimum, .. }) => {
                assert_eq!(minimum, e18(3000));
            }
            other => panic!("expected slippage abort, got {:?}", other),
        }
        assert_eq!(relay.simulate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(relay.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_pair_aborts() {
        let ledger = Arc::new(FakeLedger::default());
        ledger.add_transaction(victim(e18(900)));
        let relay = Arc::new(FakeRelay::default());
        let signer: PrivateKeySigner = TEST_KEY.parse().unwrap();
        let pipeline = SandwichPipeline::new(&config(), signer, ledger, Arc::clone(&relay));

        let outcome = pipeline.process(TxHash::with_last_byte(0x77)).await.unwrap();
        assert!(matches!(outcome, PipelineOutcome::Aborted(AbortReason::NoPair(t)) if t == TOKEN));
        assert_eq!(relay.simulate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_hash_is_rejected() {
        let (ledger, relay, pipeline) = setup(e18(900), FakeRelay::default());

        let outcome = pipeline.process(TxHash::with_last_byte(0x01)).await.unwrap();
        assert!(matches!(outcome, PipelineOutcome::Rejected(Rejection::NotFound)));
        assert_eq!(ledger.reserve_reads.load(Ordering::SeqCst), 0);
        assert_eq!(relay.simulate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reserve_failure_is_dropped() {
        let ledger = Arc::new(FakeLedger {
            fail_reserves: true,
            ..Default::default()
        });
        ledger.add_transaction(victim(e18(900)));
        ledger.add_pair(WETH, TOKEN, PAIR, (e18(1), e18(1)));
        let signer: PrivateKeySigner = TEST_KEY.parse().unwrap();
        let pipeline =
            SandwichPipeline::new(&config(), signer, ledger, Arc::new(FakeRelay::default()));

        let result = pipeline.process(TxHash::with_last_byte(0x77)).await;
        assert!(matches!(result, Err(PipelineError::Query(_))));
        // handle() logs and swallows the same failure
        pipeline.handle(TxHash::with_last_byte(0x77)).await;
    }
}

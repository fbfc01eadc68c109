//! Submission Coordinator
//!
//! Drives one bundle through simulate → submit → wait → stats against a
//! single target block (current block + 1). Nothing is resubmitted.
//!
//! Created: 2026-10-17

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::ledger::LedgerClient;
use crate::types::{Bundle, DiagnosticStats, RevertedEntry, SubmissionOutcome, SubmissionReport};

use super::relay::BundleRelay;

pub struct SubmissionCoordinator<L, R> {
    ledger: Arc<L>,
    relay: Arc<R>,
}

impl<L: LedgerClient, R: BundleRelay> SubmissionCoordinator<L, R> {
    pub fn new(ledger: Arc<L>, relay: Arc<R>) -> Self {
        Self { ledger, relay }
    }

    pub async fn run(&self, bundle: &Bundle) -> Result<SubmissionReport, PipelineError> {
        let block = self
            .ledger
            .block_number()
            .await
            .map_err(PipelineError::Query)?;
        let target_block = block + 1;

        let simulation = self
            .relay
            .simulate(bundle, target_block)
            .await
            .map_err(PipelineError::Relay)?;

        if let Some((_, tx)) = simulation.first_revert() {
            let kind = bundle
                .entries()
                .iter()
                .find(|e| e.hash == tx.hash)
                .map(|e| e.kind)
                .ok_or_else(|| {
                    PipelineError::Relay(anyhow::anyhow!(
                        "simulation reverted unknown transaction {:?}",
                        tx.hash
                    ))
                })?;
            let reason = tx.revert.clone().unwrap_or_default();
            warn!(
                "Simulation for block {} reverted at {} entry {:?}: {}",
                target_block, kind, tx.hash, reason
            );
            return Ok(SubmissionReport {
                outcome: SubmissionOutcome::SimulationFailed,
                target_block,
                bundle_hash: None,
                first_revert: Some(RevertedEntry {
                    kind,
                    hash: tx.hash,
                    reason,
                }),
                stats: None,
            });
        }

        let submission = self
            .relay
            .submit(bundle, target_block)
            .await
            .map_err(PipelineError::Relay)?;
        info!(
            "Bundle {} submitted for block {}",
            submission.bundle_hash, target_block
        );

        let outcome = self
            .relay
            .wait(&submission)
            .await
            .map_err(PipelineError::Relay)?;

        let stats = match outcome {
            SubmissionOutcome::Included | SubmissionOutcome::NonceTooHigh => None,
            _ => Some(self.fetch_stats(&submission.bundle_hash, target_block).await),
        };

        Ok(SubmissionReport {
            outcome,
            target_block,
            bundle_hash: Some(submission.bundle_hash),
            first_revert: None,
            stats,
        })
    }

    /// Post-mortem statistics. Failures are logged and left empty.
    async fn fetch_stats(&self, bundle_hash: &str, block: u64) -> DiagnosticStats {
        let bundle_stats = match self.relay.bundle_stats(bundle_hash, block).await {
            Ok(stats) => {
                debug!("Bundle stats for {}: {}", bundle_hash, stats);
                Some(stats)
            }
            Err(e) => {
                warn!("Bundle stats for {} unavailable: {:#}", bundle_hash, e);
                None
            }
        };
        let user_stats = match self.relay.user_stats(block).await {
            Ok(stats) => {
                debug!("User stats at block {}: {}", block, stats);
                Some(stats)
            }
            Err(e) => {
                warn!("User stats at block {} unavailable: {:#}", block, e);
                None
            }
        };
        DiagnosticStats {
            bundle_stats,
            user_stats,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::bundle::relay::fake::FakeRelay;
    use crate::ledger::fake::FakeLedger;
    use crate::types::{BundleEntry, EntryKind};
    use alloy::primitives::{Address, Bytes, TxHash};
    use std::sync::atomic::Ordering;

    pub(crate) fn bundle() -> Bundle {
        let entry = |kind, n: u8| BundleEntry {
            kind,
            raw: Bytes::from(vec![0x02, n]),
            hash: TxHash::with_last_byte(n),
            sender: Address::with_last_byte(0xa0),
            nonce: n as u64,
        };
        Bundle::new(
            entry(EntryKind::FrontRun, 1),
            entry(EntryKind::Victim, 2),
            entry(EntryKind::Approval, 3),
            entry(EntryKind::BackRun, 4),
        )
    }

    fn ledger_at(block: u64) -> Arc<FakeLedger> {
        let ledger = FakeLedger::default();
        ledger.block.store(block, Ordering::SeqCst);
        Arc::new(ledger)
    }

    #[tokio::test]
    async fn test_victim_revert_skips_submit() {
        let relay = Arc::new(FakeRelay {
            revert_at: Some(1),
            ..Default::default()
        });
        let coordinator = SubmissionCoordinator::new(ledger_at(500), Arc::clone(&relay));

        let report = coordinator.run(&bundle()).await.unwrap();
        assert_eq!(report.outcome, SubmissionOutcome::SimulationFailed);
        let revert = report.first_revert.unwrap();
        assert_eq!(revert.kind, EntryKind::Victim);
        assert_eq!(revert.hash, TxHash::with_last_byte(2));
        assert_eq!(relay.simulate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(relay.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_revert_of_foreign_transaction_is_relay_error() {
        let relay = Arc::new(FakeRelay {
            revert_at: Some(1),
            revert_hash: Some(TxHash::with_last_byte(0xee)),
            ..Default::default()
        });
        let coordinator = SubmissionCoordinator::new(ledger_at(500), Arc::clone(&relay));

        let result = coordinator.run(&bundle()).await;
        assert!(matches!(result, Err(PipelineError::Relay(_))));
        assert_eq!(relay.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_targets_next_block() {
        let relay = Arc::new(FakeRelay::with_outcome(SubmissionOutcome::Included));
        let coordinator = SubmissionCoordinator::new(ledger_at(500), Arc::clone(&relay));

        let report = coordinator.run(&bundle()).await.unwrap();
        assert_eq!(report.target_block, 501);
        assert_eq!(*relay.simulated_blocks.lock().unwrap(), vec![501]);
    }

    #[tokio::test]
    async fn test_included_skips_stats() {
        let relay = Arc::new(FakeRelay::with_outcome(SubmissionOutcome::Included));
        let coordinator = SubmissionCoordinator::new(ledger_at(1), Arc::clone(&relay));

        let report = coordinator.run(&bundle()).await.unwrap();
        assert_eq!(report.outcome, SubmissionOutcome::Included);
        assert_eq!(report.bundle_hash.as_deref(), Some("0xb0b"));
        assert!(report.stats.is_none());
        assert_eq!(relay.stats_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_nonce_too_high_is_benign() {
        let relay = Arc::new(FakeRelay::with_outcome(SubmissionOutcome::NonceTooHigh));
        let coordinator = SubmissionCoordinator::new(ledger_at(1), Arc::clone(&relay));

        let report = coordinator.run(&bundle()).await.unwrap();
        assert_eq!(report.outcome, SubmissionOutcome::NonceTooHigh);
        assert!(report.stats.is_none());
    }

    #[tokio::test]
    async fn test_not_included_fetches_stats() {
        let relay = Arc::new(FakeRelay::with_outcome(SubmissionOutcome::NotIncluded));
        let coordinator = SubmissionCoordinator::new(ledger_at(1), Arc::clone(&relay));

        let report = coordinator.run(&bundle()).await.unwrap();
        let stats = report.stats.unwrap();
        assert!(stats.bundle_stats.is_some());
        assert!(stats.user_stats.is_some());
        assert_eq!(relay.stats_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stats_failures_are_swallowed() {
        let relay = Arc::new(FakeRelay {
            outcome: Some(SubmissionOutcome::NotIncluded),
            fail_stats: true,
            ..Default::default()
        });
        let coordinator = SubmissionCoordinator::new(ledger_at(1), Arc::clone(&relay));

        let report = coordinator.run(&bundle()).await.unwrap();
        assert_eq!(report.outcome, SubmissionOutcome::NotIncluded);
        let stats = report.stats.unwrap();
        assert!(stats.bundle_stats.is_none());
        assert!(stats.user_stats.is_none());
    }

    #[tokio::test]
    async fn test_submit_failure_is_relay_error() {
        let relay = Arc::new(FakeRelay {
            fail_submit: true,
            ..Default::default()
        });
        let coordinator = SubmissionCoordinator::new(ledger_at(1), relay);
        assert!(matches!(
            coordinator.run(&bundle()).await,
            Err(PipelineError::Relay(_))
        ));
    }
}

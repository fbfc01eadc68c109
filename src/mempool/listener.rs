//! Pending Transaction Listener
//!
//! Purpose:
//!     Subscribe to pending transaction hashes over WebSocket and spawn one
//!     independent pipeline run per hash.
//!
//! Created: 2026-10-17
//!
//! Dependencies:
//!     - alloy (WS provider, eth_subscribe newPendingTransactions)
//!     - futures (stream consumption)
//!     - tokio (task per hash, reconnect back-off)
//!
//! Notes:
//!     - Delivery never waits on a pipeline run
//!     - A dropped subscription reconnects; the process only gives up after
//!       MAX_RECONNECTS consecutive sessions that delivered nothing

use alloy::primitives::TxHash;
use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use anyhow::{anyhow, Context, Result};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{error, info, warn};

use crate::bundle::BundleRelay;
use crate::ledger::LedgerClient;
use crate::pipeline::SandwichPipeline;

const MAX_RECONNECTS: u32 = 50;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Run the listener. Only returns once `MAX_RECONNECTS` consecutive
/// sessions have failed without delivering a single hash.
pub async fn run_listener<L, R>(ws_url: &str, pipeline: Arc<SandwichPipeline<L, R>>) -> Result<()>
where
    L: LedgerClient + 'static,
    R: BundleRelay + 'static,
{
    let mut reconnects = 0u32;

    loop {
        let (dispatched, err) = match run_session(ws_url, &pipeline).await {
            Ok(dispatched) => (
                dispatched,
                anyhow!("pending transaction stream ended after {} hashes", dispatched),
            ),
            Err(e) => (0, e),
        };

        reconnects = next_reconnect_count(reconnects, dispatched);
        if reconnects > MAX_RECONNECTS {
            error!(
                "Listener: {} reconnects exhausted, giving up: {:#}",
                MAX_RECONNECTS, err
            );
            return Err(err);
        }
        warn!(
            "Listener error (reconnect {}/{}): {:#}, retrying in {}s",
            reconnects,
            MAX_RECONNECTS,
            err,
            RECONNECT_DELAY.as_secs()
        );
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}

/// Reconnect attempts after a session ends. A session that delivered
/// hashes was healthy, so counting restarts at one.
fn next_reconnect_count(previous: u32, dispatched: u64) -> u32 {
    if dispatched > 0 {
        1
    } else {
        previous.saturating_add(1)
    }
}

/// One WS session. Err if connecting or subscribing fails; otherwise the
/// number of hashes dispatched before the stream ended.
async fn run_session<L, R>(ws_url: &str, pipeline: &Arc<SandwichPipeline<L, R>>) -> Result<u64>
where
    L: LedgerClient + 'static,
    R: BundleRelay + 'static,
{
    let provider = ProviderBuilder::new()
        .connect_ws(WsConnect::new(ws_url))
        .await
        .context("Pending transaction WS connect failed")?;

    let subscription = provider
        .subscribe_pending_transactions()
        .await
        .context("newPendingTransactions subscription failed")?;
    info!("Subscribed to pending transactions");

    Ok(dispatch_stream(subscription.into_stream(), Arc::clone(pipeline)).await)
}

/// Spawn a pipeline run for every hash the stream yields. Returns the
/// number of runs spawned once the stream ends.
pub async fn dispatch_stream<S, L, R>(stream: S, pipeline: Arc<SandwichPipeline<L, R>>) -> u64
where
    S: Stream<Item = TxHash>,
    L: LedgerClient + 'static,
    R: BundleRelay + 'static,
{
    let mut stream = std::pin::pin!(stream);
    let mut dispatched = 0u64;

    while let Some(hash) = stream.next().await {
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move {
            pipeline.handle(hash).await;
        });
        dispatched += 1;
    }

    dispatched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::relay::fake::FakeRelay;
    use crate::ledger::fake::FakeLedger;
    use crate::types::BotConfig;
    use alloy::primitives::{Address, U256};
    use alloy::signers::local::PrivateKeySigner;
    use std::sync::atomic::Ordering;

    fn pipeline(ledger: Arc<FakeLedger>) -> Arc<SandwichPipeline<FakeLedger, FakeRelay>> {
        let config = BotConfig {
            http_rpc_url: String::new(),
            ws_rpc_url: String::new(),
            chain_id: 1,
            private_key: String::new(),
            relay_auth_key: None,
            universal_router: Address::with_last_byte(1),
            v2_router: Address::with_last_byte(2),
            v2_factory: Address::with_last_byte(3),
            weth: Address::with_last_byte(4),
            relay_url: String::new(),
            bribe_wei: 1,
            buy_amount_in: U256::from(1u64),
            gas_limit: 21_000,
            deadline_secs: 60,
            amm_fee_numerator: 997,
            amm_fee_denominator: 1000,
            wait_poll_ms: 0,
        };
        Arc::new(SandwichPipeline::new(
            &config,
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
                .parse::<PrivateKeySigner>()
                .unwrap(),
            ledger,
            Arc::new(FakeRelay::default()),
        ))
    }

    #[tokio::test]
    async fn test_every_hash_gets_a_run() {
        let ledger = Arc::new(FakeLedger::default());
        let hashes: Vec<TxHash> = (1..=3u8).map(TxHash::with_last_byte).collect();

        let dispatched =
            dispatch_stream(futures::stream::iter(hashes), pipeline(Arc::clone(&ledger))).await;
        assert_eq!(dispatched, 3);

        for _ in 0..100 {
            if ledger.transaction_lookups.load(Ordering::SeqCst) == 3 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(ledger.transaction_lookups.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failing_run_does_not_stop_delivery() {
        let ledger = Arc::new(FakeLedger {
            fail_transaction_lookup: true,
            ..Default::default()
        });
        let hashes: Vec<TxHash> = (1..=5u8).map(TxHash::with_last_byte).collect();

        let dispatched =
            dispatch_stream(futures::stream::iter(hashes), pipeline(Arc::clone(&ledger))).await;
        assert_eq!(dispatched, 5);
    }

    #[test]
    fn test_healthy_session_resets_reconnects() {
        assert_eq!(next_reconnect_count(0, 0), 1);
        assert_eq!(next_reconnect_count(49, 0), 50);
        assert_eq!(next_reconnect_count(49, 12), 1);
        assert_eq!(next_reconnect_count(MAX_RECONNECTS, 1), 1);
    }

    #[test]
    fn test_budget_only_spent_by_consecutive_dead_sessions() {
        // 200 drops, each after a session that delivered hashes
        let mut reconnects = 0;
        for _ in 0..200 {
            reconnects = next_reconnect_count(reconnects, 3);
            assert!(reconnects <= MAX_RECONNECTS);
        }

        // Back-to-back connect failures do exhaust the budget
        let mut reconnects = 0;
        for _ in 0..MAX_RECONNECTS {
            reconnects = next_reconnect_count(reconnects, 0);
        }
        assert_eq!(reconnects, MAX_RECONNECTS);
        assert!(next_reconnect_count(reconnects, 0) > MAX_RECONNECTS);
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let ledger = Arc::new(FakeLedger::default());
        let dispatched = dispatch_stream(futures::stream::empty(), pipeline(ledger)).await;
        assert_eq!(dispatched, 0);
    }
}

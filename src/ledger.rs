//! Ledger Query Service
//!
//! Purpose:
//!     The read-only chain queries the pipeline needs, behind a trait so the
//!     classifier, reserve oracle and coordinator can run against fakes.
//!
//! Created: 2026-10-17
//!
//! Dependencies:
//!     - alloy (HTTP provider, V2 factory/pair bindings)
//!     - async-trait (object-safe async trait)

use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider};
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::contracts::{IUniswapV2Factory, IUniswapV2Pair};
use crate::types::PendingTransaction;

/// Request/response chain queries. All calls are independent reads.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Full transaction details by hash (None if the node does not know it)
    async fn transaction_by_hash(&self, hash: TxHash) -> Result<Option<PendingTransaction>>;

    async fn block_number(&self) -> Result<u64>;

    /// Pair address from the V2 factory (zero address if the pair does not exist)
    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address>;

    /// Raw (reserve0, reserve1) of a V2 pair
    async fn get_reserves(&self, pair: Address) -> Result<(U256, U256)>;

    /// Next nonce including pending transactions
    async fn pending_nonce(&self, account: Address) -> Result<u64>;

    /// Next nonce as of the latest block
    async fn confirmed_nonce(&self, account: Address) -> Result<u64>;

    /// Block number a transaction was mined in, if any
    async fn receipt_block(&self, hash: TxHash) -> Result<Option<u64>>;
}

/// `LedgerClient` over an alloy provider.
#[derive(Clone)]
pub struct RpcLedger {
    provider: DynProvider,
    factory: Address,
}

impl RpcLedger {
    pub fn new(provider: DynProvider, factory: Address) -> Self {
        Self { provider, factory }
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn transaction_by_hash(&self, hash: TxHash) -> Result<Option<PendingTransaction>> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .with_context(|| format!("eth_getTransactionByHash {}", hash))?;
        Ok(tx.as_ref().map(PendingTransaction::from_rpc))
    }

    async fn block_number(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .context("Failed to get block number")
    }

    async fn get_pair(&self, token_a: Address, token_b: Address) -> Result<Address> {
        let factory = IUniswapV2Factory::new(self.factory, &self.provider);
        factory
            .getPair(token_a, token_b)
            .call()
            .await
            .context("Failed to get pair from factory")
    }

    async fn get_reserves(&self, pair: Address) -> Result<(U256, U256)> {
        let pair_contract = IUniswapV2Pair::new(pair, &self.provider);
        let reserves = pair_contract
            .getReserves()
            .call()
            .await
            .context("Failed to get reserves")?;
        Ok((
            U256::from(reserves.reserve0.to::<u128>()),
            U256::from(reserves.reserve1.to::<u128>()),
        ))
    }

    async fn pending_nonce(&self, account: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(account)
            .pending()
            .await
            .context("Failed to get pending nonce")
    }

    async fn confirmed_nonce(&self, account: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(account)
            .latest()
            .await
            .context("Failed to get confirmed nonce")
    }

    async fn receipt_block(&self, hash: TxHash) -> Result<Option<u64>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .with_context(|| format!("eth_getTransactionReceipt {}", hash))?;
        Ok(receipt.and_then(|r| r.block_number))
    }
}

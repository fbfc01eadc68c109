//! Bundle Assembler
//!
//! Purpose:
//!     Turn a sandwich plan into the four ordered, serialized bundle entries:
//!     front-run buy, the victim verbatim, token approval, back-run sell.
//!
//! Created: 2026-10-17
//!
//! Dependencies:
//!     - alloy (EIP-1559 transactions, local signer, router/ERC20 call encoding)
//!
//! Notes:
//!     - Our three entries use consecutive nonces from a single base nonce
//!     - The victim entry is the observed EIP-2718 bytes, never re-signed

use alloy::consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use tracing::debug;

use crate::contracts::{IUniswapV2Router02, IERC20};
use crate::error::PipelineError;
use crate::types::{Bundle, BundleEntry, EntryKind, FeeFields, SandwichPlan, SwapCandidate};

pub struct BundleAssembler {
    signer: PrivateKeySigner,
    chain_id: u64,
    v2_router: Address,
    weth: Address,
    gas_limit: u64,
}

impl BundleAssembler {
    pub fn new(
        signer: PrivateKeySigner,
        chain_id: u64,
        v2_router: Address,
        weth: Address,
        gas_limit: u64,
    ) -> Self {
        Self {
            signer,
            chain_id,
            v2_router,
            weth,
            gas_limit,
        }
    }

    /// Address that signs (and receives the proceeds of) our entries
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Build the bundle. `base_nonce` is the signer's next nonce; the
    /// front-run, approval and back-run take base, base+1 and base+2.
    pub fn assemble(
        &self,
        candidate: &SwapCandidate,
        plan: &SandwichPlan,
        base_nonce: u64,
    ) -> Result<Bundle, PipelineError> {
        let me = self.signer.address();
        let token = candidate.token_to_capture;
        let deadline = U256::from(plan.deadline);

        let buy = IUniswapV2Router02::swapExactETHForTokensCall {
            amountOutMin: plan.first_amount_out,
            path: vec![self.weth, token],
            to: me,
            deadline,
        };
        let front_run = self.sign(
            EntryKind::FrontRun,
            self.v2_router,
            plan.buy_amount_in,
            buy.abi_encode(),
            base_nonce,
            plan.fees,
        )?;

        let victim_tx = &candidate.transaction;
        let victim = BundleEntry {
            kind: EntryKind::Victim,
            raw: victim_tx.raw.clone(),
            hash: victim_tx.hash,
            sender: victim_tx.from,
            nonce: victim_tx.nonce,
        };

        let approve = IERC20::approveCall {
            spender: self.v2_router,
            amount: plan.first_amount_out,
        };
        let approval = self.sign(
            EntryKind::Approval,
            token,
            U256::ZERO,
            approve.abi_encode(),
            base_nonce + 1,
            plan.fees,
        )?;

        let sell = IUniswapV2Router02::swapExactTokensForETHCall {
            amountIn: plan.first_amount_out,
            amountOutMin: plan.third_amount_out,
            path: vec![token, self.weth],
            to: me,
            deadline,
        };
        let back_run = self.sign(
            EntryKind::BackRun,
            self.v2_router,
            U256::ZERO,
            sell.abi_encode(),
            base_nonce + 2,
            plan.fees,
        )?;

        debug!(
            "Assembled bundle for victim {:?}: front={:?} approval={:?} back={:?}",
            victim.hash, front_run.hash, approval.hash, back_run.hash
        );

        Ok(Bundle::new(front_run, victim, approval, back_run))
    }

    fn sign(
        &self,
        kind: EntryKind,
        to: Address,
        value: U256,
        input: Vec<u8>,
        nonce: u64,
        fees: FeeFields,
    ) -> Result<BundleEntry, PipelineError> {
        let mut tx = TxEip1559 {
            chain_id: self.chain_id,
            nonce,
            gas_limit: self.gas_limit,
            max_fee_per_gas: fees.max_fee_per_gas,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
            to: TxKind::Call(to),
            value,
            access_list: Default::default(),
            input: Bytes::from(input),
        };

        let sig = TxSignerSync::sign_transaction_sync(&self.signer, &mut tx)
            .map_err(|e| PipelineError::Signing(format!("{} entry: {}", kind, e)))?;
        let signed: TxEnvelope = tx.into_signed(sig).into();

        Ok(BundleEntry {
            kind,
            raw: signed.encoded_2718().into(),
            hash: *signed.tx_hash(),
            sender: self.signer.address(),
            nonce,
        })
    }
}

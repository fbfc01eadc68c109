//! Universal Router Calldata Decoder
//!
//! Purpose:
//!     Decode pending Universal Router `execute` calls and extract the
//!     V2_SWAP_EXACT_IN (command 0x08) swap intent.
//!
//! Created: 2026-10-17
//!
//! Dependencies:
//!     - alloy (sol-types decoding of the execute call and swap tuple)
//!
//! Supported Function Selectors:
//!     0x3593564c: execute(bytes commands, bytes[] inputs, uint256 deadline)
//!     0x24856bc3: execute(bytes commands, bytes[] inputs)
//!
//! Swap input layout (one 32-byte word per line):
//!     0  recipient
//!     1  amountIn
//!     2  amountOutMin
//!     3  offset of path
//!     4  payerIsUser
//!     5  path byte length
//!     6  path element count (2)
//!     7  token in
//!     8  token out
//!
//! Only the 9-word shape is a two-token path. Path tokens are sliced out of
//! the last two words directly instead of being decoded a second time.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};
use tracing::trace;

use crate::contracts::{IUniversalRouter, IUniversalRouterNoDeadline};
use crate::error::Rejection;
use crate::types::DecodedSwap;

/// Universal Router command byte for a V2 exact-input swap
pub const V2_SWAP_EXACT_IN: u8 = 0x08;

/// Word count of a V2_SWAP_EXACT_IN input whose path holds exactly two tokens
pub const TWO_HOP_WORD_COUNT: usize = 9;

const WORD: usize = 32;

/// Top-level `execute` arguments.
#[derive(Debug, Clone)]
pub struct RouterCall {
    pub commands: Bytes,
    pub inputs: Vec<Bytes>,
}

/// Decode the call data of a Universal Router transaction and return the
/// first V2_SWAP_EXACT_IN swap it contains.
pub fn decode_universal_router_swap(input: &[u8]) -> Result<DecodedSwap, Rejection> {
    let call = decode_execute(input)?;

    let position = call
        .commands
        .iter()
        .position(|&command| command == V2_SWAP_EXACT_IN)
        .ok_or(Rejection::NoSwapCommand)?;

    let swap_input = call.inputs.get(position).ok_or_else(|| {
        Rejection::Malformed(format!(
            "command {} has no input ({} inputs)",
            position,
            call.inputs.len()
        ))
    })?;

    decode_swap_input(swap_input)
}

/// Decode either `execute` overload into commands + inputs.
pub fn decode_execute(input: &[u8]) -> Result<RouterCall, Rejection> {
    if input.len() < 4 {
        return Err(Rejection::Malformed("call data shorter than a selector".to_string()));
    }
    let selector = &input[..4];

    if selector == IUniversalRouter::executeCall::SELECTOR.as_slice() {
        let call = IUniversalRouter::executeCall::abi_decode(input)
            .map_err(|e| Rejection::Malformed(e.to_string()))?;
        Ok(RouterCall {
            commands: call.commands,
            inputs: call.inputs,
        })
    } else if selector == IUniversalRouterNoDeadline::executeCall::SELECTOR.as_slice() {
        let call = IUniversalRouterNoDeadline::executeCall::abi_decode(input)
            .map_err(|e| Rejection::Malformed(e.to_string()))?;
        Ok(RouterCall {
            commands: call.commands,
            inputs: call.inputs,
        })
    } else {
        trace!("Unknown selector: {}", selector_hex(input));
        Err(Rejection::Malformed(format!("unknown selector {}", selector_hex(input))))
    }
}

/// Decode one V2_SWAP_EXACT_IN argument blob:
/// (address recipient, uint256 amountIn, uint256 amountOutMin, bytes path, bool payerIsUser)
pub fn decode_swap_input(blob: &[u8]) -> Result<DecodedSwap, Rejection> {
    if blob.len() % WORD != 0 {
        return Err(Rejection::Malformed(format!(
            "swap input is {} bytes, not word aligned",
            blob.len()
        )));
    }

    let (recipient, amount_in, min_amount_out, _path, _payer_is_user) =
        <(Address, U256, U256, Bytes, bool)>::abi_decode_params(blob)
            .map_err(|e| Rejection::Malformed(e.to_string()))?;

    let words: Vec<&[u8]> = blob.chunks_exact(WORD).collect();
    let (path, has_two_path) = if words.len() == TWO_HOP_WORD_COUNT {
        let token_in = word_to_address(words[words.len() - 2]);
        let token_out = word_to_address(words[words.len() - 1]);
        (vec![token_in, token_out], true)
    } else {
        (Vec::new(), false)
    };

    Ok(DecodedSwap {
        recipient_marker: U256::from_be_slice(recipient.as_slice()),
        amount_in,
        min_amount_out,
        path,
        has_two_path,
    })
}

/// Return the 4-byte selector as a hex string for logging
pub fn selector_hex(input: &[u8]) -> String {
    if input.len() < 4 {
        return "0x????".to_string();
    }
    format!("0x{:02x}{:02x}{:02x}{:02x}", input[0], input[1], input[2], input[3])
}

/// Low 20 bytes of an ABI word
fn word_to_address(word: &[u8]) -> Address {
    Address::from_slice(&word[WORD - 20..])
}

//! Canonical, bit-exact encodings used for commitments and bridge storage slots.
//!
//! See spec.md §6 "Canonical encodings". All hashing is keccak256 over ABI
//! encodings (dynamic types use standard ABI tuple encoding; the two
//! concatenation-only slot derivations are plain byte concatenation, which
//! is identical to ABI-encoding two static 32-byte words).

use super::model::{GetRequest, Order};
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::sol_types::SolValue;

/// A cross-chain `PostRequest` message (see spec.md §4.3's redeem-escrow body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    pub source: String,
    pub dest: String,
    pub nonce: u64,
    pub from: Address,
    pub to: Address,
    pub timeout_timestamp: u64,
    pub body: Bytes,
}

/// `orderCommitment(order)`: keccak256 of the ABI-encoded order tuple.
pub fn order_commitment(order: &Order) -> B256 {
    let outputs: Vec<(B256, U256, B256)> =
        order.outputs.iter().map(|o| (o.token, o.amount, o.beneficiary)).collect();
    let inputs: Vec<(B256, U256)> = order.inputs.iter().map(|i| (i.token, i.amount)).collect();

    let encoded = (
        order.user,
        order.source_chain.as_str().as_bytes().to_vec(),
        order.dest_chain.as_str().as_bytes().to_vec(),
        U256::from(order.deadline),
        U256::from(order.nonce),
        order.fees,
        outputs,
        inputs,
        order.call_data.to_vec(),
    )
        .abi_encode();

    keccak256(encoded)
}

/// `getRequestCommitment(req)`: keccak256 of the ABI-encoded GetRequest tuple.
pub fn get_request_commitment(req: &GetRequest) -> B256 {
    let keys: Vec<Vec<u8>> = req.keys.iter().map(|k| k.to_vec()).collect();

    let encoded = (
        req.source.as_bytes().to_vec(),
        req.dest.as_bytes().to_vec(),
        req.nonce,
        req.from,
        req.timeout_timestamp,
        keys,
        req.height,
        req.context.to_vec(),
    )
        .abi_encode();

    keccak256(encoded)
}

/// `postRequestCommitment(req)`: keccak256 of the ABI-encoded PostRequest tuple.
pub fn post_request_commitment(req: &PostRequest) -> B256 {
    let encoded = (
        req.source.as_bytes().to_vec(),
        req.dest.as_bytes().to_vec(),
        req.nonce,
        req.from,
        req.to,
        req.timeout_timestamp,
        req.body.to_vec(),
    )
        .abi_encode();

    keccak256(encoded)
}

/// `commitmentSlotHash(commitment)`: `keccak256(commitment ∥ u256(5))`.
///
/// This is the storage slot at which a commitment's "filled" marker lives
/// in the order-filled mapping (mapping slot index 5), see spec.md §4.3
/// `check_if_order_filled`.
pub fn commitment_slot_hash(commitment: B256) -> B256 {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(commitment.as_slice());
    buf.extend_from_slice(&U256::from(5u8).to_be_bytes::<32>());
    keccak256(buf)
}

/// `stateCommitmentSlots(paraId, height)`: returns `(base, overlay, stateRoot)`
/// where `base = keccak256(height32 ∥ keccak256(paraId32 ∥ u256(5)))`,
/// `overlay = base + 1`, `stateRoot = base + 2`.
pub fn state_commitment_slots(para_id: u32, height: u64) -> (B256, B256, B256) {
    let mut inner = Vec::with_capacity(64);
    inner.extend_from_slice(&U256::from(para_id).to_be_bytes::<32>());
    inner.extend_from_slice(&U256::from(5u8).to_be_bytes::<32>());
    let inner_hash = keccak256(inner);

    let mut outer = Vec::with_capacity(64);
    outer.extend_from_slice(&U256::from(height).to_be_bytes::<32>());
    outer.extend_from_slice(inner_hash.as_slice());
    let base = keccak256(outer);

    let base_u256 = U256::from_be_bytes(base.0);
    let overlay = B256::from((base_u256 + U256::from(1u8)).to_be_bytes::<32>());
    let state_root = B256::from((base_u256 + U256::from(2u8)).to_be_bytes::<32>());

    (base, overlay, state_root)
}

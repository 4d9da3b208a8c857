//! Core data model: orders, chain configuration, and scheduler-internal state.
//!
//! Types here are plain data — no I/O. Token references use the 32-byte
//! left-padded form everywhere except at the edges of [`ContractInteractionService`]
//! (`super::contract_interaction`), which talks to 20-byte EVM addresses.

use alloy::primitives::{Address, B256, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The zero-valued 32-byte token reference, denoting the native token of its chain.
pub const NATIVE_TOKEN: B256 = B256::ZERO;

/// Textual state-machine identifier for a chain, e.g. `"EVM-97"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateMachineId(String);

impl StateMachineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateMachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StateMachineId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StateMachineId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Convert a 20-byte EVM address to its left-padded 32-byte form.
pub fn bytes20_to_bytes32(addr: Address) -> B256 {
    let mut out = [0u8; 32];
    out[12..].copy_from_slice(addr.as_slice());
    B256::from(out)
}

/// Convert a left-padded 32-byte token reference back to a 20-byte address.
///
/// Returns `None` if the upper 12 bytes are non-zero (the value does not
/// round-trip through [`bytes20_to_bytes32`]).
pub fn bytes32_to_bytes20(value: B256) -> Option<Address> {
    let bytes = value.as_slice();
    if bytes[..12].iter().any(|b| *b != 0) {
        return None;
    }
    Some(Address::from_slice(&bytes[12..]))
}

/// `{token, amount}` — an escrowed input on the source chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub token: B256,
    pub amount: U256,
}

/// `{token, amount, beneficiary}` — a delivery owed on the destination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub token: B256,
    pub amount: U256,
    pub beneficiary: B256,
}

/// A user intent placed on `source_chain` to be satisfied on `dest_chain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub user: B256,
    pub source_chain: StateMachineId,
    pub dest_chain: StateMachineId,
    /// Monotonic deadline, in seconds.
    pub deadline: u64,
    /// Unique per user.
    pub nonce: u64,
    /// Amount in the source-chain fee token.
    pub fees: U256,
    pub inputs: Vec<TokenInfo>,
    pub outputs: Vec<PaymentInfo>,
    pub call_data: Bytes,
    /// The deterministic commitment hash, once computed.
    pub id: Option<B256>,
    pub transaction_hash: Option<B256>,
}

impl Order {
    /// `len(inputs) == len(outputs)` — the shape invariant required before any
    /// other validation or RPC call. A mismatch is a rejection, not a panic.
    pub fn shape_is_valid(&self) -> bool {
        self.inputs.len() == self.outputs.len()
    }
}

/// `{chainId, rpcUrl, intentGatewayAddress}` — read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub intent_gateway_address: Address,
}

/// Per-chain confirmation-policy thresholds, see [`super::confirmation::ConfirmationPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationThresholds {
    pub min_amount: u64,
    pub max_amount: u64,
    pub min_confirmations: u32,
    pub max_confirmations: u32,
}

/// `{recheckDelayMs, maxRechecks}` for the scheduler's Pending queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingQueueConfig {
    pub recheck_delay_ms: u64,
    pub max_rechecks: u32,
}

impl Default for PendingQueueConfig {
    fn default() -> Self {
        Self { recheck_delay_ms: 30_000, max_rechecks: 10 }
    }
}

/// Retry policy applied to transient (RPC/simulation) failures during fill execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// `{confirmationPolicy, maxConcurrentOrders, pendingQueueConfig, retryConfig}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillerConfig {
    pub max_concurrent_orders: usize,
    pub pending_queue_config: PendingQueueConfig,
    pub retry_config: RetryConfig,
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_orders: 16,
            pending_queue_config: PendingQueueConfig::default(),
            retry_config: RetryConfig::default(),
        }
    }
}

/// Scheduler-internal lifecycle state for a tracked order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderState {
    Pending,
    InFlight,
    Filled,
    Failed,
    Rejected,
    Expired,
}

/// Scheduler-internal bookkeeping wrapping an [`Order`].
#[derive(Debug, Clone)]
pub struct OrderExecutionState {
    pub order: Order,
    pub attempts: u32,
    pub first_seen_at: u64,
    pub last_checked_at: u64,
    pub state: OrderState,
    /// Block number at which the order was first observed; used by the
    /// pending-queue recheck loop to evaluate confirmation depth.
    pub block_seen_at: u64,
    /// Count of pending-queue rechecks performed without transitioning to InFlight.
    pub rechecks: u32,
}

impl OrderExecutionState {
    pub fn new(order: Order, now: u64, block_seen_at: u64) -> Self {
        Self {
            order,
            attempts: 0,
            first_seen_at: now,
            last_checked_at: now,
            state: OrderState::Pending,
            block_seen_at,
            rechecks: 0,
        }
    }
}

/// A state proof produced by the bridge's `ProofSource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IProof {
    pub height: u64,
    pub state_machine: String,
    pub consensus_state_id: String,
    pub proof: Bytes,
}

/// Strictly non-decreasing request lifecycle status.
///
/// Ordering matches spec.md §3: `Source < SourceFinalized <
/// HyperbridgeDelivered < HyperbridgeFinalized < Destination`, with the
/// timeout variants forming an analogous but distinct terminal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Source,
    SourceFinalized,
    HyperbridgeDelivered,
    HyperbridgeFinalized,
    Destination,
    TimedOut,
    HyperbridgeTimedOut,
}

impl RequestStatus {
    /// Terminal statuses end the status stream (§4.9).
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Destination | RequestStatus::TimedOut | RequestStatus::HyperbridgeTimedOut)
    }
}

/// Metadata accompanying a [`RequestStatus`] transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMetadata {
    pub block_hash: B256,
    pub block_number: u64,
    pub tx_hash: B256,
    pub calldata: Option<Bytes>,
}

/// A single emission from a [`super::external::StatusStreamProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatusWithMetadata {
    pub status: RequestStatus,
    pub meta: BlockMetadata,
}

/// A cross-chain `GetRequest`, as parsed from a `GetRequestEvent` log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    pub source: String,
    pub dest: String,
    pub nonce: u64,
    pub from: Address,
    pub timeout_timestamp: u64,
    pub keys: Vec<Bytes>,
    pub height: u64,
    pub context: Bytes,
}

/// Result of a completed fill transaction (§4.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    pub tx_hash: Option<B256>,
    pub gas_used: Option<u64>,
    pub gas_price: Option<u128>,
    pub confirmed_at_block: Option<u64>,
    pub processing_time_ms: u64,
    pub error: Option<String>,
    /// Whether a failed attempt is worth retrying (RPC/simulation hiccups)
    /// versus terminal (validation, insufficient balance, already filled).
    /// Ignored when `success` is `true`. See §7's error taxonomy.
    pub retriable: bool,
}

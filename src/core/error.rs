//! Error taxonomy, per spec.md §7.
//!
//! Each component gets its own `thiserror` enum so callers can match on
//! specific failure kinds without downcasting. The propagation policy
//! (what's retriable, what's terminal) lives with the callers (scheduler,
//! canceller) that interpret these kinds — these types only carry data.

use alloy::primitives::{Address, B256};
use thiserror::Error;

/// ConfigError kinds: unknown chain, missing address, malformed policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfirmationError {
    #[error("unknown chain: {0}")]
    UnknownChain(u64),
    #[error("malformed confirmation policy for chain {chain_id}: minAmount {min_amount} > maxAmount {max_amount}")]
    MalformedPolicy { chain_id: u64, min_amount: u64, max_amount: u64 },
}

/// Errors from [`super::swap_router`] quoting and swap composition.
#[derive(Debug, Error)]
pub enum SwapRouterError {
    #[error("no route found between {token_in} and {token_out} on any protocol")]
    NoRouteFound { token_in: Address, token_out: Address },
    #[error("rpc error while quoting: {0}")]
    Rpc(String),
    #[error("USDC is not a supported endpoint for create_complete_swap; use create_swap")]
    UsdcEndpointRejected,
}

/// Errors from [`super::contract_interaction`].
#[derive(Debug, Error)]
pub enum ContractInteractionError {
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("simulation reverted: {0}")]
    Simulation(String),
    #[error("could not locate storage slot for token {0}")]
    SlotNotFound(Address),
}

/// Errors from [`super::intent_gateway`] fill-cost estimation.
#[derive(Debug, Error)]
pub enum FillEstimateError {
    #[error("gas estimation failed: {0}")]
    GasEstimation(#[from] ContractInteractionError),
    #[error("swap quoting failed: {0}")]
    Swap(#[from] SwapRouterError),
    #[error("arithmetic overflow computing fill estimate")]
    Overflow,
}

/// ValidationError / InsufficientBalance / StateConflict kinds from spec.md §4.5/§7.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FillStrategyError {
    #[error("order input/output length mismatch: {inputs} inputs vs {outputs} outputs")]
    ShapeMismatch { inputs: usize, outputs: usize },
    #[error("unsupported token: {0}")]
    UnsupportedToken(B256),
    #[error("token kind mismatch between input {input} and output {output}")]
    TokenKindMismatch { input: B256, output: B256 },
    #[error("decimal-equivalence mismatch between input and output amounts")]
    DecimalMismatch,
    #[error("insufficient filler balance for destination outputs")]
    InsufficientBalance,
    #[error("order already filled on-chain")]
    AlreadyFilled,
}

/// Errors from the [`super::scheduler::OrderScheduler`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler has been stopped; no further admissions accepted")]
    Stopped,
    #[error("order already tracked: {0}")]
    AlreadyTracked(B256),
    #[error(transparent)]
    Fill(#[from] FillStrategyError),
}

/// Errors from the [`super::canceller::Canceller`] state machine.
#[derive(Debug, Error)]
pub enum CancellerError {
    #[error("proof unavailable at height {height}, retry once the bridge observes a greater height")]
    ProofUnavailable { height: u64 },
    #[error("timeout waiting for {0}")]
    Timeout(String),
    #[error("fatal: durable state inconsistency for commitment {commitment}: {reason}")]
    Fatal { commitment: B256, reason: String },
    #[error("persistent store error: {0}")]
    Store(String),
    #[error("bridge error: {0}")]
    Bridge(String),
}

/// Errors from [`super::status_stream`].
#[derive(Debug, Error)]
pub enum StatusStreamError {
    #[error("indexer poll failed: {0}")]
    PollFailed(String),
    #[error("stream cancelled")]
    Cancelled,
}

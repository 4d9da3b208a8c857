//! External collaborator traits (spec.md §6).
//!
//! These are the seams the core depends on but does not implement:
//! chain configuration/address lookup, the bridge's own consensus and
//! submission surface, the indexer-backed status stream, and durable
//! key/value storage. Concrete implementations (RPC clients, an indexer
//! HTTP client, a database-backed store) are out of scope per spec.md §1.

use crate::core::commitment::PostRequest;
use crate::core::model::{GetRequest, RequestStatus, RequestStatusWithMetadata};
use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// `{address, decimals}` for a chain's fee, native-wrapped, or stablecoin token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAddressInfo {
    pub address: Address,
    pub decimals: u8,
}

/// Read-only per-chain facts, consumed by [`super::swap_router`],
/// [`super::contract_interaction`], and [`super::intent_gateway`].
///
/// Construction of the ABI-level calldata for specific contracts and the
/// registry's own backing store (addresses, RPC URLs, token lists) are
/// explicitly out of scope (spec.md §1 Non-goals) — this trait is the seam.
#[async_trait]
pub trait ChainRegistry: Send + Sync {
    async fn chain_config(&self, chain: &str) -> eyre::Result<super::model::ChainConfig>;
    async fn host_address(&self, chain: &str) -> eyre::Result<Address>;
    async fn handler_address(&self, chain: &str) -> eyre::Result<Address>;
    async fn intent_gateway_address(&self, chain: &str) -> eyre::Result<Address>;
    async fn fee_token(&self, chain: &str) -> eyre::Result<TokenAddressInfo>;
    async fn wrapped_native(&self, chain: &str) -> eyre::Result<TokenAddressInfo>;
    async fn dai(&self, chain: &str) -> eyre::Result<TokenAddressInfo>;
    async fn usdc(&self, chain: &str) -> eyre::Result<TokenAddressInfo>;
    async fn usdt(&self, chain: &str) -> eyre::Result<TokenAddressInfo>;
    async fn uniswap_v2_router(&self, chain: &str) -> eyre::Result<Address>;
    async fn uniswap_v2_factory(&self, chain: &str) -> eyre::Result<Address>;
    async fn uniswap_v3_factory(&self, chain: &str) -> eyre::Result<Address>;
    async fn uniswap_v3_quoter(&self, chain: &str) -> eyre::Result<Address>;
    async fn universal_router(&self, chain: &str) -> eyre::Result<Address>;
    async fn uniswap_v4_quoter(&self, chain: &str) -> eyre::Result<Address>;
    async fn permit2(&self, chain: &str) -> eyre::Result<Address>;
    async fn chain_id(&self, chain: &str) -> eyre::Result<u64>;
    async fn consensus_state_id(&self, chain: &str) -> eyre::Result<Bytes>;
    async fn popular_tokens(&self, chain: &str) -> eyre::Result<Vec<Address>>;
}

/// A `GetRequest` paired with its currently-known status, returned by
/// [`StatusStreamProvider::query_get_request_with_status`].
#[derive(Debug, Clone)]
pub struct GetRequestWithStatuses {
    pub request: GetRequest,
    pub statuses: Vec<RequestStatusWithMetadata>,
}

/// The indexer-backed, monotone status stream (spec.md §4.9 and §6).
///
/// The indexer backend itself is an external collaborator (spec.md §1
/// Non-goals); this trait is the only surface the core depends on.
#[async_trait]
pub trait StatusStreamProvider: Send + Sync {
    fn post_request_status_stream(&self, commitment: B256) -> BoxStream<'static, RequestStatusWithMetadata>;
    fn get_request_status_stream(&self, commitment: B256) -> BoxStream<'static, RequestStatusWithMetadata>;
    async fn query_get_request_with_status(
        &self,
        commitment: B256,
    ) -> eyre::Result<Option<GetRequestWithStatuses>>;
}

/// Bridge-chain height/challenge-period/receipt surface the core drives
/// during cancellation (spec.md §4.8 and §6). The bridge's own consensus
/// and proof generation are out of scope — the core treats it as this
/// `ProofSource`/`Submitter` pair.
#[async_trait]
pub trait BridgeChain: Send + Sync {
    async fn latest_state_machine_height(
        &self,
        state_id: &str,
        consensus_state_id: &str,
    ) -> eyre::Result<u64>;
    async fn query_request_receipt(&self, commitment: B256) -> eyre::Result<Option<Bytes>>;
    async fn submit_unsigned(&self, message: GetRequestMessage) -> eyre::Result<()>;
    async fn challenge_period(&self, state_id: &str) -> eyre::Result<u64>;
}

/// A `GetRequest` cancellation message, carrying proofs for both legs.
#[derive(Debug, Clone)]
pub struct GetRequestMessage {
    pub request: GetRequest,
    pub source_proof: super::model::IProof,
    pub response_proof: super::model::IProof,
}

/// Queries a remote chain for a state proof at a given height; failures
/// (height not yet finalized upstream) are distinguished from "unavailable".
#[async_trait]
pub trait ProofSource: Send + Sync {
    async fn query_state_proof(&self, chain: &str, height: u64) -> eyre::Result<Option<super::model::IProof>>;
    async fn query_request_proof(
        &self,
        commitment: B256,
        counterparty: &str,
        height: u64,
    ) -> eyre::Result<Option<super::model::IProof>>;
}

/// Constructs the canonical redeem-escrow `PostRequest` body for an order,
/// and estimates gas for `handlePostRequests`. A thin seam so
/// [`super::contract_interaction::ContractInteractionService`] does not
/// need to depend on concrete ABI bindings.
#[async_trait]
pub trait PostRequestBuilder: Send + Sync {
    async fn build_redeem_escrow_request(&self, order: &super::model::Order) -> eyre::Result<PostRequest>;
}

/// Durable key/value store for cancellation checkpoints (spec.md §4.8/§6).
#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn get(&self, key: &str) -> eyre::Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>) -> eyre::Result<()>;
    async fn delete(&self, key: &str) -> eyre::Result<()>;
    async fn list(&self, prefix: &str) -> eyre::Result<Vec<String>>;
}

/// Helper re-export so callers can name the expected status without importing
/// [`RequestStatus`] from `model` directly.
pub type Status = RequestStatus;

//! C7: OrderScheduler — the central concurrency and lifecycle coordinator
//! (spec.md §4.7).

use super::contract_interaction::ChainClient;
use super::error::{FillStrategyError, SchedulerError};
use super::external::ChainRegistry;
use super::fill_strategy::FillStrategy;
use super::intent_gateway::ProtocolFeeQuoter;
use super::model::{ExecutionResult, FillerConfig, Order, OrderExecutionState, OrderState};
use super::status_stream::{StatusPoller, StatusStream};
use super::swap_router::{AmmClient, SwapChainAddrs};
use crate::metrics::{self, OrderRejectedReason};
use alloy::primitives::{Address, B256};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// The scheduler's view of chain height, needed to evaluate confirmation
/// depth for Pending orders. The RPC client backing this is external.
#[async_trait::async_trait]
pub trait ChainHeight: Send + Sync {
    async fn latest_block_number(&self, chain: &str) -> eyre::Result<u64>;
}

/// Supplies the USD value used to look up required confirmations. Price
/// discovery is an external collaborator (spec.md §1 Non-goal); this is
/// the seam.
pub trait UsdValuer: Send + Sync {
    fn usd_value(&self, order: &Order) -> u64;
}

/// Per-order parameters needed to run `FillStrategy::execute`, supplied by
/// the caller at admission time (addresses/fee-token plumbing is outside
/// this component's responsibility — spec.md §4.7 only owns lifecycle).
#[derive(Debug, Clone)]
pub struct FillContext {
    pub source_addrs: SwapChainAddrs,
    pub dest_addrs: SwapChainAddrs,
    pub dest_fee_token: Address,
    pub weth: Address,
    pub dai: Address,
    pub gateway_address: Address,
    pub confirmation_chain_id: u64,
}

pub struct OrderScheduler<C, A, P, R, H, U, T>
where
    C: ChainClient + 'static,
    A: AmmClient + 'static,
    P: ProtocolFeeQuoter + 'static,
    R: ChainRegistry + 'static,
    H: ChainHeight + 'static,
    U: UsdValuer + 'static,
    T: StatusPoller + 'static,
{
    strategy: Arc<FillStrategy<C, A, P, R>>,
    confirmation_policy: Arc<super::confirmation::ConfirmationPolicy>,
    chain_height: Arc<H>,
    usd_valuer: Arc<U>,
    status_poller: Arc<T>,
    config: FillerConfig,
    tracked: Arc<Mutex<HashSet<B256>>>,
    pending: Arc<Mutex<VecDeque<OrderExecutionState>>>,
    done: Arc<Mutex<Vec<(B256, ExecutionResult)>>>,
    semaphore: Arc<Semaphore>,
    stopped: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl<C, A, P, R, H, U, T> OrderScheduler<C, A, P, R, H, U, T>
where
    C: ChainClient + 'static,
    A: AmmClient + 'static,
    P: ProtocolFeeQuoter + 'static,
    R: ChainRegistry + 'static,
    H: ChainHeight + 'static,
    U: UsdValuer + 'static,
    T: StatusPoller + 'static,
{
    pub fn new(
        strategy: FillStrategy<C, A, P, R>,
        confirmation_policy: super::confirmation::ConfirmationPolicy,
        chain_height: H,
        usd_valuer: U,
        status_poller: T,
        config: FillerConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            strategy: Arc::new(strategy),
            confirmation_policy: Arc::new(confirmation_policy),
            chain_height: Arc::new(chain_height),
            usd_valuer: Arc::new(usd_valuer),
            status_poller: Arc::new(status_poller),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_orders)),
            config,
            tracked: Arc::new(Mutex::new(HashSet::new())),
            pending: Arc::new(Mutex::new(VecDeque::new())),
            done: Arc::new(Mutex::new(Vec::new())),
            stopped: Arc::new(AtomicBool::new(false)),
            cancel,
        }
    }

    /// Admits `order` into the Pending queue if its shape is valid and its
    /// commitment is not already tracked (spec.md §4.7 step 1).
    #[instrument(skip(self, order), fields(commitment))]
    pub async fn admit(&self, order: Order, now: u64, block_seen_at: u64) -> Result<(), SchedulerError> {
        if self.stopped.load(Ordering::Acquire) {
            return Err(SchedulerError::Stopped);
        }
        if !order.shape_is_valid() {
            metrics::record_order_rejected(OrderRejectedReason::ShapeMismatch);
            return Err(SchedulerError::Fill(FillStrategyError::ShapeMismatch {
                inputs: order.inputs.len(),
                outputs: order.outputs.len(),
            }));
        }

        let commitment = super::commitment::order_commitment(&order);
        tracing::Span::current().record("commitment", tracing::field::display(commitment));

        {
            let mut tracked = self.tracked.lock().await;
            if !tracked.insert(commitment) {
                return Err(SchedulerError::AlreadyTracked(commitment));
            }
        }

        let state = OrderExecutionState::new(order, now, block_seen_at);
        self.pending.lock().await.push_back(state);
        metrics::record_order_admitted();
        debug!("admitted order to pending queue");
        Ok(())
    }

    /// Drives the Pending→InFlight poll loop until cancelled. Intended to be
    /// spawned as its own task.
    pub async fn run(self: Arc<Self>, fill_context: FillContext) {
        let mut tick = interval(Duration::from_millis(self.config.pending_queue_config.recheck_delay_ms));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("scheduler run loop observed cancellation");
                    break;
                }
                _ = tick.tick() => {
                    self.clone().recheck_pending(fill_context.clone()).await;
                }
            }
        }
    }

    async fn recheck_pending(self: Arc<Self>, fill_context: FillContext) {
        let ready_chain_height = match self.chain_height.latest_block_number(&fill_context.confirmation_chain_id.to_string()).await {
            Ok(height) => height,
            Err(error) => {
                warn!(%error, "failed to fetch chain height for pending recheck");
                return;
            }
        };

        let mut still_pending = VecDeque::new();
        let mut ready = Vec::new();

        {
            let mut pending = self.pending.lock().await;
            while let Some(mut state) = pending.pop_front() {
                let usd_value = self.usd_valuer.usd_value(&state.order);
                let required = match self.confirmation_policy.get_confirmation_blocks(fill_context.confirmation_chain_id, usd_value) {
                    Ok(n) => n,
                    Err(error) => {
                        warn!(%error, "confirmation policy lookup failed; dropping order");
                        continue;
                    }
                };

                if ready_chain_height >= state.block_seen_at + required as u64 {
                    state.state = OrderState::InFlight;
                    ready.push(state);
                } else {
                    state.rechecks += 1;
                    if state.rechecks >= self.config.pending_queue_config.max_rechecks {
                        state.state = OrderState::Expired;
                        let commitment = super::commitment::order_commitment(&state.order);
                        self.tracked.lock().await.remove(&commitment);
                        metrics::record_order_expired();
                        info!(%commitment, "order expired awaiting confirmations");
                        self.done.lock().await.push((
                            commitment,
                            ExecutionResult {
                                success: false,
                                tx_hash: None,
                                gas_used: None,
                                gas_price: None,
                                confirmed_at_block: None,
                                processing_time_ms: 0,
                                error: Some("order expired awaiting required confirmations".to_string()),
                                retriable: false,
                            },
                        ));
                    } else {
                        still_pending.push_back(state);
                    }
                }
            }
            *pending = still_pending;
        }

        metrics::record_pending_queue_depth(self.pending.lock().await.len());

        for state in ready {
            self.clone().spawn_fill(state, fill_context.clone());
        }
    }

    fn spawn_fill(self: Arc<Self>, mut state: OrderExecutionState, fill_context: FillContext) {
        let semaphore = self.semaphore.clone();
        tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else { return };
            let commitment = super::commitment::order_commitment(&state.order);
            let usd_value = self.usd_valuer.usd_value(&state.order);

            let result = self
                .strategy
                .execute(
                    state.order.clone(),
                    &fill_context.source_addrs,
                    &fill_context.dest_addrs,
                    fill_context.dest_fee_token,
                    fill_context.weth,
                    fill_context.dai,
                    fill_context.gateway_address,
                    &self.confirmation_policy,
                    usd_value,
                )
                .await;

            metrics::record_fill_duration(Duration::from_millis(result.processing_time_ms));

            if result.success {
                state.state = OrderState::Filled;
                metrics::record_order_filled();
                self.done.lock().await.push((commitment, result));
                self.tracked.lock().await.remove(&commitment);
                self.clone().spawn_post_fill_status_tracking(commitment);
                return;
            }

            if !result.retriable {
                state.state = OrderState::Rejected;
                metrics::record_order_rejected(OrderRejectedReason::FillRejected);
                self.done.lock().await.push((commitment, result));
                self.tracked.lock().await.remove(&commitment);
                warn!(%commitment, "fill attempt rejected, not retrying");
                return;
            }

            state.attempts += 1;
            if state.attempts < self.config.retry_config.max_attempts {
                state.state = OrderState::Pending;
                metrics::record_fill_retry();
                self.pending.lock().await.push_back(state);
                debug!(%commitment, "fill attempt failed, re-queued for retry");
            } else {
                state.state = OrderState::Failed;
                self.done.lock().await.push((commitment, result));
                self.tracked.lock().await.remove(&commitment);
                warn!(%commitment, "fill attempt exhausted retry budget");
            }
        });
    }

    /// Tracks a successfully-filled order's redeem-escrow post-request
    /// through the indexer's status stream (spec.md §2: "consumed both by
    /// the scheduler (post-fill tracking) and by the Canceller").
    fn spawn_post_fill_status_tracking(self: Arc<Self>, commitment: B256) {
        let status_poller = self.status_poller.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let stream = StatusStream::new(status_poller);
            let (tx, mut rx) = mpsc::channel(8);
            tokio::spawn(async move { while rx.recv().await.is_some() {} });
            stream.run(commitment, tx, cancel).await;
        });
    }

    /// Requests a stop: refuses new admissions and waits for the semaphore
    /// to drain (all InFlight permits returned), meaning every spawned fill
    /// task has completed (spec.md §4.7).
    pub async fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.cancel.cancel();
        let total = self.config.max_concurrent_orders;
        if let Ok(permits) = self.semaphore.acquire_many(total as u32).await {
            drop(permits);
        }
    }

    pub async fn done_count(&self) -> usize {
        self.done.lock().await.len()
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedHeight(u64);

    #[async_trait::async_trait]
    impl ChainHeight for FixedHeight {
        async fn latest_block_number(&self, _: &str) -> eyre::Result<u64> {
            Ok(self.0)
        }
    }

    struct ZeroValuer;
    impl UsdValuer for ZeroValuer {
        fn usd_value(&self, _order: &Order) -> u64 {
            0
        }
    }

    #[test]
    fn fill_context_is_cloneable() {
        let ctx = FillContext {
            source_addrs: SwapChainAddrs {
                wrapped_native: Address::ZERO,
                uniswap_v2_router: Address::ZERO,
                uniswap_v2_factory: Address::ZERO,
                uniswap_v3_factory: Address::ZERO,
                uniswap_v3_quoter: Address::ZERO,
                uniswap_v4_quoter: Address::ZERO,
                popular_tokens: vec![],
            },
            dest_addrs: SwapChainAddrs {
                wrapped_native: Address::ZERO,
                uniswap_v2_router: Address::ZERO,
                uniswap_v2_factory: Address::ZERO,
                uniswap_v3_factory: Address::ZERO,
                uniswap_v3_quoter: Address::ZERO,
                uniswap_v4_quoter: Address::ZERO,
                popular_tokens: vec![],
            },
            dest_fee_token: Address::ZERO,
            weth: Address::ZERO,
            dai: Address::ZERO,
            gateway_address: Address::ZERO,
            confirmation_chain_id: 1,
        };
        let _clone = ctx.clone();
    }

    use crate::core::commitment::PostRequest;
    use crate::core::confirmation::ConfirmationPolicy;
    use crate::core::contract_interaction::{ContractInteractionService, StateOverride};
    use crate::core::external::{ChainRegistry, TokenAddressInfo};
    use crate::core::fill_strategy::{FillStrategy, SupportedTokens};
    use crate::core::intent_gateway::{IntentGateway, ProtocolFeeQuoter};
    use crate::core::model::{ChainConfig, ConfirmationThresholds, PaymentInfo, StateMachineId, TokenInfo, NATIVE_TOKEN};
    use crate::core::status_stream::StatusPoller;
    use crate::core::swap_router::{AmmClient, PoolKey, SwapRouter, Tx};
    use alloy::primitives::{Bytes, U256};

    #[derive(Clone, Default)]
    struct FakeChainClient;

    #[async_trait::async_trait]
    impl ChainClient for FakeChainClient {
        async fn native_balance(&self, _: &str, _: Address) -> eyre::Result<U256> {
            Ok(U256::from(10_000_000_000_000_000_000u128))
        }
        async fn erc20_balance(&self, _: &str, _: Address, _: Address) -> eyre::Result<U256> {
            Ok(U256::from(10_000_000_000_000_000_000u128))
        }
        async fn erc20_decimals(&self, _: &str, _: Address) -> eyre::Result<u8> {
            Ok(6)
        }
        async fn erc20_allowance(&self, _: &str, _: Address, _: Address, _: Address) -> eyre::Result<U256> {
            Ok(U256::MAX)
        }
        async fn submit_approve_max(&self, _: &str, _: Address, _: Address) -> eyre::Result<B256> {
            Ok(B256::repeat_byte(1))
        }
        async fn read_storage_slot(&self, _: &str, _: Address, _: B256) -> eyre::Result<B256> {
            Ok(B256::ZERO)
        }
        async fn estimate_gas_fill_order(&self, _: &str, _: &Order, _: U256) -> eyre::Result<u64> {
            Ok(100_000)
        }
        async fn submit_fill_order(&self, _: &str, _: &Order, _: U256) -> eyre::Result<B256> {
            Ok(B256::repeat_byte(2))
        }
        async fn wait_for_confirmations(&self, _: &str, _: B256, _: u32) -> eyre::Result<(u64, u64, u128)> {
            Ok((10, 100_000, 1))
        }
        async fn estimate_gas_handle_post_requests(&self, _: &str, _: &PostRequest, _: &[StateOverride]) -> eyre::Result<u64> {
            Ok(80_000)
        }
        async fn host_nonce(&self, _: &str) -> eyre::Result<u64> {
            Ok(0)
        }
        async fn latest_state_machine_height(&self, _: &str) -> eyre::Result<u64> {
            Ok(1)
        }
        async fn handler_address(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn para_id(&self, _: &str) -> eyre::Result<u32> {
            Ok(1)
        }
        async fn mock_merkle_root(&self, _: usize) -> eyre::Result<B256> {
            Ok(B256::ZERO)
        }
    }

    #[derive(Clone, Default)]
    struct FakeAmmClient;

    #[async_trait::async_trait]
    impl AmmClient for FakeAmmClient {
        async fn v2_amounts_out(&self, _: &str, _: Address, amount_in: U256, _: &[Address]) -> eyre::Result<Vec<U256>> {
            Ok(vec![amount_in, amount_in])
        }
        async fn v2_amounts_in(&self, _: &str, _: Address, amount_out: U256, _: &[Address]) -> eyre::Result<Vec<U256>> {
            Ok(vec![amount_out, amount_out])
        }
        async fn v3_get_pool(&self, _: &str, _: Address, _: Address, _: Address, _: u32) -> eyre::Result<Option<Address>> {
            Ok(None)
        }
        async fn v3_pool_liquidity(&self, _: &str, _: Address) -> eyre::Result<u128> {
            Ok(0)
        }
        async fn v3_quote_exact_input_single(&self, _: &str, _: Address, _: Address, _: Address, _: u32, _: U256) -> eyre::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn v3_quote_exact_output_single(&self, _: &str, _: Address, _: Address, _: Address, _: u32, _: U256) -> eyre::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn v4_quote_exact_input_single(&self, _: &str, _: Address, _: PoolKey, _: bool, _: U256) -> eyre::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn v4_quote_exact_output_single(&self, _: &str, _: Address, _: PoolKey, _: bool, _: U256) -> eyre::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn pair_liquidity(&self, _: &str, _: super::super::swap_router::Protocol, _: Address, _: Address) -> eyre::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn build_swap_calldata(
            &self,
            _: &str,
            _: super::super::swap_router::Protocol,
            _: Address,
            _: Address,
            _: U256,
            _: U256,
            _: Address,
        ) -> eyre::Result<Tx> {
            Ok(Tx { to: Address::ZERO, value: U256::ZERO, calldata: Bytes::new() })
        }
    }

    struct FakeFeeQuoter;

    #[async_trait::async_trait]
    impl ProtocolFeeQuoter for FakeFeeQuoter {
        async fn quote_native(&self, _: &str, _: &PostRequest, _: U256) -> eyre::Result<U256> {
            Ok(U256::from(1_000u64))
        }
    }

    struct FakeRegistry {
        fail_fee_token: bool,
    }

    #[async_trait::async_trait]
    impl ChainRegistry for FakeRegistry {
        async fn chain_config(&self, _: &str) -> eyre::Result<ChainConfig> {
            Ok(ChainConfig { chain_id: 1, rpc_url: String::new(), intent_gateway_address: Address::ZERO })
        }
        async fn host_address(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn handler_address(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn intent_gateway_address(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn fee_token(&self, _: &str) -> eyre::Result<TokenAddressInfo> {
            if self.fail_fee_token {
                eyre::bail!("fee token lookup failed");
            }
            Ok(TokenAddressInfo { address: Address::repeat_byte(3), decimals: 6 })
        }
        async fn wrapped_native(&self, _: &str) -> eyre::Result<TokenAddressInfo> {
            Ok(TokenAddressInfo { address: Address::repeat_byte(4), decimals: 18 })
        }
        async fn dai(&self, _: &str) -> eyre::Result<TokenAddressInfo> {
            Ok(TokenAddressInfo { address: Address::repeat_byte(5), decimals: 18 })
        }
        async fn usdc(&self, _: &str) -> eyre::Result<TokenAddressInfo> {
            Ok(TokenAddressInfo { address: Address::repeat_byte(6), decimals: 6 })
        }
        async fn usdt(&self, _: &str) -> eyre::Result<TokenAddressInfo> {
            Ok(TokenAddressInfo { address: Address::repeat_byte(7), decimals: 6 })
        }
        async fn uniswap_v2_router(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn uniswap_v2_factory(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn uniswap_v3_factory(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn uniswap_v3_quoter(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn universal_router(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn uniswap_v4_quoter(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn permit2(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::ZERO)
        }
        async fn chain_id(&self, _: &str) -> eyre::Result<u64> {
            Ok(1)
        }
        async fn consensus_state_id(&self, _: &str) -> eyre::Result<Bytes> {
            Ok(Bytes::new())
        }
        async fn popular_tokens(&self, _: &str) -> eyre::Result<Vec<Address>> {
            Ok(vec![])
        }
    }

    struct FakeStatusPoller;

    #[async_trait::async_trait]
    impl StatusPoller for FakeStatusPoller {
        async fn poll_status(&self, _: B256) -> eyre::Result<Option<crate::core::model::RequestStatusWithMetadata>> {
            Ok(None)
        }
    }

    fn native_order(nonce: u64) -> Order {
        Order {
            user: B256::ZERO,
            source_chain: StateMachineId::new("EVM-97"),
            dest_chain: StateMachineId::new("EVM-10200"),
            deadline: 0,
            nonce,
            fees: U256::ZERO,
            inputs: vec![TokenInfo { token: NATIVE_TOKEN, amount: U256::from(1) }],
            outputs: vec![PaymentInfo { token: NATIVE_TOKEN, amount: U256::from(1), beneficiary: B256::ZERO }],
            call_data: Bytes::new(),
            id: None,
            transaction_hash: None,
        }
    }

    fn unsupported_order() -> Order {
        Order {
            user: B256::ZERO,
            source_chain: StateMachineId::new("EVM-97"),
            dest_chain: StateMachineId::new("EVM-10200"),
            deadline: 0,
            nonce: 0,
            fees: U256::ZERO,
            inputs: vec![TokenInfo { token: B256::repeat_byte(9), amount: U256::from(1) }],
            outputs: vec![PaymentInfo { token: B256::repeat_byte(9), amount: U256::from(1), beneficiary: B256::ZERO }],
            call_data: Bytes::new(),
            id: None,
            transaction_hash: None,
        }
    }

    #[allow(clippy::type_complexity)]
    fn make_scheduler(
        max_rechecks: u32,
        max_attempts: u32,
        chain_height: u64,
        fail_fee_token: bool,
    ) -> Arc<OrderScheduler<FakeChainClient, FakeAmmClient, FakeFeeQuoter, FakeRegistry, FixedHeight, ZeroValuer, FakeStatusPoller>> {
        let contracts_a = ContractInteractionService::new(FakeChainClient, Address::ZERO);
        let contracts_b = ContractInteractionService::new(FakeChainClient, Address::ZERO);
        let swap_router = SwapRouter::new(FakeAmmClient);
        let gateway = IntentGateway::new(contracts_a, swap_router, FakeFeeQuoter, Address::ZERO);
        let strategy = FillStrategy::new(contracts_b, gateway, FakeRegistry { fail_fee_token }, SupportedTokens::new());

        let config = FillerConfig {
            max_concurrent_orders: 4,
            pending_queue_config: super::super::model::PendingQueueConfig { recheck_delay_ms: 1, max_rechecks },
            retry_config: super::super::model::RetryConfig { max_attempts },
        };

        let confirmation_policy = ConfirmationPolicy::new()
            .with_chain(
                1,
                ConfirmationThresholds { min_amount: 0, max_amount: u64::MAX, min_confirmations: 5, max_confirmations: 5 },
            )
            .unwrap();

        Arc::new(OrderScheduler::new(
            strategy,
            confirmation_policy,
            FixedHeight(chain_height),
            ZeroValuer,
            FakeStatusPoller,
            config,
            CancellationToken::new(),
        ))
    }

    fn fill_context() -> FillContext {
        FillContext {
            source_addrs: SwapChainAddrs {
                wrapped_native: Address::ZERO,
                uniswap_v2_router: Address::ZERO,
                uniswap_v2_factory: Address::ZERO,
                uniswap_v3_factory: Address::ZERO,
                uniswap_v3_quoter: Address::ZERO,
                uniswap_v4_quoter: Address::ZERO,
                popular_tokens: vec![],
            },
            dest_addrs: SwapChainAddrs {
                wrapped_native: Address::ZERO,
                uniswap_v2_router: Address::ZERO,
                uniswap_v2_factory: Address::ZERO,
                uniswap_v3_factory: Address::ZERO,
                uniswap_v3_quoter: Address::ZERO,
                uniswap_v4_quoter: Address::ZERO,
                popular_tokens: vec![],
            },
            dest_fee_token: Address::ZERO,
            weth: Address::ZERO,
            dai: Address::ZERO,
            gateway_address: Address::ZERO,
            confirmation_chain_id: 1,
        }
    }

    #[tokio::test]
    async fn admit_rejects_duplicate_commitment() {
        let scheduler = make_scheduler(10, 3, 0, false);
        let order = native_order(1);
        scheduler.admit(order.clone(), 0, 0).await.unwrap();
        let err = scheduler.admit(order, 0, 0).await.unwrap_err();
        assert!(matches!(err, SchedulerError::AlreadyTracked(_)));
    }

    #[tokio::test]
    async fn admit_rejects_shape_mismatch_without_tracking() {
        let scheduler = make_scheduler(10, 3, 0, false);
        let mut order = native_order(1);
        order.outputs.clear();
        let err = scheduler.admit(order, 0, 0).await.unwrap_err();
        assert!(matches!(err, SchedulerError::Fill(FillStrategyError::ShapeMismatch { .. })));
        assert_eq!(scheduler.pending_count().await, 0);
    }

    #[tokio::test]
    async fn recheck_pending_requeues_when_confirmations_insufficient() {
        let scheduler = make_scheduler(10, 3, 0, false);
        scheduler.admit(native_order(1), 0, 0).await.unwrap();
        scheduler.clone().recheck_pending(fill_context()).await;
        assert_eq!(scheduler.pending_count().await, 1);
        assert_eq!(scheduler.done_count().await, 0);
    }

    #[tokio::test]
    async fn recheck_pending_expires_and_records_a_result_after_max_rechecks() {
        let scheduler = make_scheduler(1, 3, 0, false);
        scheduler.admit(native_order(1), 0, 0).await.unwrap();
        scheduler.clone().recheck_pending(fill_context()).await;
        assert_eq!(scheduler.pending_count().await, 0);
        assert_eq!(scheduler.done_count().await, 1);
    }

    #[tokio::test]
    async fn recheck_pending_promotes_ready_orders_and_retries_transient_failure() {
        let scheduler = make_scheduler(10, 2, 1_000, true);
        scheduler.admit(native_order(1), 0, 0).await.unwrap();
        scheduler.clone().recheck_pending(fill_context()).await;
        assert_eq!(scheduler.pending_count().await, 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(scheduler.pending_count().await, 1);
        assert_eq!(scheduler.done_count().await, 0);
    }

    #[tokio::test]
    async fn spawn_fill_rejects_unsupported_token_without_retry() {
        let scheduler = make_scheduler(10, 3, 1_000, false);
        scheduler.admit(unsupported_order(), 0, 0).await.unwrap();
        scheduler.clone().recheck_pending(fill_context()).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(scheduler.pending_count().await, 0);
        assert_eq!(scheduler.done_count().await, 1);
    }
}

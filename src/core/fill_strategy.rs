//! C5: FillStrategy — decide can-fill and execute the fill (spec.md §4.5).

use super::contract_interaction::{ChainClient, ContractInteractionService};
use super::error::FillStrategyError;
use super::external::ChainRegistry;
use super::intent_gateway::{IntentGateway, ProtocolFeeQuoter};
use super::model::{ExecutionResult, Order, NATIVE_TOKEN};
use super::swap_router::{AmmClient, SwapChainAddrs};
use alloy::primitives::{Address, B256, U256};
use std::collections::HashSet;
use std::time::Instant;

/// The kinds of token a supported token can be — pairwise kind must match
/// between an order's input and output (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Native,
    Weth,
    Dai,
    Usdc,
    Usdt,
}

/// The supported-token registry for a single chain: which 32-byte token
/// references are recognized, and what kind each is.
#[derive(Debug, Clone, Default)]
pub struct SupportedTokens {
    kinds: std::collections::HashMap<B256, TokenKind>,
}

impl SupportedTokens {
    pub fn new() -> Self {
        let mut kinds = std::collections::HashMap::new();
        kinds.insert(NATIVE_TOKEN, TokenKind::Native);
        Self { kinds }
    }

    pub fn with_token(mut self, token: B256, kind: TokenKind) -> Self {
        self.kinds.insert(token, kind);
        self
    }

    pub fn kind_of(&self, token: B256) -> Option<TokenKind> {
        self.kinds.get(&token).copied()
    }

    /// Native and wrapped-native are fungible for kind-matching purposes
    /// (spec.md §4.5: "WETH↔native/WETH").
    fn kinds_compatible(a: TokenKind, b: TokenKind) -> bool {
        a == b || matches!((a, b), (TokenKind::Native, TokenKind::Weth) | (TokenKind::Weth, TokenKind::Native))
    }
}

/// `compareDecimalValues`: left-scales both sides to the higher decimal
/// count before comparing. Symmetric and reflexive by construction
/// (spec.md §8 invariant 2).
pub fn compare_decimal_values(a: U256, decimals_a: u8, b: U256, decimals_b: u8) -> bool {
    let max_decimals = decimals_a.max(decimals_b);
    let scaled_a = super::intent_gateway::adjust_decimals(a, decimals_a, max_decimals);
    let scaled_b = super::intent_gateway::adjust_decimals(b, decimals_b, max_decimals);
    scaled_a == scaled_b
}

pub struct FillStrategy<C: ChainClient, A: AmmClient, P: ProtocolFeeQuoter, R: ChainRegistry> {
    contracts: ContractInteractionService<C>,
    gateway: IntentGateway<C, A, P>,
    registry: R,
    supported: SupportedTokens,
}

impl<C: ChainClient, A: AmmClient, P: ProtocolFeeQuoter, R: ChainRegistry> FillStrategy<C, A, P, R> {
    pub fn new(
        contracts: ContractInteractionService<C>,
        gateway: IntentGateway<C, A, P>,
        registry: R,
        supported: SupportedTokens,
    ) -> Self {
        Self { contracts, gateway, registry, supported }
    }

    /// Shape, support-set, kind, and decimal-equivalence checks — all
    /// local, no RPC (spec.md §8 boundary: "rejected without any RPC call").
    pub fn validate_order_inputs_outputs(
        &self,
        order: &Order,
        input_decimals: impl Fn(B256) -> u8,
        output_decimals: impl Fn(B256) -> u8,
    ) -> Result<(), FillStrategyError> {
        if !order.shape_is_valid() {
            return Err(FillStrategyError::ShapeMismatch { inputs: order.inputs.len(), outputs: order.outputs.len() });
        }

        for (input, output) in order.inputs.iter().zip(order.outputs.iter()) {
            let input_kind = self
                .supported
                .kind_of(input.token)
                .ok_or(FillStrategyError::UnsupportedToken(input.token))?;
            let output_kind = self
                .supported
                .kind_of(output.token)
                .ok_or(FillStrategyError::UnsupportedToken(output.token))?;

            if !SupportedTokens::kinds_compatible(input_kind, output_kind) {
                return Err(FillStrategyError::TokenKindMismatch { input: input.token, output: output.token });
            }

            let in_decimals = input_decimals(input.token);
            let out_decimals = output_decimals(output.token);
            if !compare_decimal_values(input.amount, in_decimals, output.amount, out_decimals) {
                return Err(FillStrategyError::DecimalMismatch);
            }
        }
        Ok(())
    }

    /// Validates, checks balance sufficiency, and checks not-already-filled
    /// (spec.md §4.5).
    pub async fn can_fill(
        &self,
        order: &Order,
        input_decimals: impl Fn(B256) -> u8,
        output_decimals: impl Fn(B256) -> u8,
        gateway_address: Address,
    ) -> Result<(), FillStrategyError> {
        self.validate_order_inputs_outputs(order, input_decimals, output_decimals)?;

        if !self.contracts.check_token_balances(order.dest_chain.as_str(), &order.outputs).await {
            return Err(FillStrategyError::InsufficientBalance);
        }

        let commitment = super::commitment::order_commitment(order);
        let filled = self
            .contracts
            .check_if_order_filled(order.dest_chain.as_str(), gateway_address, commitment)
            .await
            .unwrap_or(false);
        if filled {
            return Err(FillStrategyError::AlreadyFilled);
        }

        Ok(())
    }

    /// Executes a validated, fillable order end to end (spec.md §4.5).
    pub async fn execute(
        &self,
        mut order: Order,
        source_addrs: &SwapChainAddrs,
        dest_addrs: &SwapChainAddrs,
        dest_fee_token: Address,
        weth: Address,
        dai: Address,
        gateway_address: Address,
        confirmation_policy: &super::confirmation::ConfirmationPolicy,
        usd_value: u64,
    ) -> ExecutionResult {
        let started = Instant::now();

        let mut input_decimals: std::collections::HashMap<B256, u8> = std::collections::HashMap::new();
        for input in &order.inputs {
            let addr = super::model::bytes32_to_bytes20(input.token).unwrap_or(Address::ZERO);
            input_decimals.insert(input.token, self.contracts.token_decimals(order.source_chain.as_str(), addr).await);
        }
        let mut output_decimals: std::collections::HashMap<B256, u8> = std::collections::HashMap::new();
        for output in &order.outputs {
            let addr = super::model::bytes32_to_bytes20(output.token).unwrap_or(Address::ZERO);
            output_decimals.insert(output.token, self.contracts.token_decimals(order.dest_chain.as_str(), addr).await);
        }

        if let Err(error) = self
            .can_fill(
                &order,
                |token| input_decimals.get(&token).copied().unwrap_or(18),
                |token| output_decimals.get(&token).copied().unwrap_or(18),
                gateway_address,
            )
            .await
        {
            return rejected_result(started, error.to_string());
        }

        let source_fee_token = match self.registry.fee_token(order.source_chain.as_str()).await {
            Ok(t) => t,
            Err(error) => return failed_result(started, error.to_string()),
        };
        let dest_fee_token_info = match self.registry.fee_token(order.dest_chain.as_str()).await {
            Ok(t) => t,
            Err(error) => return failed_result(started, error.to_string()),
        };

        if let Err(error) = self
            .contracts
            .approve_tokens_if_needed(order.source_chain.as_str(), gateway_address, &order, source_fee_token.address)
            .await
        {
            return failed_result(started, error.to_string());
        }

        let estimate = match self
            .gateway
            .estimate_fill_cost(
                &order,
                source_addrs,
                dest_addrs,
                source_fee_token.address,
                dest_fee_token,
                source_fee_token.decimals,
                dest_fee_token_info.decimals,
                weth,
                dai,
            )
            .await
        {
            Ok(e) => e,
            Err(error) => return failed_result(started, error.to_string()),
        };
        order.fees = estimate.fee_token_amount;

        let native_value = ContractInteractionService::<C>::calculate_required_eth_value(&order.outputs) + estimate.native_token_amount;
        let chain_id = match self.registry.chain_id(order.dest_chain.as_str()).await {
            Ok(id) => id,
            Err(error) => return failed_result(started, error.to_string()),
        };

        let required_confirmations = match confirmation_policy.get_confirmation_blocks(chain_id, usd_value) {
            Ok(n) => n,
            Err(error) => return failed_result(started, error.to_string()),
        };

        let tx_hash = match self.contracts_submit_fill(&order, native_value).await {
            Ok(hash) => hash,
            Err(error) => return failed_result(started, error),
        };

        match self.contracts_wait_for_confirmations(&order, tx_hash, required_confirmations).await {
            Ok((confirmed_at_block, gas_used, gas_price)) => ExecutionResult {
                success: true,
                tx_hash: Some(tx_hash),
                gas_used: Some(gas_used),
                gas_price: Some(gas_price),
                confirmed_at_block: Some(confirmed_at_block),
                processing_time_ms: started.elapsed().as_millis() as u64,
                error: None,
                retriable: false,
            },
            Err(error) => failed_result(started, error),
        }
    }

    async fn contracts_submit_fill(&self, order: &Order, value: U256) -> Result<B256, String> {
        self.contracts.submit_fill(order, value).await.map_err(|e| e.to_string())
    }

    async fn contracts_wait_for_confirmations(
        &self,
        order: &Order,
        tx_hash: B256,
        confirmations: u32,
    ) -> Result<(u64, u64, u128), String> {
        self.contracts.wait_for_confirmations(order, tx_hash, confirmations).await.map_err(|e| e.to_string())
    }

    /// Batch variant atomically filling several orders in one task
    /// (an additive feature beyond the per-order `execute`; see the
    /// bundle-style multi-order fill in the crate's module map).
    pub async fn execute_many(
        &self,
        orders: Vec<Order>,
        source_addrs: &SwapChainAddrs,
        dest_addrs: &SwapChainAddrs,
        dest_fee_token: Address,
        weth: Address,
        dai: Address,
        gateway_address: Address,
        confirmation_policy: &super::confirmation::ConfirmationPolicy,
        usd_values: &[u64],
    ) -> Vec<ExecutionResult> {
        let mut results = Vec::with_capacity(orders.len());
        let mut seen: HashSet<B256> = HashSet::new();
        for (order, usd_value) in orders.into_iter().zip(usd_values.iter().copied()) {
            let commitment = super::commitment::order_commitment(&order);
            if !seen.insert(commitment) {
                continue;
            }
            let result = self
                .execute(order, source_addrs, dest_addrs, dest_fee_token, weth, dai, gateway_address, confirmation_policy, usd_value)
                .await;
            results.push(result);
        }
        results
    }
}

/// A transient (RPC/simulation) failure, worth retrying.
fn failed_result(started: Instant, error: String) -> ExecutionResult {
    ExecutionResult {
        success: false,
        tx_hash: None,
        gas_used: None,
        gas_price: None,
        confirmed_at_block: None,
        processing_time_ms: started.elapsed().as_millis() as u64,
        error: Some(error),
        retriable: true,
    }
}

/// A non-retriable failure from `can_fill`'s precondition gate: validation,
/// insufficient balance, or already-filled (spec.md §4.7/§7).
fn rejected_result(started: Instant, error: String) -> ExecutionResult {
    ExecutionResult {
        success: false,
        tx_hash: None,
        gas_used: None,
        gas_price: None,
        confirmed_at_block: None,
        processing_time_ms: started.elapsed().as_millis() as u64,
        error: Some(error),
        retriable: false,
    }
}

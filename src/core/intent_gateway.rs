//! C4: IntentGateway fill estimator — the full cost of satisfying an order,
//! in both source fee-token and destination native-token terms (spec.md §4.4).
//!
//! The eleven-step algorithm mixes three cost centers (destination fill gas,
//! bridge protocol fee, source redeem-gas paid as relayer fee) across
//! heterogeneous token decimals. All conversions are exact integer
//! arithmetic over `U256`; nothing here touches `f64`.

use super::commitment::PostRequest;
use super::contract_interaction::{ChainClient, ContractInteractionService, FALLBACK_FILL_GAS};
use super::error::FillEstimateError;
use super::model::Order;
use super::swap_router::{AmmClient, Protocol, SwapChainAddrs, SwapRouter};
use alloy::primitives::{Address, Bytes, U256};

/// Flat relayer-fee pad, `0.25 * 10^(decimals-2)` in the fee token's base
/// units, i.e. `10^decimals / 400` (magic constant, faithfully preserved;
/// provenance undocumented upstream).
pub fn relayer_fee_pad(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals as u64)) / U256::from(400u32)
}

/// Route-dependent safety margin applied to `(feeTokenAmount, nativeTokenAmount)`:
/// +30%/+32% when either endpoint is mainnet ("EVM-1"), else +2.5%/+3.5%
/// (spec.md §4.4 step 10, §9: magic constants, provenance undocumented).
pub fn safety_margin_bps(source_chain: &str, dest_chain: &str) -> (u32, u32) {
    if source_chain == "EVM-1" || dest_chain == "EVM-1" { (3_000, 3_200) } else { (250, 350) }
}

/// Left-scales `amount` from `from_decimals` to `to_decimals` without loss
/// when scaling up; truncates (floor) when scaling down.
pub fn adjust_decimals(amount: U256, from_decimals: u8, to_decimals: u8) -> U256 {
    if from_decimals == to_decimals {
        return amount;
    }
    if to_decimals > from_decimals {
        amount * U256::from(10u64).pow(U256::from((to_decimals - from_decimals) as u64))
    } else {
        amount / U256::from(10u64).pow(U256::from((from_decimals - to_decimals) as u64))
    }
}

/// `{feeTokenAmount, nativeTokenAmount, postRequestCalldata}` — spec.md §4.4.
#[derive(Debug, Clone)]
pub struct FillEstimate {
    pub fee_token_amount: U256,
    pub native_token_amount: U256,
    pub post_request_calldata: Bytes,
}

/// The bridge protocol's own fee surface, consumed at steps 5 and 8. The
/// bridge's fee-quoting contract is an external collaborator; this is the
/// seam the core depends on.
#[async_trait::async_trait]
pub trait ProtocolFeeQuoter: Send + Sync {
    /// Protocol fee in native token, for dispatching `post_request` with the
    /// given destination relayer fee already folded in.
    async fn quote_native(&self, chain: &str, post_request: &PostRequest, relayer_fee_dest: U256) -> eyre::Result<U256>;
}

pub struct IntentGateway<C: ChainClient, A: AmmClient, P: ProtocolFeeQuoter> {
    contracts: ContractInteractionService<C>,
    swap_router: SwapRouter<A>,
    fee_quoter: P,
    gateway_address: Address,
}

impl<C: ChainClient, A: AmmClient, P: ProtocolFeeQuoter> IntentGateway<C, A, P> {
    pub fn new(contracts: ContractInteractionService<C>, swap_router: SwapRouter<A>, fee_quoter: P, gateway_address: Address) -> Self {
        Self { contracts, swap_router, fee_quoter, gateway_address }
    }

    /// Runs the eleven-step fill-cost algorithm (spec.md §4.4).
    pub async fn estimate_fill_cost(
        &self,
        order: &Order,
        source_addrs: &SwapChainAddrs,
        dest_addrs: &SwapChainAddrs,
        source_fee_token: Address,
        dest_fee_token: Address,
        source_fee_decimals: u8,
        dest_fee_decimals: u8,
        weth: Address,
        dai: Address,
    ) -> Result<FillEstimate, FillEstimateError> {
        // Step 1: build the redeem-escrow PostRequest.
        let post_request = self
            .contracts
            .build_redeem_escrow_post_request(order, self.gateway_address)
            .await
            .map_err(FillEstimateError::GasEstimation)?;

        // Step 2: source-chain post-gas, converted WETH→DAI (V2 preferred),
        // into the source fee token.
        let post_gas = self
            .contracts
            .estimate_gas_for_post(order, self.gateway_address)
            .await
            .map_err(FillEstimateError::GasEstimation)?;
        let post_gas_quote = self
            .swap_router
            .quote_exact_in(order.source_chain.as_str(), source_addrs, weth, dai, post_gas, Some(Protocol::V2))
            .await;
        let post_gas_in_source_fee = adjust_decimals(post_gas_quote.amount_out, 18, source_fee_decimals);

        // Step 3: flat relayer-fee pad, converted to dest fee-token terms.
        let relayer_fee_src = post_gas_in_source_fee + relayer_fee_pad(source_fee_decimals);
        let relayer_fee_dest = adjust_decimals(relayer_fee_src, source_fee_decimals, dest_fee_decimals);

        // Step 4: state overrides for destination simulation are constructed
        // by the caller's ChainClient when it actually simulates `fillOrder`;
        // this core only computes the values those overrides carry.
        let native_output_total = ContractInteractionService::<C>::calculate_required_eth_value(&order.outputs);

        // Step 5: native-token protocol fee, padded +50 bps.
        let protocol_fee_native_raw = self
            .fee_quoter
            .quote_native(order.dest_chain.as_str(), &post_request, relayer_fee_dest)
            .await
            .map_err(|e| FillEstimateError::Swap(super::error::SwapRouterError::Rpc(e.to_string())))?;
        let protocol_fee_native = protocol_fee_native_raw * U256::from(10_050u32) / U256::from(10_000u32);

        // Step 6: simulate fillOrder with native fee value; conservative
        // fallback constant if no more specific estimate is available.
        let value = native_output_total + protocol_fee_native;
        let fill_gas_dest =
            self.contracts.estimate_gas_fill_post(order, value, self.gateway_address).await.fill_gas;
        let fill_gas_dest = if fill_gas_dest == 0 { FALLBACK_FILL_GAS } else { fill_gas_dest };

        // Step 7: destination gas, native → dest fee-token → source fee-token.
        let fill_gas_quote = self
            .swap_router
            .quote_exact_in(order.dest_chain.as_str(), dest_addrs, weth, dest_fee_token, U256::from(fill_gas_dest), None)
            .await;
        let fill_gas_in_dest_fee = fill_gas_quote.amount_out;
        let fill_gas_src = adjust_decimals(fill_gas_in_dest_fee, dest_fee_decimals, source_fee_decimals);

        // Step 8: protocol fee, expressed in source fee-token terms.
        let protocol_fee_in_dest_fee = adjust_decimals(protocol_fee_native, 18, dest_fee_decimals);
        let protocol_fee_src = adjust_decimals(protocol_fee_in_dest_fee, dest_fee_decimals, source_fee_decimals);

        // Step 9: totals. `convertFeeToNative` is a priced conversion through
        // the source fee-token↔WETH pool, not a decimal rescale.
        let total_src = fill_gas_src + protocol_fee_src + relayer_fee_src;
        let total_native_quote = self
            .swap_router
            .quote_exact_in(order.source_chain.as_str(), source_addrs, source_fee_token, weth, total_src, Some(Protocol::V2))
            .await;
        let total_native = total_native_quote.amount_out;

        // Step 10: route-dependent safety margin.
        let (fee_margin_bps, native_margin_bps) = safety_margin_bps(order.source_chain.as_str(), order.dest_chain.as_str());
        let fee_token_amount = total_src * U256::from(10_000 + fee_margin_bps) / U256::from(10_000u32);
        let native_token_amount = total_native * U256::from(10_000 + native_margin_bps) / U256::from(10_000u32);

        Ok(FillEstimate { fee_token_amount, native_token_amount, post_request_calldata: post_request.body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relayer_fee_pad_quarter_of_ten_power() {
        assert_eq!(relayer_fee_pad(6), U256::from(2_500));
        assert_eq!(relayer_fee_pad(4), U256::from(25));
    }

    #[test]
    fn safety_margin_uses_mainnet_tier() {
        assert_eq!(safety_margin_bps("EVM-1", "EVM-10200"), (3_000, 3_200));
        assert_eq!(safety_margin_bps("EVM-97", "EVM-10200"), (250, 350));
    }

    #[test]
    fn adjust_decimals_scales_up_and_down() {
        assert_eq!(adjust_decimals(U256::from(1), 6, 18), U256::from(10u64).pow(U256::from(12)));
        assert_eq!(adjust_decimals(U256::from(1_000_000_000_000u64), 18, 6), U256::from(1));
    }

    #[test]
    fn adjust_decimals_identity_when_equal() {
        assert_eq!(adjust_decimals(U256::from(42), 8, 8), U256::from(42));
    }
}

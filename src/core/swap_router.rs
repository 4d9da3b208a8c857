//! C2: SwapRouter — quotes and composes swaps across Uniswap V2/V3/V4
//! (spec.md §4.2).
//!
//! Concrete on-chain calls (the actual `eth_call`s against router/quoter
//! contracts) are delegated to an [`AmmClient`] — constructing the precise
//! ABI calldata for specific contracts is out of scope per spec.md §1. This
//! module owns only the protocol-selection and routing *algorithm*.

use super::error::SwapRouterError;
use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

/// AMM protocol generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    V2,
    V3,
    V4,
}

/// V3/V4 fee tiers tried when searching for the best pool, in basis points.
pub const FEE_TIERS_BPS: [u32; 5] = [100, 500, 2500, 3000, 10000];

/// V4 prefers over V2/V3 when within this many basis points of the best quote.
pub const V4_PREFERENCE_THRESHOLD_BPS: u32 = 100;

/// Tick spacing for a given V3/V4 fee tier (spec.md §4.2).
pub fn tick_spacing_for_fee(fee_bps: u32) -> i32 {
    match fee_bps {
        100 => 1,
        500 => 10,
        3000 => 60,
        10000 => 200,
        _ => 60,
    }
}

/// A V4 pool identity. `currency0 < currency1` is a caller invariant enforced
/// by [`pool_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub hooks: Address,
}

/// Build a canonical [`PoolKey`] for `(token_a, token_b)` at `fee_bps`,
/// ordering currencies and computing `zero_for_one` for a swap from
/// `token_in` to the other currency.
pub fn pool_key(token_a: Address, token_b: Address, fee_bps: u32) -> (PoolKey, bool) {
    let (currency0, currency1) = if token_a < token_b { (token_a, token_b) } else { (token_b, token_a) };
    let zero_for_one = token_a == currency0;
    (
        PoolKey {
            currency0,
            currency1,
            fee: fee_bps,
            tick_spacing: tick_spacing_for_fee(fee_bps),
            hooks: Address::ZERO,
        },
        zero_for_one,
    )
}

/// A transaction to be submitted in execution order (approval/transfer, then
/// router execute) as part of a composed swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    pub to: Address,
    pub value: U256,
    pub calldata: Bytes,
}

/// Result of `quote_exact_in`.
#[derive(Debug, Clone, Copy)]
pub struct ExactInQuote {
    pub protocol: Option<Protocol>,
    pub amount_out: U256,
    pub fee: Option<u32>,
}

/// Result of `quote_exact_out`.
#[derive(Debug, Clone, Copy)]
pub struct ExactOutQuote {
    pub protocol: Option<Protocol>,
    pub amount_in: U256,
    pub fee: Option<u32>,
}

/// Result of `find_pair`.
#[derive(Debug, Clone, Copy)]
pub struct PairLocation {
    pub pair_address: Address,
    pub intermediate_token: Address,
}

/// Result of `create_swap`.
#[derive(Debug, Clone)]
pub struct ComposedSwap {
    pub final_amount_out: U256,
    pub transactions: Vec<Tx>,
}

/// The on-chain surface SwapRouter delegates to. Implementations perform the
/// actual `eth_call`s; this repo's core never constructs contract calldata
/// directly (spec.md §1 Non-goal).
#[async_trait]
pub trait AmmClient: Send + Sync {
    async fn v2_amounts_out(&self, chain: &str, router: Address, amount_in: U256, path: &[Address]) -> eyre::Result<Vec<U256>>;
    async fn v2_amounts_in(&self, chain: &str, router: Address, amount_out: U256, path: &[Address]) -> eyre::Result<Vec<U256>>;

    async fn v3_get_pool(&self, chain: &str, factory: Address, token_a: Address, token_b: Address, fee_bps: u32) -> eyre::Result<Option<Address>>;
    async fn v3_pool_liquidity(&self, chain: &str, pool: Address) -> eyre::Result<u128>;
    async fn v3_quote_exact_input_single(&self, chain: &str, quoter: Address, token_in: Address, token_out: Address, fee_bps: u32, amount_in: U256) -> eyre::Result<U256>;
    async fn v3_quote_exact_output_single(&self, chain: &str, quoter: Address, token_in: Address, token_out: Address, fee_bps: u32, amount_out: U256) -> eyre::Result<U256>;

    async fn v4_quote_exact_input_single(&self, chain: &str, quoter: Address, key: PoolKey, zero_for_one: bool, amount_in: U256) -> eyre::Result<U256>;
    async fn v4_quote_exact_output_single(&self, chain: &str, quoter: Address, key: PoolKey, zero_for_one: bool, amount_out: U256) -> eyre::Result<U256>;

    async fn pair_liquidity(&self, chain: &str, protocol: Protocol, token_a: Address, token_b: Address) -> eyre::Result<U256>;

    /// Compose the final router-execute calldata for a chosen protocol/route.
    async fn build_swap_calldata(
        &self,
        chain: &str,
        protocol: Protocol,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        amount_out_minimum: U256,
        recipient: Address,
    ) -> eyre::Result<Tx>;
}

/// Chain-scoped addresses SwapRouter needs. Sourced from `ChainRegistry`;
/// passed in directly to avoid this module depending on the registry trait.
#[derive(Debug, Clone)]
pub struct SwapChainAddrs {
    pub wrapped_native: Address,
    pub uniswap_v2_router: Address,
    pub uniswap_v2_factory: Address,
    pub uniswap_v3_factory: Address,
    pub uniswap_v3_quoter: Address,
    pub uniswap_v4_quoter: Address,
    pub popular_tokens: Vec<Address>,
}

pub struct SwapRouter<C: AmmClient> {
    client: C,
}

impl<C: AmmClient> SwapRouter<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Substitute the chain's wrapped-native token for the zero address when
    /// quoting (quoting paths never use the native sentinel directly).
    fn quote_token(token: Address, chain_addrs: &SwapChainAddrs) -> Address {
        if token == Address::ZERO { chain_addrs.wrapped_native } else { token }
    }

    pub async fn quote_exact_in(
        &self,
        chain: &str,
        chain_addrs: &SwapChainAddrs,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        preference: Option<Protocol>,
    ) -> ExactInQuote {
        let token_in = Self::quote_token(token_in, chain_addrs);
        let token_out = Self::quote_token(token_out, chain_addrs);

        let v2 = self.try_v2_exact_in(chain, chain_addrs, token_in, token_out, amount_in).await;
        let v3 = self.try_v3_exact_in(chain, chain_addrs, token_in, token_out, amount_in).await;
        let v4 = self.try_v4_exact_in(chain, chain_addrs, token_in, token_out, amount_in).await;

        select_best_exact_in(v2, v3, v4, preference)
    }

    pub async fn quote_exact_out(
        &self,
        chain: &str,
        chain_addrs: &SwapChainAddrs,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
        preference: Option<Protocol>,
    ) -> ExactOutQuote {
        let token_in = Self::quote_token(token_in, chain_addrs);
        let token_out = Self::quote_token(token_out, chain_addrs);

        let v2 = self.try_v2_exact_out(chain, chain_addrs, token_in, token_out, amount_out).await;
        let v3 = self.try_v3_exact_out(chain, chain_addrs, token_in, token_out, amount_out).await;
        let v4 = self.try_v4_exact_out(chain, chain_addrs, token_in, token_out, amount_out).await;

        select_best_exact_out(v2, v3, v4, preference)
    }

    async fn try_v2_exact_in(
        &self,
        chain: &str,
        chain_addrs: &SwapChainAddrs,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Option<U256> {
        let path = [token_in, token_out];
        match self.client.v2_amounts_out(chain, chain_addrs.uniswap_v2_router, amount_in, &path).await {
            Ok(amounts) => amounts.last().copied(),
            Err(error) => {
                tracing::debug!(%error, "v2 exact-in quote failed");
                None
            }
        }
    }

    async fn try_v2_exact_out(
        &self,
        chain: &str,
        chain_addrs: &SwapChainAddrs,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Option<U256> {
        let path = [token_in, token_out];
        match self.client.v2_amounts_in(chain, chain_addrs.uniswap_v2_router, amount_out, &path).await {
            Ok(amounts) => amounts.first().copied(),
            Err(error) => {
                tracing::debug!(%error, "v2 exact-out quote failed");
                None
            }
        }
    }

    async fn try_v3_exact_in(
        &self,
        chain: &str,
        chain_addrs: &SwapChainAddrs,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Option<(U256, u32)> {
        let mut best: Option<(U256, u32)> = None;
        for fee in FEE_TIERS_BPS {
            let pool = match self
                .client
                .v3_get_pool(chain, chain_addrs.uniswap_v3_factory, token_in, token_out, fee)
                .await
            {
                Ok(Some(pool)) if pool != Address::ZERO => pool,
                _ => continue,
            };
            let liquidity = self.client.v3_pool_liquidity(chain, pool).await.unwrap_or(0);
            if liquidity == 0 {
                continue;
            }
            let Ok(amount_out) = self
                .client
                .v3_quote_exact_input_single(chain, chain_addrs.uniswap_v3_quoter, token_in, token_out, fee, amount_in)
                .await
            else {
                continue;
            };
            if best.map(|(best_out, _)| amount_out > best_out).unwrap_or(true) {
                best = Some((amount_out, fee));
            }
        }
        best
    }

    async fn try_v3_exact_out(
        &self,
        chain: &str,
        chain_addrs: &SwapChainAddrs,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Option<(U256, u32)> {
        let mut best: Option<(U256, u32)> = None;
        for fee in FEE_TIERS_BPS {
            let pool = match self
                .client
                .v3_get_pool(chain, chain_addrs.uniswap_v3_factory, token_in, token_out, fee)
                .await
            {
                Ok(Some(pool)) if pool != Address::ZERO => pool,
                _ => continue,
            };
            let liquidity = self.client.v3_pool_liquidity(chain, pool).await.unwrap_or(0);
            if liquidity == 0 {
                continue;
            }
            let Ok(amount_in) = self
                .client
                .v3_quote_exact_output_single(chain, chain_addrs.uniswap_v3_quoter, token_in, token_out, fee, amount_out)
                .await
            else {
                continue;
            };
            if best.map(|(best_in, _)| amount_in < best_in).unwrap_or(true) {
                best = Some((amount_in, fee));
            }
        }
        best
    }

    async fn try_v4_exact_in(
        &self,
        chain: &str,
        chain_addrs: &SwapChainAddrs,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Option<(U256, u32)> {
        let mut best: Option<(U256, u32)> = None;
        for fee in FEE_TIERS_BPS {
            let (key, zero_for_one) = pool_key(token_in, token_out, fee);
            let Ok(amount_out) = self
                .client
                .v4_quote_exact_input_single(chain, chain_addrs.uniswap_v4_quoter, key, zero_for_one, amount_in)
                .await
            else {
                continue;
            };
            if best.map(|(best_out, _)| amount_out > best_out).unwrap_or(true) {
                best = Some((amount_out, fee));
            }
        }
        best
    }

    async fn try_v4_exact_out(
        &self,
        chain: &str,
        chain_addrs: &SwapChainAddrs,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Option<(U256, u32)> {
        let mut best: Option<(U256, u32)> = None;
        for fee in FEE_TIERS_BPS {
            let (key, zero_for_one) = pool_key(token_in, token_out, fee);
            let Ok(amount_in) = self
                .client
                .v4_quote_exact_output_single(chain, chain_addrs.uniswap_v4_quoter, key, zero_for_one, amount_out)
                .await
            else {
                continue;
            };
            if best.map(|(best_in, _)| amount_in < best_in).unwrap_or(true) {
                best = Some((amount_in, fee));
            }
        }
        best
    }

    /// Locate a pair between `token_in` and `token_out` via the chain's
    /// popular-token list, for multi-hop routing (spec.md §4.2 `find_pair`).
    pub async fn find_pair(
        &self,
        chain: &str,
        chain_addrs: &SwapChainAddrs,
        token_in: Address,
        token_out: Address,
        protocol: Protocol,
    ) -> Option<PairLocation> {
        // Prefer popular tokens that already pair with token_in directly.
        let mut candidates: Vec<Address> =
            chain_addrs.popular_tokens.iter().copied().filter(|t| *t == token_in).collect();
        if candidates.is_empty() {
            candidates = chain_addrs.popular_tokens.clone();
        }

        let mut best: Option<(PairLocation, U256)> = None;
        for intermediate in candidates {
            let liquidity = self.client.pair_liquidity(chain, protocol, intermediate, token_out).await.unwrap_or(U256::ZERO);
            if liquidity.is_zero() {
                continue;
            }
            if best.as_ref().map(|(_, best_liq)| liquidity > *best_liq).unwrap_or(true) {
                best = Some((
                    PairLocation { pair_address: intermediate, intermediate_token: intermediate },
                    liquidity,
                ));
            }
        }
        best.map(|(pair, _)| pair)
    }

    /// Build the ordered multi-hop path from `token_in` to `token_out`
    /// through `intermediate` (spec.md §4.2).
    pub fn multi_hop_path(token_in: Address, token_out: Address, intermediate: Address, wrapped_native: Address) -> Vec<Address> {
        if intermediate == token_in {
            vec![token_in, token_out]
        } else if intermediate == wrapped_native {
            vec![token_in, wrapped_native, token_out]
        } else {
            vec![token_in, wrapped_native, intermediate, token_out]
        }
    }

    /// `amountOutMinimum = finalAmountOut * (10000 - slippageBps) / 10000`.
    pub fn apply_slippage_floor(amount_out: U256, slippage_bps: u16) -> U256 {
        amount_out * U256::from(10_000u32.saturating_sub(slippage_bps as u32)) / U256::from(10_000u32)
    }

    pub async fn create_swap(
        &self,
        chain: &str,
        chain_addrs: &SwapChainAddrs,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        recipient: Address,
        protocol: Protocol,
        slippage_bps: u16,
    ) -> Result<ComposedSwap, SwapRouterError> {
        let quote = self.quote_exact_in(chain, chain_addrs, token_in, token_out, amount_in, Some(protocol)).await;
        let Some(chosen_protocol) = quote.protocol else {
            return Err(SwapRouterError::NoRouteFound { token_in, token_out });
        };

        let amount_out_minimum = Self::apply_slippage_floor(quote.amount_out, slippage_bps);

        let tx = self
            .client
            .build_swap_calldata(chain, chosen_protocol, token_in, token_out, amount_in, amount_out_minimum, recipient)
            .await
            .map_err(|e| SwapRouterError::Rpc(e.to_string()))?;

        Ok(ComposedSwap { final_amount_out: quote.amount_out, transactions: vec![tx] })
    }

    /// Any-token↔any-token swap via a USDC bridge leg. Rejects USDC as
    /// either endpoint (callers should use `create_swap` directly).
    pub async fn create_complete_swap(
        &self,
        src_chain: &str,
        dst_chain: &str,
        src_addrs: &SwapChainAddrs,
        dst_addrs: &SwapChainAddrs,
        src_token: Address,
        dst_token: Address,
        amount_in: U256,
        recipient: Address,
        slippage_bps: u16,
        protocol: Protocol,
        src_usdc: Address,
        dst_usdc: Address,
    ) -> Result<ComposedSwap, SwapRouterError> {
        if src_token == src_usdc || dst_token == dst_usdc {
            return Err(SwapRouterError::UsdcEndpointRejected);
        }

        let leg1 =
            self.create_swap(src_chain, src_addrs, src_token, src_usdc, amount_in, recipient, protocol, slippage_bps).await?;
        let leg2 = self
            .create_swap(dst_chain, dst_addrs, dst_usdc, dst_token, leg1.final_amount_out, recipient, protocol, slippage_bps)
            .await?;

        let mut transactions = leg1.transactions;
        transactions.extend(leg2.transactions);
        Ok(ComposedSwap { final_amount_out: leg2.final_amount_out, transactions })
    }
}

fn select_best_exact_in(
    v2: Option<U256>,
    v3: Option<(U256, u32)>,
    v4: Option<(U256, u32)>,
    preference: Option<Protocol>,
) -> ExactInQuote {
    let best_non_v4 = match (v2, v3) {
        (Some(v2_out), Some((v3_out, v3_fee))) if v3_out > v2_out => Some((Protocol::V3, v3_out, Some(v3_fee))),
        (Some(v2_out), _) => Some((Protocol::V2, v2_out, None)),
        (None, Some((v3_out, v3_fee))) => Some((Protocol::V3, v3_out, Some(v3_fee))),
        (None, None) => None,
    };

    let chosen = match (v4, best_non_v4) {
        (Some((v4_out, v4_fee)), Some((_, best_out, _))) => {
            if within_threshold_bps(v4_out, best_out, V4_PREFERENCE_THRESHOLD_BPS)
                || preference == Some(Protocol::V4)
            {
                Some((Protocol::V4, v4_out, Some(v4_fee)))
            } else {
                best_non_v4
            }
        }
        (Some((v4_out, v4_fee)), None) => Some((Protocol::V4, v4_out, Some(v4_fee))),
        (None, other) => other,
    };

    match chosen {
        Some((protocol, amount_out, fee)) => ExactInQuote { protocol: Some(protocol), amount_out, fee },
        None => ExactInQuote { protocol: None, amount_out: U256::ZERO, fee: None },
    }
}

fn select_best_exact_out(
    v2: Option<U256>,
    v3: Option<(U256, u32)>,
    v4: Option<(U256, u32)>,
    preference: Option<Protocol>,
) -> ExactOutQuote {
    let best_non_v4 = match (v2, v3) {
        (Some(v2_in), Some((v3_in, v3_fee))) if v3_in < v2_in => Some((Protocol::V3, v3_in, Some(v3_fee))),
        (Some(v2_in), _) => Some((Protocol::V2, v2_in, None)),
        (None, Some((v3_in, v3_fee))) => Some((Protocol::V3, v3_in, Some(v3_fee))),
        (None, None) => None,
    };

    let chosen = match (v4, best_non_v4) {
        (Some((v4_in, v4_fee)), Some((_, best_in, _))) => {
            if within_threshold_bps(best_in, v4_in, V4_PREFERENCE_THRESHOLD_BPS) || preference == Some(Protocol::V4) {
                Some((Protocol::V4, v4_in, Some(v4_fee)))
            } else {
                best_non_v4
            }
        }
        (Some((v4_in, v4_fee)), None) => Some((Protocol::V4, v4_in, Some(v4_fee))),
        (None, other) => other,
    };

    match chosen {
        Some((protocol, amount_in, fee)) => ExactOutQuote { protocol: Some(protocol), amount_in, fee },
        None => ExactOutQuote { protocol: None, amount_in: U256::ZERO, fee: None },
    }
}

/// `|candidate - reference| * 10_000 <= reference * threshold_bps`.
fn within_threshold_bps(candidate: U256, reference: U256, threshold_bps: u32) -> bool {
    if reference.is_zero() {
        return candidate.is_zero();
    }
    let diff = if candidate >= reference { candidate - reference } else { reference - candidate };
    diff * U256::from(10_000u32) <= reference * U256::from(threshold_bps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_spacing_table_matches_spec() {
        assert_eq!(tick_spacing_for_fee(100), 1);
        assert_eq!(tick_spacing_for_fee(500), 10);
        assert_eq!(tick_spacing_for_fee(3000), 60);
        assert_eq!(tick_spacing_for_fee(10000), 200);
        assert_eq!(tick_spacing_for_fee(2500), 60);
    }

    #[test]
    fn pool_key_orders_currencies_and_sets_zero_for_one() {
        let low = Address::repeat_byte(1);
        let high = Address::repeat_byte(2);
        let (key, zero_for_one) = pool_key(high, low, 3000);
        assert_eq!(key.currency0, low);
        assert_eq!(key.currency1, high);
        assert!(!zero_for_one);

        let (key2, zero_for_one2) = pool_key(low, high, 3000);
        assert_eq!(key2.currency0, low);
        assert!(zero_for_one2);
    }

    #[test]
    fn v4_selected_when_within_threshold() {
        let quote = select_best_exact_in(Some(U256::from(1000)), None, Some((U256::from(995), 3000)), None);
        assert_eq!(quote.protocol, Some(Protocol::V4));
    }

    #[test]
    fn v4_not_selected_when_outside_threshold() {
        let quote = select_best_exact_in(Some(U256::from(1000)), None, Some((U256::from(900), 3000)), None);
        assert_eq!(quote.protocol, Some(Protocol::V2));
        assert_eq!(quote.amount_out, U256::from(1000));
    }

    #[test]
    fn v3_beats_v2_when_strictly_better() {
        let quote = select_best_exact_in(Some(U256::from(1000)), Some((U256::from(1100), 500)), None, None);
        assert_eq!(quote.protocol, Some(Protocol::V3));
    }

    #[test]
    fn no_route_when_all_fail() {
        let quote = select_best_exact_in(None, None, None, None);
        assert_eq!(quote.protocol, None);
    }

    #[test]
    fn multi_hop_path_direct_when_intermediate_is_token_in() {
        let token_in = Address::repeat_byte(1);
        let token_out = Address::repeat_byte(2);
        let weth = Address::repeat_byte(3);
        let path = SwapRouter::<DummyClient>::multi_hop_path(token_in, token_out, token_in, weth);
        assert_eq!(path, vec![token_in, token_out]);
    }

    #[test]
    fn multi_hop_path_via_weth_when_intermediate_is_weth() {
        let token_in = Address::repeat_byte(1);
        let token_out = Address::repeat_byte(2);
        let weth = Address::repeat_byte(3);
        let path = SwapRouter::<DummyClient>::multi_hop_path(token_in, token_out, weth, weth);
        assert_eq!(path, vec![token_in, weth, token_out]);
    }

    #[test]
    fn multi_hop_path_three_hop_otherwise() {
        let token_in = Address::repeat_byte(1);
        let token_out = Address::repeat_byte(2);
        let weth = Address::repeat_byte(3);
        let intermediate = Address::repeat_byte(4);
        let path = SwapRouter::<DummyClient>::multi_hop_path(token_in, token_out, intermediate, weth);
        assert_eq!(path, vec![token_in, weth, intermediate, token_out]);
    }

    #[test]
    fn slippage_floor_applies_bps() {
        let floor = SwapRouter::<DummyClient>::apply_slippage_floor(U256::from(10_000), 50);
        assert_eq!(floor, U256::from(9_950));
    }

    struct DummyClient;

    #[async_trait::async_trait]
    impl AmmClient for DummyClient {
        async fn v2_amounts_out(&self, _: &str, _: Address, _: U256, _: &[Address]) -> eyre::Result<Vec<U256>> {
            Ok(vec![])
        }
        async fn v2_amounts_in(&self, _: &str, _: Address, _: U256, _: &[Address]) -> eyre::Result<Vec<U256>> {
            Ok(vec![])
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
        async fn pair_liquidity(&self, _: &str, _: Protocol, _: Address, _: Address) -> eyre::Result<U256> {
            Ok(U256::ZERO)
        }
        async fn build_swap_calldata(&self, _: &str, _: Protocol, _: Address, _: Address, _: U256, _: U256, _: Address) -> eyre::Result<Tx> {
            Ok(Tx { to: Address::ZERO, value: U256::ZERO, calldata: Bytes::new() })
        }
    }
}

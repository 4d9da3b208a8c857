//! C3: ContractInteractionService — concrete, typed contract interactions
//! and gas estimation (spec.md §4.3).
//!
//! Actual `eth_call`/`eth_sendTransaction` plumbing is delegated to
//! [`ChainClient`]; constructing ABI calldata for specific contracts remains
//! out of scope (spec.md §1). This module owns the *decisions* — which call
//! to make, what fallback to use when it reverts, how to derive storage
//! slots.

use super::commitment::{commitment_slot_hash, post_request_commitment, state_commitment_slots, PostRequest};
use super::error::ContractInteractionError;
use super::model::{Order, PaymentInfo, NATIVE_TOKEN};
use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use alloy::sol_types::SolValue;
use async_trait::async_trait;

/// Fixed gas buffer (native-token wei-units) added on top of native output
/// totals when checking filler-wallet sufficiency (spec.md §4.3).
pub const NATIVE_GAS_BUFFER: u64 = 600_000;

/// Fallback gas estimates used when simulation fails (spec.md §4.3).
pub const FALLBACK_FILL_GAS: u64 = 3_000_000;
pub const FALLBACK_POST_GAS: u64 = 270_000;

/// The mapping slot index at which order-filled markers and state
/// commitments live (spec.md §4.3, §6).
pub const STATE_COMMITMENT_SLOT: u8 = 5;

/// Source-chain Merkle-proof-sized state override used by
/// `estimate_gas_for_post` to simulate against a not-yet-finalized height.
#[derive(Debug, Clone)]
pub struct StateOverride {
    pub address: Address,
    pub slot: B256,
    pub value: B256,
}

/// `{fillGas, postGas}` returned by `estimate_gas_fill_post`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPostGasEstimate {
    pub fill_gas: u64,
    pub post_gas: u64,
}

/// Low-level chain access ContractInteractionService depends on. Concrete
/// ABI encoding for `balanceOf`/`allowance`/`approve`/`fillOrder`/
/// `handlePostRequests` calls lives behind this seam (spec.md §1 Non-goal).
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn native_balance(&self, chain: &str, wallet: Address) -> eyre::Result<U256>;
    async fn erc20_balance(&self, chain: &str, token: Address, wallet: Address) -> eyre::Result<U256>;
    async fn erc20_decimals(&self, chain: &str, token: Address) -> eyre::Result<u8>;
    async fn erc20_allowance(&self, chain: &str, token: Address, owner: Address, spender: Address) -> eyre::Result<U256>;
    async fn submit_approve_max(&self, chain: &str, token: Address, spender: Address) -> eyre::Result<B256>;

    async fn read_storage_slot(&self, chain: &str, address: Address, slot: B256) -> eyre::Result<B256>;

    async fn estimate_gas_fill_order(&self, chain: &str, order: &Order, value: U256) -> eyre::Result<u64>;
    async fn submit_fill_order(&self, chain: &str, order: &Order, value: U256) -> eyre::Result<B256>;
    /// Blocks until `tx_hash` has accumulated `confirmations` blocks, then
    /// returns `(confirmed_at_block, gas_used, gas_price)`.
    async fn wait_for_confirmations(&self, chain: &str, tx_hash: B256, confirmations: u32) -> eyre::Result<(u64, u64, u128)>;
    async fn estimate_gas_handle_post_requests(
        &self,
        chain: &str,
        post_request: &PostRequest,
        overrides: &[StateOverride],
    ) -> eyre::Result<u64>;

    async fn host_nonce(&self, chain: &str) -> eyre::Result<u64>;
    async fn latest_state_machine_height(&self, chain: &str) -> eyre::Result<u64>;
    async fn handler_address(&self, chain: &str) -> eyre::Result<Address>;
    async fn para_id(&self, chain: &str) -> eyre::Result<u32>;

    /// Sizes a synthetic Merkle inclusion tree/root for the gas-estimation
    /// state override (spec.md §4.3's `treeSize`-sized root/proof).
    async fn mock_merkle_root(&self, leaf_count: usize) -> eyre::Result<B256>;
}

pub struct ContractInteractionService<C: ChainClient> {
    client: C,
    wallet: Address,
}

impl<C: ChainClient> ContractInteractionService<C> {
    pub fn new(client: C, wallet: Address) -> Self {
        Self { client, wallet }
    }

    pub async fn token_balance(&self, chain: &str, token: Address) -> Result<U256, ContractInteractionError> {
        if token == Address::ZERO {
            self.client.native_balance(chain, self.wallet).await.map_err(|e| ContractInteractionError::Rpc(e.to_string()))
        } else {
            self.client
                .erc20_balance(chain, token, self.wallet)
                .await
                .map_err(|e| ContractInteractionError::Rpc(e.to_string()))
        }
    }

    pub async fn token_decimals(&self, chain: &str, token: Address) -> u8 {
        if token == Address::ZERO {
            return 18;
        }
        self.client.erc20_decimals(chain, token).await.unwrap_or(18)
    }

    /// Verifies sufficiency per output token, adding [`NATIVE_GAS_BUFFER`] to
    /// the native total. Never fails — a shortfall is reported as `false`.
    pub async fn check_token_balances(&self, chain: &str, outputs: &[PaymentInfo]) -> bool {
        let mut native_needed = U256::from(NATIVE_GAS_BUFFER);
        let mut erc20_needed: std::collections::HashMap<Address, U256> = std::collections::HashMap::new();

        for output in outputs {
            let token = super::model::bytes32_to_bytes20(output.token).unwrap_or(Address::ZERO);
            if token == Address::ZERO {
                native_needed += output.amount;
            } else {
                *erc20_needed.entry(token).or_insert(U256::ZERO) += output.amount;
            }
        }

        let Ok(native_balance) = self.token_balance(chain, Address::ZERO).await else { return false };
        if native_balance < native_needed {
            return false;
        }

        for (token, needed) in erc20_needed {
            let Ok(balance) = self.token_balance(chain, token).await else { return false };
            if balance < needed {
                return false;
            }
        }
        true
    }

    /// For each distinct ERC20 output token plus `fee_token`, approves the
    /// gateway for `U256::MAX` if the current allowance is below it.
    pub async fn approve_tokens_if_needed(
        &self,
        chain: &str,
        gateway: Address,
        order: &Order,
        fee_token: Address,
    ) -> Result<Vec<B256>, ContractInteractionError> {
        let mut distinct: Vec<Address> = order
            .outputs
            .iter()
            .filter_map(|o| super::model::bytes32_to_bytes20(o.token))
            .filter(|t| *t != Address::ZERO)
            .collect();
        if fee_token != Address::ZERO {
            distinct.push(fee_token);
        }
        distinct.sort();
        distinct.dedup();

        let mut tx_hashes = Vec::new();
        for token in distinct {
            let allowance = self
                .client
                .erc20_allowance(chain, token, self.wallet, gateway)
                .await
                .map_err(|e| ContractInteractionError::Rpc(e.to_string()))?;
            if allowance < U256::MAX {
                let hash = self
                    .client
                    .submit_approve_max(chain, token, gateway)
                    .await
                    .map_err(|e| ContractInteractionError::Rpc(e.to_string()))?;
                tx_hashes.push(hash);
            }
        }
        Ok(tx_hashes)
    }

    pub fn calculate_required_eth_value(outputs: &[PaymentInfo]) -> U256 {
        outputs
            .iter()
            .filter(|o| o.token == NATIVE_TOKEN)
            .fold(U256::ZERO, |acc, o| acc + o.amount)
    }

    /// `keccak256(commitment ∥ mappingSlot=5)`; non-zero storage ⇒ filled.
    pub async fn check_if_order_filled(
        &self,
        chain: &str,
        gateway: Address,
        commitment: B256,
    ) -> Result<bool, ContractInteractionError> {
        let slot = commitment_slot_hash(commitment);
        let value = self
            .client
            .read_storage_slot(chain, gateway, slot)
            .await
            .map_err(|e| ContractInteractionError::Rpc(e.to_string()))?;
        Ok(value != B256::ZERO)
    }

    /// Submits `fillOrder(order, {relayerFee: order.fees})` with the given
    /// native value (spec.md §4.5 step 4).
    pub async fn submit_fill(&self, order: &Order, value: U256) -> Result<B256, ContractInteractionError> {
        self.client
            .submit_fill_order(order.dest_chain.as_str(), order, value)
            .await
            .map_err(|e| ContractInteractionError::Rpc(e.to_string()))
    }

    /// Waits for `confirmations` blocks on `tx_hash` (spec.md §4.5 step 5).
    pub async fn wait_for_confirmations(
        &self,
        order: &Order,
        tx_hash: B256,
        confirmations: u32,
    ) -> Result<(u64, u64, u128), ContractInteractionError> {
        self.client
            .wait_for_confirmations(order.dest_chain.as_str(), tx_hash, confirmations)
            .await
            .map_err(|e| ContractInteractionError::Rpc(e.to_string()))
    }

    /// Estimates gas for destination `fillOrder` and source
    /// `handlePostRequests`; falls back to conservative constants on error.
    pub async fn estimate_gas_fill_post(&self, order: &Order, value: U256, gateway: Address) -> FillPostGasEstimate {
        let fill_gas = self
            .client
            .estimate_gas_fill_order(order.dest_chain.as_str(), order, value)
            .await
            .unwrap_or(FALLBACK_FILL_GAS);

        let post_gas = match self.build_redeem_escrow_post_request(order, gateway).await {
            Ok(post_request) => self
                .client
                .estimate_gas_handle_post_requests(order.source_chain.as_str(), &post_request, &[])
                .await
                .unwrap_or(FALLBACK_POST_GAS),
            Err(_) => FALLBACK_POST_GAS,
        };

        FillPostGasEstimate { fill_gas, post_gas }
    }

    /// Constructs the canonical redeem-escrow `PostRequest` body
    /// (spec.md §4.3): `requestKind=0 ∥ abi_encode({commitment, beneficiary, tokens})`.
    pub async fn build_redeem_escrow_post_request(
        &self,
        order: &Order,
        gateway: Address,
    ) -> Result<PostRequest, ContractInteractionError> {
        let commitment = super::commitment::order_commitment(order);
        let mock_beneficiary = super::model::bytes20_to_bytes32(self.wallet);
        let tokens: Vec<(B256, U256)> = order.inputs.iter().map(|i| (i.token, i.amount)).collect();

        let mut body = vec![0u8];
        body.extend_from_slice(&(commitment, mock_beneficiary, tokens).abi_encode());

        let nonce = self
            .client
            .host_nonce(order.dest_chain.as_str())
            .await
            .map_err(|e| ContractInteractionError::Rpc(e.to_string()))?;

        Ok(PostRequest {
            source: order.dest_chain.as_str().to_string(),
            dest: order.source_chain.as_str().to_string(),
            nonce,
            from: gateway,
            to: gateway,
            timeout_timestamp: order.deadline,
            body: Bytes::from(body),
        })
    }

    /// Simulates `handlePostRequests` on the source chain with a state
    /// override placing a mock Merkle root at the overlay-root slot
    /// computed at `latestStateMachineHeight` (spec.md §4.3).
    pub async fn estimate_gas_for_post(&self, order: &Order, gateway: Address) -> Result<U256, ContractInteractionError> {
        let post_request = self.build_redeem_escrow_post_request(order, gateway).await?;
        let _commitment = post_request_commitment(&post_request);

        let height = self
            .client
            .latest_state_machine_height(order.source_chain.as_str())
            .await
            .map_err(|e| ContractInteractionError::Rpc(e.to_string()))?;
        let para_id = self
            .client
            .para_id(order.source_chain.as_str())
            .await
            .map_err(|e| ContractInteractionError::Rpc(e.to_string()))?;
        let handler = self
            .client
            .handler_address(order.source_chain.as_str())
            .await
            .map_err(|e| ContractInteractionError::Rpc(e.to_string()))?;

        let (_base, overlay, _state_root) = state_commitment_slots(para_id, height);
        let root = self
            .client
            .mock_merkle_root(1)
            .await
            .map_err(|e| ContractInteractionError::Rpc(e.to_string()))?;

        let overrides = vec![StateOverride { address: handler, slot: overlay, value: root }];

        let gas = self
            .client
            .estimate_gas_handle_post_requests(order.source_chain.as_str(), &post_request, &overrides)
            .await
            .map_err(|e| ContractInteractionError::Simulation(e.to_string()))?;

        Ok(U256::from(gas))
    }
}

/// Derives the Solidity mapping-storage slot for `key` at `mapping_slot`:
/// `keccak256(key ∥ u256(mapping_slot))`. Used for well-known ERC20
/// balance/allowance layout probing (spec.md §4.4's `getStorageSlot`).
pub fn mapping_slot(key: B256, mapping_slot: u8) -> B256 {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(key.as_slice());
    buf.extend_from_slice(&U256::from(mapping_slot).to_be_bytes::<32>());
    keccak256(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{bytes20_to_bytes32, StateMachineId, TokenInfo};
    use std::sync::Mutex;

    fn sample_order() -> Order {
        Order {
            user: B256::ZERO,
            source_chain: StateMachineId::new("EVM-97"),
            dest_chain: StateMachineId::new("EVM-10200"),
            deadline: 65_337_297,
            nonce: 0,
            fees: U256::ZERO,
            inputs: vec![TokenInfo { token: B256::repeat_byte(1), amount: U256::from(100) }],
            outputs: vec![PaymentInfo { token: NATIVE_TOKEN, amount: U256::from(100), beneficiary: B256::repeat_byte(2) }],
            call_data: Bytes::new(),
            id: None,
            transaction_hash: None,
        }
    }

    #[derive(Default)]
    struct FakeClient {
        native_balance: Mutex<U256>,
        erc20_balance: Mutex<U256>,
        storage: Mutex<B256>,
        allowance: Mutex<U256>,
        fail_fill_estimate: bool,
    }

    #[async_trait]
    impl ChainClient for FakeClient {
        async fn native_balance(&self, _: &str, _: Address) -> eyre::Result<U256> {
            Ok(*self.native_balance.lock().unwrap())
        }
        async fn erc20_balance(&self, _: &str, _: Address, _: Address) -> eyre::Result<U256> {
            Ok(*self.erc20_balance.lock().unwrap())
        }
        async fn erc20_decimals(&self, _: &str, _: Address) -> eyre::Result<u8> {
            Ok(6)
        }
        async fn erc20_allowance(&self, _: &str, _: Address, _: Address, _: Address) -> eyre::Result<U256> {
            Ok(*self.allowance.lock().unwrap())
        }
        async fn submit_approve_max(&self, _: &str, _: Address, _: Address) -> eyre::Result<B256> {
            Ok(B256::repeat_byte(7))
        }
        async fn read_storage_slot(&self, _: &str, _: Address, _: B256) -> eyre::Result<B256> {
            Ok(*self.storage.lock().unwrap())
        }
        async fn estimate_gas_fill_order(&self, _: &str, _: &Order, _: U256) -> eyre::Result<u64> {
            if self.fail_fill_estimate { eyre::bail!("reverted") } else { Ok(150_000) }
        }
        async fn submit_fill_order(&self, _: &str, _: &Order, _: U256) -> eyre::Result<B256> {
            Ok(B256::repeat_byte(6))
        }
        async fn wait_for_confirmations(&self, _: &str, _: B256, _: u32) -> eyre::Result<(u64, u64, u128)> {
            Ok((100, 150_000, 20))
        }
        async fn estimate_gas_handle_post_requests(&self, _: &str, _: &PostRequest, _: &[StateOverride]) -> eyre::Result<u64> {
            Ok(90_000)
        }
        async fn host_nonce(&self, _: &str) -> eyre::Result<u64> {
            Ok(1)
        }
        async fn latest_state_machine_height(&self, _: &str) -> eyre::Result<u64> {
            Ok(42)
        }
        async fn handler_address(&self, _: &str) -> eyre::Result<Address> {
            Ok(Address::repeat_byte(9))
        }
        async fn para_id(&self, _: &str) -> eyre::Result<u32> {
            Ok(2000)
        }
        async fn mock_merkle_root(&self, _: usize) -> eyre::Result<B256> {
            Ok(B256::repeat_byte(3))
        }
    }

    #[tokio::test]
    async fn check_token_balances_true_when_sufficient() {
        let client = FakeClient { native_balance: Mutex::new(U256::from(10_000_000)), ..Default::default() };
        let svc = ContractInteractionService::new(client, Address::ZERO);
        let outputs = vec![PaymentInfo { token: NATIVE_TOKEN, amount: U256::from(100), beneficiary: B256::ZERO }];
        assert!(svc.check_token_balances("EVM-10200", &outputs).await);
    }

    #[tokio::test]
    async fn check_token_balances_false_when_gas_buffer_not_covered() {
        let client = FakeClient { native_balance: Mutex::new(U256::from(100)), ..Default::default() };
        let svc = ContractInteractionService::new(client, Address::ZERO);
        let outputs = vec![PaymentInfo { token: NATIVE_TOKEN, amount: U256::from(100), beneficiary: B256::ZERO }];
        assert!(!svc.check_token_balances("EVM-10200", &outputs).await);
    }

    #[tokio::test]
    async fn check_if_order_filled_true_when_nonzero() {
        let client = FakeClient { storage: Mutex::new(B256::repeat_byte(1)), ..Default::default() };
        let svc = ContractInteractionService::new(client, Address::ZERO);
        assert!(svc.check_if_order_filled("EVM-10200", Address::ZERO, B256::repeat_byte(5)).await.unwrap());
    }

    #[tokio::test]
    async fn check_if_order_filled_false_when_zero() {
        let client = FakeClient::default();
        let svc = ContractInteractionService::new(client, Address::ZERO);
        assert!(!svc.check_if_order_filled("EVM-10200", Address::ZERO, B256::repeat_byte(5)).await.unwrap());
    }

    #[tokio::test]
    async fn fill_post_gas_falls_back_on_simulation_failure() {
        let client = FakeClient { fail_fill_estimate: true, ..Default::default() };
        let svc = ContractInteractionService::new(client, Address::ZERO);
        let order = sample_order();
        let estimate = svc.estimate_gas_fill_post(&order, U256::ZERO, Address::repeat_byte(8)).await;
        assert_eq!(estimate.fill_gas, FALLBACK_FILL_GAS);
        assert_eq!(estimate.post_gas, 90_000);
    }

    #[tokio::test]
    async fn approve_tokens_if_needed_skips_when_already_max() {
        let client = FakeClient { allowance: Mutex::new(U256::MAX), ..Default::default() };
        let svc = ContractInteractionService::new(client, Address::ZERO);
        let mut order = sample_order();
        order.outputs = vec![PaymentInfo {
            token: bytes20_to_bytes32(Address::repeat_byte(4)),
            amount: U256::from(1),
            beneficiary: B256::ZERO,
        }];
        let hashes = svc.approve_tokens_if_needed("EVM-10200", Address::repeat_byte(9), &order, Address::ZERO).await.unwrap();
        assert!(hashes.is_empty());
    }

    #[test]
    fn required_eth_value_sums_native_outputs_only() {
        let outputs = vec![
            PaymentInfo { token: NATIVE_TOKEN, amount: U256::from(100), beneficiary: B256::ZERO },
            PaymentInfo { token: B256::repeat_byte(1), amount: U256::from(9_999), beneficiary: B256::ZERO },
            PaymentInfo { token: NATIVE_TOKEN, amount: U256::from(50), beneficiary: B256::ZERO },
        ];
        assert_eq!(ContractInteractionService::<FakeClient>::calculate_required_eth_value(&outputs), U256::from(150));
    }
}

//! C1: ConfirmationPolicy — maps `(chain, USD amount)` to the number of
//! block confirmations the scheduler must wait before treating an order as
//! final enough to fill (spec.md §4.1).
//!
//! Interpolation uses [`rust_decimal::Decimal`] rather than `f64` so that
//! boundary amounts never suffer IEEE-754 rounding loss (spec.md §9,
//! "Decimal/number mixing").

use super::error::ConfirmationError;
use super::model::ConfirmationThresholds;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

/// Per-chain piecewise-linear confirmation policy.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationPolicy {
    thresholds: HashMap<u64, ConfirmationThresholds>,
}

impl ConfirmationPolicy {
    pub fn new() -> Self {
        Self { thresholds: HashMap::new() }
    }

    /// Register (or replace) the thresholds for a chain. Returns an error if
    /// `minAmount > maxAmount` or `minConfirmations > maxConfirmations`.
    pub fn with_chain(
        mut self,
        chain_id: u64,
        thresholds: ConfirmationThresholds,
    ) -> Result<Self, ConfirmationError> {
        self.insert_chain(chain_id, thresholds)?;
        Ok(self)
    }

    pub fn insert_chain(
        &mut self,
        chain_id: u64,
        thresholds: ConfirmationThresholds,
    ) -> Result<(), ConfirmationError> {
        if thresholds.min_amount > thresholds.max_amount
            || thresholds.min_confirmations > thresholds.max_confirmations
        {
            return Err(ConfirmationError::MalformedPolicy {
                chain_id,
                min_amount: thresholds.min_amount,
                max_amount: thresholds.max_amount,
            });
        }
        self.thresholds.insert(chain_id, thresholds);
        Ok(())
    }

    /// Number of confirmations required before `amount` (in USD) on `chain_id`
    /// is considered final enough to admit for filling.
    pub fn get_confirmation_blocks(&self, chain_id: u64, amount: u64) -> Result<u32, ConfirmationError> {
        let t = self.thresholds.get(&chain_id).ok_or(ConfirmationError::UnknownChain(chain_id))?;

        if amount <= t.min_amount {
            return Ok(t.min_confirmations);
        }
        if amount >= t.max_amount {
            return Ok(t.max_confirmations);
        }

        let amount_d = Decimal::from(amount);
        let min_amount_d = Decimal::from(t.min_amount);
        let max_amount_d = Decimal::from(t.max_amount);
        let min_conf_d = Decimal::from(t.min_confirmations);
        let max_conf_d = Decimal::from(t.max_confirmations);

        let fraction = (amount_d - min_amount_d) / (max_amount_d - min_amount_d);
        let interpolated = min_conf_d + fraction * (max_conf_d - min_conf_d);
        let rounded = interpolated.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        // Bounded by construction: rounded lies within [min_confirmations, max_confirmations].
        let blocks: u32 = rounded.try_into().unwrap_or(t.max_confirmations);
        Ok(blocks)
    }
}

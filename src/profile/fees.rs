/// Wei per Gwei. Every sample in the profile is divided by this before
/// aggregation so that all three metrics share the same display unit.
pub const WEI_PER_GWEI: f64 = 1e9;

/// EIP-2718 type id of dynamic-fee (EIP-1559) transactions.
pub const EIP1559_TX_TYPE: u64 = 2;

/// Fee fields of a transaction, keyed by fee model.
///
/// Each variant carries only the fields its pricing rule reads, so the
/// extraction below never has to probe for optional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeModel {
    /// Flat gas price (type 0/1, or any non-fee-market type).
    Legacy { gas_price: u128 },
    /// Dynamic-fee transaction with a fee cap and a priority fee.
    FeeMarket {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

/// Per-transaction (effective price, tip) pair in wei. Tip is clamped at
/// zero for legacy transactions priced below the base fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedSample {
    pub effective_price: u128,
    pub tip: u128,
}

impl FeeModel {
    /// Normalize this transaction's fees against its block's base fee.
    ///
    /// Fee-market pricing: `effective = min(max_fee, base_fee + priority)`.
    /// The reported tip is the stated priority fee, deliberately ignoring
    /// the `max_fee - base_fee` cap; downstream consumers rely on this
    /// exact formula, hence "tipGweiApprox" in the output.
    ///
    /// Pure function, never fails. A zero `block_base_fee` (pre-1559
    /// chains) makes the legacy tip collapse to the gas price.
    pub fn extract(&self, block_base_fee: u128) -> NormalizedSample {
        match *self {
            FeeModel::FeeMarket { max_fee_per_gas, max_priority_fee_per_gas } => {
                NormalizedSample {
                    effective_price: max_fee_per_gas
                        .min(block_base_fee.saturating_add(max_priority_fee_per_gas)),
                    tip: max_priority_fee_per_gas,
                }
            }
            FeeModel::Legacy { gas_price } => NormalizedSample {
                effective_price: gas_price,
                tip: gas_price.saturating_sub(block_base_fee),
            },
        }
    }
}

/// Convert a wei amount to Gwei for aggregation.
pub fn wei_to_gwei(wei: u128) -> f64 {
    wei as f64 / WEI_PER_GWEI
}

use alloy::primitives::{U128, U64};
use serde::Deserialize;

use crate::profile::fees::{FeeModel, EIP1559_TX_TYPE};

/// Subset of an `eth_getBlockByNumber` response the profiler reads.
/// Requested with full transaction bodies; hash-only responses would not
/// carry the per-transaction fee fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    pub number: U64,
    pub timestamp: U64,
    /// Absent on pre-EIP-1559 chains.
    #[serde(default)]
    pub base_fee_per_gas: Option<U128>,
    #[serde(default)]
    pub transactions: Vec<RpcTransaction>,
}

/// Fee-related fields of a transaction object. Everything is optional on
/// the wire; missing fields are normalized to zero rather than rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    #[serde(rename = "type", default)]
    pub tx_type: Option<U64>,
    #[serde(default)]
    pub gas_price: Option<U128>,
    #[serde(default)]
    pub max_fee_per_gas: Option<U128>,
    #[serde(default)]
    pub max_priority_fee_per_gas: Option<U128>,
}

/// A fetched block reduced to the fields one sampling run needs. The raw
/// RPC objects are dropped as soon as this is built.
#[derive(Debug, Clone)]
pub struct SampledBlock {
    pub number: u64,
    pub timestamp: u64,
    /// Zero when the block carries no fee-market field.
    pub base_fee_per_gas: u128,
    pub transactions: Vec<FeeModel>,
}

impl From<RpcBlock> for SampledBlock {
    fn from(block: RpcBlock) -> Self {
        Self {
            number: block.number.to::<u64>(),
            timestamp: block.timestamp.to::<u64>(),
            base_fee_per_gas: block.base_fee_per_gas.map_or(0, |fee| fee.to::<u128>()),
            transactions: block.transactions.into_iter().map(FeeModel::from).collect(),
        }
    }
}

impl From<RpcTransaction> for FeeModel {
    fn from(tx: RpcTransaction) -> Self {
        let tx_type = tx.tx_type.map_or(0, |t| t.to::<u64>());

        if tx_type == EIP1559_TX_TYPE {
            FeeModel::FeeMarket {
                max_fee_per_gas: tx.max_fee_per_gas.map_or(0, |v| v.to::<u128>()),
                max_priority_fee_per_gas: tx
                    .max_priority_fee_per_gas
                    .map_or(0, |v| v.to::<u128>()),
            }
        } else {
            FeeModel::Legacy { gas_price: tx.gas_price.map_or(0, |v| v.to::<u128>()) }
        }
    }
}

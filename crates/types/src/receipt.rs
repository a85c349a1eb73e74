use crate::serde_helpers::u64_hex;
use crate::{Address, Hash};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Execution outcome of a single transaction inclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Failed,
}

impl ReceiptStatus {
    /// Wire representation used by `eth_getTransactionReceipt` (`"0x1"`/`"0x0"`).
    pub fn as_hex(&self) -> &'static str {
        match self {
            ReceiptStatus::Success => "0x1",
            ReceiptStatus::Failed => "0x0",
        }
    }
}

/// Produced exactly once per accepted transaction inclusion; immutable
/// thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_hash: Hash,
    pub block_hash: Hash,
    pub from: Address,
    pub to: Option<Address>,
    #[serde(with = "u64_hex")]
    pub gas_used: u64,
    #[serde(with = "u64_hex")]
    pub cumulative_gas_used: u64,
    pub status: ReceiptStatus,
    /// Opaque event log entries; the executor attaches revm's log output
    /// verbatim rather than re-decoding it against an ABI.
    pub logs: Vec<serde_json::Value>,
    /// Populated iff `to` is `None` (deployment) and execution succeeded.
    pub contract_address: Option<Address>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        matches!(self.status, ReceiptStatus::Success)
    }
}

//! Wire shapes returned across the RPC/WebSocket boundary. Distinct from
//! `bdnode_types::Block`/`Receipt`: these are the JSON-RPC-facing
//! projections ("BlockView", "ReceiptView"), not the domain types the core
//! operates on.

use bdnode_types::serde_helpers::{u256_hex, u64_hex};
use bdnode_types::{Address, Block, BlockColor, Hash, Receipt, Transaction};
use serde::{Deserialize, Serialize};

/// Either bare transaction hashes or full transaction views, selected by
/// the `fullTxs` parameter of `eth_getBlockByHash`/`eth_getBlockByNumber`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockTransactions {
    Hashes(Vec<Hash>),
    Full(Vec<TransactionView>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub hash: Hash,
    #[serde(with = "u64_hex")]
    pub number: u64,
    pub parent_hash: Hash,
    pub parent_hashes: Vec<Hash>,
    #[serde(with = "u64_hex")]
    pub timestamp: u64,
    pub miner: Address,
    #[serde(with = "u64_hex")]
    pub difficulty: u64,
    pub transactions: BlockTransactions,
    pub transactions_root: Hash,
    pub state_root: Hash,
    #[serde(with = "u64_hex")]
    pub nonce: u64,
    pub color: BlockColor,
    #[serde(with = "u64_hex")]
    pub dag_depth: u64,
    #[serde(with = "u64_hex")]
    pub blue_score: u64,
}

impl BlockView {
    pub fn from_block(block: &Block, full_txs: bool) -> Self {
        let parent_hash = block.parent_hashes.first().copied().unwrap_or(Hash::ZERO);
        let transactions = if full_txs {
            BlockTransactions::Full(
                block
                    .transactions
                    .iter()
                    .map(TransactionView::from_transaction)
                    .collect(),
            )
        } else {
            BlockTransactions::Hashes(block.transactions.iter().map(|t| t.hash).collect())
        };
        Self {
            hash: block.hash,
            number: block.dag_depth,
            parent_hash,
            parent_hashes: block.parent_hashes.clone(),
            timestamp: block.timestamp,
            miner: block.miner,
            difficulty: block.difficulty,
            transactions,
            transactions_root: block.transactions_root,
            state_root: block.state_root,
            nonce: block.nonce,
            color: block.color,
            dag_depth: block.dag_depth,
            blue_score: block.blue_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub hash: Hash,
    pub from: Address,
    pub to: Option<Address>,
    #[serde(with = "u256_hex")]
    pub value: bdnode_types::U256,
    #[serde(with = "bdnode_types::serde_helpers::bytes_hex")]
    pub data: Vec<u8>,
    #[serde(with = "u64_hex")]
    pub nonce: u64,
    #[serde(with = "u64_hex")]
    pub gas_limit: u64,
    #[serde(with = "u256_hex")]
    pub gas_price: bdnode_types::U256,
}

impl TransactionView {
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            hash: tx.hash,
            from: tx.from,
            to: tx.to,
            value: tx.value,
            data: tx.data.clone(),
            nonce: tx.nonce,
            gas_limit: tx.gas_limit,
            gas_price: tx.gas_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub transaction_hash: Hash,
    pub block_hash: Hash,
    pub from: Address,
    pub to: Option<Address>,
    #[serde(with = "u64_hex")]
    pub gas_used: u64,
    #[serde(with = "u64_hex")]
    pub cumulative_gas_used: u64,
    pub status: String,
    pub logs: Vec<serde_json::Value>,
    pub contract_address: Option<Address>,
}

impl ReceiptView {
    pub fn from_receipt(r: &Receipt) -> Self {
        Self {
            transaction_hash: r.transaction_hash,
            block_hash: r.block_hash,
            from: r.from,
            to: r.to,
            gas_used: r.gas_used,
            cumulative_gas_used: r.cumulative_gas_used,
            status: r.status.as_hex().to_string(),
            logs: r.logs.clone(),
            contract_address: r.contract_address,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DagStatsView {
    pub block_count: usize,
    pub tip_count: usize,
    #[serde(with = "u64_hex")]
    pub max_depth: u64,
    pub blue_count: usize,
    pub red_count: usize,
}

/// A request to submit a transaction, as accepted over the wire by
/// `eth_sendTransaction` / `dag_sendTransaction` and friends.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequestView {
    pub from: Address,
    pub to: Option<Address>,
    #[serde(with = "u256_hex", default)]
    pub value: bdnode_types::U256,
    #[serde(with = "bdnode_types::serde_helpers::bytes_hex", default)]
    pub data: Vec<u8>,
    #[serde(with = "u64_hex", default)]
    pub nonce: u64,
    #[serde(with = "u64_hex", default)]
    pub gas_limit: u64,
    #[serde(with = "u256_hex", default)]
    pub gas_price: bdnode_types::U256,
}

impl From<TransactionRequestView> for bdnode_types::TransactionRequest {
    fn from(v: TransactionRequestView) -> Self {
        bdnode_types::TransactionRequest {
            from: v.from,
            to: v.to,
            value: v.value,
            data: v.data,
            nonce: v.nonce,
            gas_limit: if v.gas_limit == 0 { 1_000_000 } else { v.gas_limit },
            gas_price: v.gas_price,
        }
    }
}

/// A block tag: `"latest"`, `"earliest"`, `"pending"`, or a `0x`-hex depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Earliest,
    Pending,
    Depth(u64),
}

impl<'de> Deserialize<'de> for BlockTag {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(d)?;
        Ok(match s.as_str() {
            "latest" => BlockTag::Latest,
            "earliest" => BlockTag::Earliest,
            "pending" => BlockTag::Pending,
            hex => {
                let stripped = hex.strip_prefix("0x").unwrap_or(hex);
                let depth = u64::from_str_radix(stripped, 16).map_err(serde::de::Error::custom)?;
                BlockTag::Depth(depth)
            }
        })
    }
}

impl Serialize for BlockTag {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            BlockTag::Latest => s.serialize_str("latest"),
            BlockTag::Earliest => s.serialize_str("earliest"),
            BlockTag::Pending => s.serialize_str("pending"),
            BlockTag::Depth(d) => s.serialize_str(&format!("0x{d:x}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_tag_parses_named_tags_and_hex_depth() {
        assert_eq!(
            serde_json::from_str::<BlockTag>(r#""latest""#).unwrap(),
            BlockTag::Latest
        );
        assert_eq!(
            serde_json::from_str::<BlockTag>(r#""0x2a""#).unwrap(),
            BlockTag::Depth(42)
        );
    }
}

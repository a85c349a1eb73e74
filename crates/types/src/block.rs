use crate::serde_helpers::{u256_hex, u64_hex};
use crate::transaction::Transaction;
use crate::{Address, Hash};
use alloy_primitives::{keccak256, U256};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// GHOSTDAG classification of a block within the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BlockColor {
    Blue,
    Red,
    /// Assigned momentarily between `add_block` insertion and the coloring
    /// pass that immediately follows it; never observed by a caller once
    /// `add_block` returns.
    Pending,
}

/// A mined block: the unit the DAG graph stores and colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub hash: Hash,
    pub parent_hashes: Vec<Hash>,
    #[serde(with = "u64_hex")]
    pub timestamp: u64,
    pub miner: Address,
    #[serde(with = "u64_hex")]
    pub difficulty: u64,
    pub state_root: Hash,
    pub transactions_root: Hash,
    #[serde(with = "u64_hex")]
    pub nonce: u64,
    pub transactions: Vec<Transaction>,
    pub color: BlockColor,
    #[serde(with = "u64_hex")]
    pub dag_depth: u64,
    #[serde(with = "u64_hex")]
    pub blue_score: u64,
}

impl Block {
    /// Builds the genesis block: no parents, depth 0, always blue.
    pub fn genesis(miner: Address, state_root: Hash, timestamp: u64) -> Self {
        let mut block = Self {
            hash: Hash::ZERO,
            parent_hashes: Vec::new(),
            timestamp,
            miner,
            difficulty: 0,
            state_root,
            transactions_root: empty_transactions_root(),
            nonce: 0,
            transactions: Vec::new(),
            color: BlockColor::Blue,
            dag_depth: 0,
            blue_score: 0,
        };
        block.hash = block.compute_hash();
        block
    }

    /// Deterministic content hash: a function of parent hashes, timestamp,
    /// nonce, transactions root, miner, and the post-execution state root.
    ///
    /// Computed *after* execution, since the state root is part of the
    /// preimage — a block's hash cannot be known before its transactions
    /// have run.
    pub fn compute_hash(&self) -> Hash {
        let mut preimage = Vec::with_capacity(
            32 * self.parent_hashes.len() + 8 + 8 + 32 + 20 + 32,
        );
        for parent in &self.parent_hashes {
            preimage.extend_from_slice(parent.as_slice());
        }
        preimage.extend_from_slice(&self.timestamp.to_be_bytes());
        preimage.extend_from_slice(&self.nonce.to_be_bytes());
        preimage.extend_from_slice(self.transactions_root.as_slice());
        preimage.extend_from_slice(self.miner.as_slice());
        preimage.extend_from_slice(self.state_root.as_slice());
        keccak256(&preimage)
    }
}

/// keccak256 over an empty byte string; used for blocks with no transactions.
pub fn empty_transactions_root() -> Hash {
    keccak256([])
}

/// Computes a simple ordered Merkle-ish root over a block's transaction
/// hashes: keccak256 of the concatenation of each tx hash, in inclusion
/// order. Sufficient for a development node that does not need Merkle
/// proofs of inclusion.
pub fn transactions_root(tx_hashes: &[Hash]) -> Hash {
    if tx_hashes.is_empty() {
        return empty_transactions_root();
    }
    let mut preimage = Vec::with_capacity(tx_hashes.len() * 32);
    for h in tx_hashes {
        preimage.extend_from_slice(h.as_slice());
    }
    keccak256(&preimage)
}

/// `0x`-prefixed big-endian hex of a [`U256`], used by a couple of RPC
/// display paths that don't go through full serde (formatting, logging).
pub fn u256_to_hex(v: U256) -> String {
    format!("0x{v:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_is_blue_and_depth_zero() {
        let g = Block::genesis(Address::ZERO, Hash::ZERO, 0);
        assert_eq!(g.color, BlockColor::Blue);
        assert_eq!(g.dag_depth, 0);
        assert!(g.parent_hashes.is_empty());
    }

    #[test]
    fn hash_changes_with_state_root() {
        let a = Block::genesis(Address::ZERO, Hash::ZERO, 1000);
        let b = Block::genesis(Address::ZERO, Hash::repeat_byte(1), 1000);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn empty_and_nonempty_tx_roots_differ() {
        let empty = transactions_root(&[]);
        let nonempty = transactions_root(&[Hash::repeat_byte(7)]);
        assert_ne!(empty, nonempty);
        assert_eq!(empty, empty_transactions_root());
    }
}

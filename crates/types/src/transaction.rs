use crate::serde_helpers::{bytes_hex, u256_hex, u64_hex};
use crate::{Address, Hash};
use alloy_primitives::{keccak256, U256};
use serde::{Deserialize, Serialize};

/// A submitted transaction: from the mempool's perspective a pure value
/// object keyed by its content-addressed [`Transaction::hash`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: Hash,
    pub from: Address,
    /// `None` signals contract deployment: `data` is deployment bytecode.
    pub to: Option<Address>,
    #[serde(with = "u256_hex")]
    pub value: U256,
    #[serde(with = "bytes_hex")]
    pub data: Vec<u8>,
    #[serde(with = "u64_hex")]
    pub nonce: u64,
    #[serde(with = "u64_hex")]
    pub gas_limit: u64,
    #[serde(with = "u256_hex")]
    pub gas_price: U256,
}

/// Everything needed to build a [`Transaction`] except its hash, which is
/// derived deterministically from the remaining fields (see
/// [`TransactionRequest::into_transaction`]).
///
/// This resolves the source's ambiguity around random-generated tx hashes
/// (spec open question 4): content-addressed hashing is the only choice
/// consistent with "hash uniquely keys a transaction in a mempool instance".
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Option<Address>,
    #[serde(with = "u256_hex", default)]
    pub value: U256,
    #[serde(with = "bytes_hex", default)]
    pub data: Vec<u8>,
    #[serde(with = "u64_hex")]
    pub nonce: u64,
    #[serde(with = "u64_hex", default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(with = "u256_hex", default)]
    pub gas_price: U256,
}

fn default_gas_limit() -> u64 {
    1_000_000
}

impl TransactionRequest {
    pub fn into_transaction(self) -> Transaction {
        let mut tx = Transaction {
            hash: Hash::ZERO,
            from: self.from,
            to: self.to,
            value: self.value,
            data: self.data,
            nonce: self.nonce,
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
        };
        tx.hash = tx.compute_hash();
        tx
    }
}

impl Transaction {
    /// Deterministic content hash over every field but the hash itself.
    fn compute_hash(&self) -> Hash {
        let mut preimage = Vec::with_capacity(20 + 20 + 32 + self.data.len() + 8 + 8 + 32);
        preimage.extend_from_slice(self.from.as_slice());
        if let Some(to) = self.to {
            preimage.extend_from_slice(to.as_slice());
        }
        preimage.extend_from_slice(&self.value.to_be_bytes::<32>());
        preimage.extend_from_slice(&self.data);
        preimage.extend_from_slice(&self.nonce.to_be_bytes());
        preimage.extend_from_slice(&self.gas_limit.to_be_bytes());
        preimage.extend_from_slice(&self.gas_price.to_be_bytes::<32>());
        keccak256(&preimage)
    }

    /// `true` iff this transaction deploys a contract (`to` unset).
    pub fn is_deployment(&self) -> bool {
        self.to.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(nonce: u64, gas_price: u64) -> TransactionRequest {
        TransactionRequest {
            from: Address::repeat_byte(1),
            to: Some(Address::repeat_byte(2)),
            value: U256::ZERO,
            data: vec![],
            nonce,
            gas_limit: 21_000,
            gas_price: U256::from(gas_price),
        }
    }

    #[test]
    fn hash_is_deterministic_and_content_addressed() {
        let a = req(0, 1_000_000_000).into_transaction();
        let b = req(0, 1_000_000_000).into_transaction();
        assert_eq!(a.hash, b.hash);

        let c = req(1, 1_000_000_000).into_transaction();
        assert_ne!(a.hash, c.hash);
    }

    #[test]
    fn deployment_has_no_recipient() {
        let mut r = req(0, 1);
        r.to = None;
        let tx = r.into_transaction();
        assert!(tx.is_deployment());
    }
}

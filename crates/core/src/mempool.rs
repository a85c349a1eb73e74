//! The transaction mempool (C2): bounded, hash-keyed, gas-price ordered.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::Address;
use bdnode_types::{Hash, Transaction};

/// Result of [`Mempool::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Accepted,
    Duplicate,
}

#[derive(Debug, Clone)]
struct Entry {
    tx: Transaction,
    added_at: u64,
    attempts: u64,
    seq: u64,
}

/// Single-writer/many-reader pool of pending transactions.
pub struct Mempool {
    max_size: usize,
    entries: HashMap<Hash, Entry>,
    next_seq: u64,
}

impl Mempool {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            entries: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Admits `tx`. If the pool is full, evicts the lowest-`gasPrice` entry
    /// first (ties broken by insertion order — the oldest of the tied
    /// entries goes). Rejects a hash that's already present.
    pub fn add(&mut self, tx: Transaction) -> AddOutcome {
        if self.entries.contains_key(&tx.hash) {
            return AddOutcome::Duplicate;
        }
        if self.entries.len() >= self.max_size {
            self.evict_lowest_gas_price();
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            tx.hash,
            Entry {
                tx,
                added_at: now_ms(),
                attempts: 0,
                seq,
            },
        );
        AddOutcome::Accepted
    }

    fn evict_lowest_gas_price(&mut self) {
        let victim = self
            .entries
            .values()
            .min_by(|a, b| {
                a.tx.gas_price
                    .cmp(&b.tx.gas_price)
                    .then(a.seq.cmp(&b.seq))
            })
            .map(|e| e.tx.hash);
        if let Some(hash) = victim {
            self.entries.remove(&hash);
        }
    }

    pub fn remove(&mut self, hash: &Hash) -> Option<Transaction> {
        self.entries.remove(hash).map(|e| e.tx)
    }

    pub fn get(&self, hash: &Hash) -> Option<Transaction> {
        self.entries.get(hash).map(|e| e.tx.clone())
    }

    pub fn all(&self) -> Vec<Transaction> {
        self.entries.values().map(|e| e.tx.clone()).collect()
    }

    /// Transactions ordered by `gasPrice` descending, ties broken by
    /// insertion order (stable).
    pub fn by_gas_price(&self, limit: Option<usize>) -> Vec<Transaction> {
        let mut entries: Vec<&Entry> = self.entries.values().collect();
        entries.sort_by(|a, b| b.tx.gas_price.cmp(&a.tx.gas_price).then(a.seq.cmp(&b.seq)));
        let iter = entries.into_iter().map(|e| e.tx.clone());
        match limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    /// Alias of [`Mempool::by_gas_price`].
    pub fn pending(&self, limit: Option<usize>) -> Vec<Transaction> {
        self.by_gas_price(limit)
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn by_sender(&self, addr: Address) -> Vec<Transaction> {
        self.entries
            .values()
            .filter(|e| e.tx.from == addr)
            .map(|e| e.tx.clone())
            .collect()
    }

    pub fn increment_attempt(&mut self, hash: &Hash) {
        if let Some(e) = self.entries.get_mut(hash) {
            e.attempts += 1;
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use bdnode_types::TransactionRequest;

    fn tx(gas_price: u64, nonce: u64) -> Transaction {
        TransactionRequest {
            from: Address::repeat_byte(1),
            to: Some(Address::repeat_byte(2)),
            value: U256::ZERO,
            data: vec![],
            nonce,
            gas_limit: 21_000,
            gas_price: U256::from(gas_price),
        }
        .into_transaction()
    }

    #[test]
    fn rejects_duplicate_hash() {
        let mut pool = Mempool::new(10);
        let t = tx(1, 0);
        pool.add(t.clone());
        assert_eq!(pool.add(t.clone()), AddOutcome::Duplicate);
    }

    #[test]
    fn gas_price_ordering_matches_spec_scenario() {
        let mut pool = Mempool::new(10);
        let low = tx(1_000_000_000, 0);
        let high = tx(10_000_000_000, 1);
        let medium = tx(5_000_000_000, 2);
        pool.add(low.clone());
        pool.add(high.clone());
        pool.add(medium.clone());

        let ordered = pool.pending(None);
        let hashes: Vec<Hash> = ordered.iter().map(|t| t.hash).collect();
        assert_eq!(hashes, vec![high.hash, medium.hash, low.hash]);
    }

    #[test]
    fn eviction_drops_lowest_gas_price_when_full() {
        let mut pool = Mempool::new(3);
        let a = tx(5_000_000_000, 0);
        let b = tx(2_000_000_000, 1);
        let c = tx(3_000_000_000, 2);
        let d = tx(1_000_000_000, 3);
        pool.add(a.clone());
        pool.add(b.clone());
        pool.add(c.clone());
        pool.add(d.clone());

        assert_eq!(pool.size(), 3);
        assert!(pool.get(&d.hash).is_none());
        assert!(pool.get(&b.hash).is_some());
    }

    #[test]
    fn size_never_exceeds_max() {
        let mut pool = Mempool::new(2);
        for i in 0..10 {
            pool.add(tx(i + 1, i));
            assert!(pool.size() <= 2);
        }
    }

    #[test]
    fn by_sender_filters_correctly() {
        let mut pool = Mempool::new(10);
        let t = tx(1, 0);
        let from = t.from;
        pool.add(t);
        assert_eq!(pool.by_sender(from).len(), 1);
        assert_eq!(pool.by_sender(Address::repeat_byte(0xee)).len(), 0);
    }

    #[test]
    fn value_field_is_preserved() {
        let mut pool = Mempool::new(10);
        let t = tx(1, 0);
        pool.add(t.clone());
        assert_eq!(pool.get(&t.hash).unwrap().value, U256::ZERO);
    }
}

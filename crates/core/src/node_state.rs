//! The mutable state a single writer lock guards: DAG, mempool, executor,
//! and receipt index.

use std::collections::HashMap;

use bdnode_types::{Hash, Receipt};

use crate::dag::DagGraph;
use crate::executor::Executor;
use crate::mempool::Mempool;

pub struct NodeState {
    pub dag: DagGraph,
    pub mempool: Mempool,
    pub executor: Executor,
    pub receipts: HashMap<Hash, Receipt>,
}

impl NodeState {
    pub fn new(dag: DagGraph, mempool: Mempool, executor: Executor) -> Self {
        Self {
            dag,
            mempool,
            executor,
            receipts: HashMap::new(),
        }
    }

    pub fn get_receipt(&self, hash: &Hash) -> Option<&Receipt> {
        self.receipts.get(hash)
    }

    pub fn get_all_receipts(&self) -> Vec<&Receipt> {
        self.receipts.values().collect()
    }
}

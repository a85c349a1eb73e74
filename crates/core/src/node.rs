//! The node orchestrator (C5): owns C1–C4, sequences their lifecycle, and
//! multiplexes events to subscribers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bdnode_config::NodeConfig;
use bdnode_types::{Block, Hash, Receipt, Transaction, TransactionRequest};
use tokio::sync::{broadcast, Mutex};

use crate::dag::{AddBlockOutcome, DagGraph, DagStats};
use crate::events::{NodeEvent, EVENT_CHANNEL_CAPACITY};
use crate::executor::Executor;
use crate::mempool::{AddOutcome, Mempool};
use crate::miner::{Miner, MinerConfig};
use crate::node_state::NodeState;

pub struct NodeOrchestrator {
    state: Arc<Mutex<NodeState>>,
    miner: Miner,
    events: broadcast::Sender<NodeEvent>,
    started: AtomicBool,
    chain_id: u64,
}

impl NodeOrchestrator {
    /// Builds a fresh node: genesis block, funded genesis accounts, and an
    /// idle miner. Does not start mining — call [`NodeOrchestrator::start`].
    pub fn new(config: NodeConfig) -> Self {
        let genesis = Block::genesis(config.miner_address, Hash::ZERO, 0);
        let dag = DagGraph::new(config.k, genesis);
        let mempool = Mempool::new(config.mempool_max_size);

        let mut executor = Executor::new();
        for (addr, balance) in &config.genesis_accounts {
            executor.fund_account(*addr, *balance);
        }

        let state = Arc::new(Mutex::new(NodeState::new(dag, mempool, executor)));
        let (events, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let miner_config = MinerConfig {
            parallelism: config.parallelism,
            block_time_ms: config.block_time_ms,
            max_parents: config.max_parents,
            miner_address: config.miner_address,
        };
        let miner = Miner::new(state.clone(), events.clone(), miner_config);

        Self {
            state,
            miner,
            events,
            started: AtomicBool::new(false),
            chain_id: config.chain_id,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.events.subscribe()
    }

    /// Starts the miner and announces node startup. A no-op if already
    /// started.
    pub fn start(&mut self) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("start() called on an already-started node, ignoring");
            return;
        }
        self.miner.start();
        let _ = self.events.send(NodeEvent::Started);
    }

    pub fn stop(&mut self) {
        if !self.started.swap(false, Ordering::SeqCst) {
            tracing::debug!("stop() called on an already-stopped node, ignoring");
            return;
        }
        self.miner.stop();
        let _ = self.events.send(NodeEvent::Stopped);
    }

    pub fn is_mining(&self) -> bool {
        self.miner.is_running()
    }

    pub fn update_miner_config(&mut self, config: MinerConfig) {
        self.miner.update_config(config);
    }

    /// Forwards `tx` to the mempool; emits `transaction-added` iff accepted.
    pub async fn add_transaction(&self, req: TransactionRequest) -> anyhow::Result<Hash> {
        let tx = req.into_transaction();
        let hash = tx.hash;
        let mut state = self.state.lock().await;
        match state.mempool.add(tx.clone()) {
            AddOutcome::Accepted => {
                drop(state);
                let _ = self.events.send(NodeEvent::TransactionAdded(tx));
                Ok(hash)
            }
            AddOutcome::Duplicate => Err(anyhow::anyhow!("duplicate transaction {hash}")),
        }
    }

    /// Starts the miner if idle, waits for `n` new `block-mined` events,
    /// and leaves the miner in whatever running state it ended up in
    /// (callers that want it stopped again call [`NodeOrchestrator::stop`]).
    pub async fn mine_blocks(&mut self, n: usize) -> anyhow::Result<Vec<Block>> {
        let mut rx = self.events.subscribe();
        let was_running = self.miner.is_running();
        if !was_running {
            self.miner.start();
        }

        let mut mined = Vec::with_capacity(n);
        while mined.len() < n {
            match rx.recv().await {
                Ok(NodeEvent::BlockMined(block)) => mined.push(block),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    anyhow::bail!("event channel closed while waiting for mined blocks")
                }
            }
        }

        if !was_running {
            self.miner.stop();
        }
        Ok(mined)
    }

    pub async fn get_block(&self, hash: &Hash) -> Option<Block> {
        self.state.lock().await.dag.get_block(hash).cloned()
    }

    pub async fn get_block_by_depth(&self, depth: u64) -> Option<Block> {
        self.state.lock().await.dag.get_block_at_depth(depth).cloned()
    }

    pub async fn get_tips(&self) -> Vec<Hash> {
        self.state.lock().await.dag.get_tips()
    }

    pub async fn get_max_depth(&self) -> u64 {
        self.state.lock().await.dag.get_max_depth()
    }

    pub async fn get_stats(&self) -> DagStats {
        self.state.lock().await.dag.get_stats()
    }

    pub async fn get_blue_set(&self) -> Vec<Hash> {
        self.state
            .lock()
            .await
            .dag
            .get_blue_blocks()
            .iter()
            .map(|b| b.hash)
            .collect()
    }

    pub async fn get_red_set(&self) -> Vec<Hash> {
        self.state
            .lock()
            .await
            .dag
            .get_red_blocks()
            .iter()
            .map(|b| b.hash)
            .collect()
    }

    pub async fn get_block_parents(&self, hash: &Hash) -> Option<Vec<Hash>> {
        self.state
            .lock()
            .await
            .dag
            .get_block(hash)
            .map(|b| b.parent_hashes.clone())
    }

    pub async fn get_block_children(&self, hash: &Hash) -> Vec<Hash> {
        self.state
            .lock()
            .await
            .dag
            .get_children(hash)
            .into_iter()
            .collect()
    }

    pub async fn get_anticone(&self, hash: &Hash) -> Vec<Hash> {
        self.state
            .lock()
            .await
            .dag
            .anticone(hash)
            .into_iter()
            .collect()
    }

    pub async fn get_blue_score(&self, hash: &Hash) -> Option<u64> {
        self.state.lock().await.dag.get_block(hash).map(|b| b.blue_score)
    }

    pub async fn get_receipt(&self, hash: &Hash) -> Option<Receipt> {
        self.state.lock().await.get_receipt(hash).cloned()
    }

    pub async fn get_balance(&self, addr: alloy_primitives::Address) -> alloy_primitives::U256 {
        self.state.lock().await.executor.get_balance(addr)
    }

    pub async fn get_nonce(&self, addr: alloy_primitives::Address) -> u64 {
        self.state.lock().await.executor.get_nonce(addr)
    }

    pub async fn get_code(&self, addr: alloy_primitives::Address) -> Vec<u8> {
        self.state.lock().await.executor.get_code(addr)
    }

    pub async fn get_storage_at(
        &self,
        addr: alloy_primitives::Address,
        key: alloy_primitives::U256,
    ) -> alloy_primitives::U256 {
        self.state.lock().await.executor.get_storage_at(addr, key)
    }

    pub async fn call(
        &self,
        to: alloy_primitives::Address,
        data: Vec<u8>,
        from: Option<alloy_primitives::Address>,
        value: Option<alloy_primitives::U256>,
    ) -> anyhow::Result<Vec<u8>> {
        self.state
            .lock()
            .await
            .executor
            .call(to, data, from, value)
            .map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn estimate_gas(&self, req: &TransactionRequest) -> anyhow::Result<u64> {
        // `estimate_gas` must not consume a nonce or mutate the mempool;
        // build a throwaway transaction purely to run the executor's
        // checkpointed estimate.
        let tx = req.clone().into_transaction();
        self.state
            .lock()
            .await
            .executor
            .estimate_gas(&tx)
            .map_err(|e| anyhow::anyhow!(e))
    }

    pub async fn transaction_count(&self) -> usize {
        self.state.lock().await.mempool.size()
    }

    pub async fn get_transaction_from_pool(&self, hash: &Hash) -> Option<Transaction> {
        self.state.lock().await.mempool.get(hash)
    }

    pub async fn append_block_for_test(&self, block: Block) -> anyhow::Result<AddBlockOutcome> {
        Ok(self.state.lock().await.dag.add_block(block)?)
    }
}

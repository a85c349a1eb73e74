//! The miner (C4): round-driven parallel block production.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bdnode_types::{Block, Hash};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::dag::AddBlockOutcome;
use crate::events::NodeEvent;
use crate::node_state::NodeState;

#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub parallelism: usize,
    pub block_time_ms: u64,
    pub max_parents: usize,
    pub miner_address: alloy_primitives::Address,
}

/// Given the tip snapshot `tips` taken at round start and this block's
/// index `i` within the round, returns its parent set: a rotation of
/// `min(max_parents, |tips|)` tips starting at `i mod |tips|`, deduplicated
/// and in first-occurrence order.
pub fn select_parents(tips: &[Hash], i: usize, max_parents: usize) -> Vec<Hash> {
    if tips.is_empty() {
        return Vec::new();
    }
    if tips.len() == 1 {
        return vec![tips[0]];
    }
    let n = max_parents.min(tips.len());
    let start = i % tips.len();
    (0..n).map(|j| tips[(start + j) % tips.len()]).collect()
}

/// Runs exactly one mining round against `state`: snapshots tips once,
/// produces `config.parallelism` blocks referencing rotated parent subsets,
/// drains up to ten mempool transactions per block, executes them, appends
/// every block to the DAG in order, and returns the committed blocks for
/// the caller to broadcast as `block-mined` events.
pub fn mine_round(state: &mut NodeState, config: &MinerConfig) -> anyhow::Result<Vec<Block>> {
    let tips = state.dag.get_tips();
    if tips.is_empty() {
        anyhow::bail!("dag has no tips; genesis must always be present");
    }

    let mut pending_blocks = Vec::with_capacity(config.parallelism);
    for i in 0..config.parallelism {
        let parents = select_parents(&tips, i, config.max_parents);
        let txs = state.mempool.pending(Some(10));

        state.executor.reset_cumulative_gas();
        let mut included = Vec::with_capacity(txs.len());
        for tx in &txs {
            match state.executor.execute(tx, Hash::ZERO) {
                Ok(outcome) => {
                    state.receipts.insert(tx.hash, outcome.receipt);
                    included.push(tx.clone());
                }
                Err(e) => {
                    tracing::warn!(tx = %tx.hash, error = %e, "skipping transaction after executor error");
                }
            }
        }

        let state_root = state.executor.get_state_root();
        let tx_hashes: Vec<Hash> = included.iter().map(|t| t.hash).collect();
        let transactions_root = bdnode_types::transactions_root(&tx_hashes);
        let timestamp = now_ms();

        let mut block = Block {
            hash: Hash::ZERO,
            parent_hashes: parents,
            timestamp,
            miner: config.miner_address,
            difficulty: 0,
            state_root,
            transactions_root,
            nonce: i as u64,
            transactions: included,
            color: bdnode_types::BlockColor::Pending,
            dag_depth: 0,
            blue_score: 0,
        };
        block.hash = block.compute_hash();

        // Fix up receipts with the real block hash now that it's known.
        for tx in &block.transactions {
            if let Some(receipt) = state.receipts.get_mut(&tx.hash) {
                receipt.block_hash = block.hash;
            }
        }

        pending_blocks.push(block);
    }

    let mut committed = Vec::with_capacity(pending_blocks.len());
    for block in pending_blocks {
        match state.dag.add_block(block.clone())? {
            AddBlockOutcome::Added => {
                for tx in &block.transactions {
                    state.mempool.remove(&tx.hash);
                }
                committed.push(block);
            }
            AddBlockOutcome::AlreadyPresent => {}
        }
    }

    Ok(committed)
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Owns the background round-ticker. `start`/`stop` are idempotent no-ops
/// when already in the requested state.
pub struct Miner {
    state: Arc<Mutex<NodeState>>,
    events: broadcast::Sender<NodeEvent>,
    config: Arc<std::sync::RwLock<MinerConfig>>,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Miner {
    pub fn new(
        state: Arc<Mutex<NodeState>>,
        events: broadcast::Sender<NodeEvent>,
        config: MinerConfig,
    ) -> Self {
        Self {
            state,
            events,
            config: Arc::new(std::sync::RwLock::new(config)),
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Fires an immediate round, then schedules further rounds every
    /// `block_time_ms` until [`Miner::stop`].
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let state = self.state.clone();
        let events = self.events.clone();
        let config = self.config.clone();
        let running = self.running.clone();

        let handle = tokio::spawn(async move {
            loop {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let round_config = config.read().expect("miner config lock poisoned").clone();
                {
                    let mut state = state.lock().await;
                    match mine_round(&mut state, &round_config) {
                        Ok(blocks) => {
                            for block in blocks {
                                let _ = events.send(NodeEvent::BlockMined(block));
                            }
                        }
                        Err(e) => tracing::error!(error = %e, "mining round failed"),
                    }
                }
                tokio::time::sleep(std::time::Duration::from_millis(round_config.block_time_ms))
                    .await;
            }
        });
        self.task = Some(handle);
        let _ = self.events.send(NodeEvent::MiningStarted);
    }

    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let _ = self.events.send(NodeEvent::MiningStopped);
    }

    /// Restarts the round timer (if running) so a changed `block_time_ms`
    /// takes effect immediately rather than after the current sleep.
    pub fn update_config(&mut self, config: MinerConfig) {
        *self.config.write().expect("miner config lock poisoned") = config;
        if self.is_running() {
            self.stop();
            self.start();
        }
    }
}

//! Event types broadcast by the node orchestrator (C5) and consumed by the
//! WebSocket server and RPC notification paths.

use bdnode_types::{Block, Transaction};

/// Capacity of the orchestrator's broadcast channel. A slow WebSocket
/// subscriber that falls this far behind starts missing messages rather
/// than blocking the writer — `tokio::sync::broadcast`'s standard
/// lagging-receiver behavior.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub enum NodeEvent {
    Started,
    Stopped,
    MiningStarted,
    MiningStopped,
    BlockMined(Block),
    TransactionAdded(Transaction),
}

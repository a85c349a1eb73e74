//! The DAG graph, mempool, EVM executor, miner, and node orchestrator:
//! the hard engineering center of the node (spec components C1–C5).

pub mod dag;
pub mod error;
pub mod events;
pub mod executor;
pub mod mempool;
pub mod miner;
pub mod node;
mod node_state;

pub use dag::{AddBlockOutcome, DagGraph, DagStats};
pub use events::NodeEvent;
pub use executor::Executor;
pub use mempool::{AddOutcome, Mempool};
pub use miner::{select_parents, Miner, MinerConfig};
pub use node::NodeOrchestrator;
pub use node_state::NodeState;

//! JSON-RPC trait declarations for the node's `eth_*`, `dag_*`, and
//! `net_*` namespaces, plus the wire-shape structs they return.
//! `bdnode_api_server` implements these traits against a
//! `bdnode_core::NodeOrchestrator`.

mod namespaces;
pub mod views;

pub use namespaces::{DagNamespaceServer, EthNamespaceServer, NetNamespaceServer};
pub use views::{
    BlockTag, BlockTransactions, BlockView, DagStatsView, ReceiptView, TransactionRequestView,
    TransactionView,
};

//! DAG-native JSON-RPC surface: methods with no Ethereum analogue, exposing
//! GHOSTDAG coloring and the miner's imperative controls directly.

use bdnode_types::Hash;
use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use crate::views::{BlockView, DagStatsView, TransactionRequestView};

#[rpc(server, namespace = "dag")]
pub trait DagNamespace {
    #[method(name = "getDAGInfo")]
    async fn get_dag_info(&self) -> RpcResult<DagStatsView>;

    #[method(name = "getStats")]
    async fn get_stats(&self) -> RpcResult<DagStatsView>;

    #[method(name = "getBlockByHash")]
    async fn get_block_by_hash(&self, hash: Hash) -> RpcResult<Option<BlockView>>;

    #[method(name = "sendTransaction")]
    async fn send_transaction(&self, tx: TransactionRequestView) -> RpcResult<Hash>;

    #[method(name = "getBlueSet")]
    async fn get_blue_set(&self) -> RpcResult<Vec<Hash>>;

    #[method(name = "getRedSet")]
    async fn get_red_set(&self) -> RpcResult<Vec<Hash>>;

    #[method(name = "getTips")]
    async fn get_tips(&self) -> RpcResult<Vec<Hash>>;

    #[method(name = "getBlockParents")]
    async fn get_block_parents(&self, hash: Hash) -> RpcResult<Vec<Hash>>;

    #[method(name = "getBlockChildren")]
    async fn get_block_children(&self, hash: Hash) -> RpcResult<Vec<Hash>>;

    #[method(name = "getAnticone")]
    async fn get_anticone(&self, hash: Hash) -> RpcResult<Vec<Hash>>;

    #[method(name = "getBlueScore")]
    async fn get_blue_score(&self, hash: Hash) -> RpcResult<Option<String>>;

    #[method(name = "mineBlocks")]
    async fn mine_blocks(&self, count: usize) -> RpcResult<Vec<BlockView>>;
}

use std::sync::Arc;

use bdnode_api_decl::{BlockView, DagNamespaceServer, DagStatsView, TransactionRequestView};
use bdnode_core::NodeOrchestrator;
use bdnode_types::Hash;
use jsonrpsee::core::{async_trait, RpcResult};
use tokio::sync::Mutex;

use crate::error::RpcErrorAdapter;

pub struct DagNamespace {
    node: Arc<Mutex<NodeOrchestrator>>,
}

impl DagNamespace {
    pub fn new(node: Arc<Mutex<NodeOrchestrator>>) -> Self {
        Self { node }
    }
}

fn to_stats_view(stats: bdnode_core::DagStats) -> DagStatsView {
    DagStatsView {
        block_count: stats.block_count,
        tip_count: stats.tip_count,
        max_depth: stats.max_depth,
        blue_count: stats.blue_count,
        red_count: stats.red_count,
    }
}

#[async_trait]
impl DagNamespaceServer for DagNamespace {
    async fn get_dag_info(&self) -> RpcResult<DagStatsView> {
        Ok(to_stats_view(self.node.lock().await.get_stats().await))
    }

    async fn get_stats(&self) -> RpcResult<DagStatsView> {
        self.get_dag_info().await
    }

    async fn get_block_by_hash(&self, hash: Hash) -> RpcResult<Option<BlockView>> {
        Ok(self
            .node
            .lock()
            .await
            .get_block(&hash)
            .await
            .map(|b| BlockView::from_block(&b, true)))
    }

    async fn send_transaction(&self, tx: TransactionRequestView) -> RpcResult<Hash> {
        self.node
            .lock()
            .await
            .add_transaction(tx.into())
            .await
            .map_err(RpcErrorAdapter::into)
    }

    async fn get_blue_set(&self) -> RpcResult<Vec<Hash>> {
        Ok(self.node.lock().await.get_blue_set().await)
    }

    async fn get_red_set(&self) -> RpcResult<Vec<Hash>> {
        Ok(self.node.lock().await.get_red_set().await)
    }

    async fn get_tips(&self) -> RpcResult<Vec<Hash>> {
        Ok(self.node.lock().await.get_tips().await)
    }

    async fn get_block_parents(&self, hash: Hash) -> RpcResult<Vec<Hash>> {
        Ok(self
            .node
            .lock()
            .await
            .get_block_parents(&hash)
            .await
            .unwrap_or_default())
    }

    async fn get_block_children(&self, hash: Hash) -> RpcResult<Vec<Hash>> {
        Ok(self.node.lock().await.get_block_children(&hash).await)
    }

    async fn get_anticone(&self, hash: Hash) -> RpcResult<Vec<Hash>> {
        Ok(self.node.lock().await.get_anticone(&hash).await)
    }

    async fn get_blue_score(&self, hash: Hash) -> RpcResult<Option<String>> {
        Ok(self
            .node
            .lock()
            .await
            .get_blue_score(&hash)
            .await
            .map(|s| format!("0x{s:x}")))
    }

    async fn mine_blocks(&self, count: usize) -> RpcResult<Vec<BlockView>> {
        let mut node = self.node.lock().await;
        let blocks = node
            .mine_blocks(count)
            .await
            .map_err(RpcErrorAdapter::into)?;
        Ok(blocks
            .iter()
            .map(|b| BlockView::from_block(b, true))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdnode_config::NodeConfigBuilder;

    fn namespace() -> DagNamespace {
        let config = NodeConfigBuilder::new()
            .parallelism(2)
            .max_parents(2)
            .block_time_ms(20)
            .build()
            .unwrap();
        DagNamespace::new(Arc::new(Mutex::new(NodeOrchestrator::new(config))))
    }

    #[tokio::test]
    async fn mine_blocks_grows_tips_and_stats() {
        let ns = namespace();
        let mined = ns.mine_blocks(2).await.unwrap();
        assert_eq!(mined.len(), 2);

        let tips = ns.get_tips().await.unwrap();
        assert_eq!(tips.len(), 2);

        let stats = ns.get_stats().await.unwrap();
        assert_eq!(stats.block_count, 3); // genesis + 2 mined
    }

    #[tokio::test]
    async fn unknown_hash_yields_empty_relations() {
        let ns = namespace();
        let unknown = Hash::ZERO;
        assert_eq!(ns.get_block_parents(unknown).await.unwrap(), Vec::<Hash>::new());
        assert!(ns.get_blue_score(unknown).await.unwrap().is_none());
    }
}

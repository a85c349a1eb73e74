//! Translates the wire's block tags (`"latest"`, `"earliest"`, `"pending"`,
//! or a hex depth) to a concrete DAG depth.

use bdnode_api_decl::BlockTag;
use bdnode_core::NodeOrchestrator;

/// `"pending"` has no distinct meaning for this node (no mempool-speculative
/// block view is exposed), so it resolves the same as `"latest"`.
pub async fn resolve_depth(node: &NodeOrchestrator, tag: BlockTag) -> u64 {
    match tag {
        BlockTag::Earliest => 0,
        BlockTag::Latest | BlockTag::Pending => node.get_max_depth().await,
        BlockTag::Depth(d) => d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdnode_config::NodeConfigBuilder;

    #[tokio::test]
    async fn pending_resolves_like_latest() {
        let config = NodeConfigBuilder::new().build().unwrap();
        let mut node = NodeOrchestrator::new(config);
        node.mine_blocks(1).await.unwrap();

        let latest = resolve_depth(&node, BlockTag::Latest).await;
        let pending = resolve_depth(&node, BlockTag::Pending).await;
        assert_eq!(latest, pending);
        assert_eq!(resolve_depth(&node, BlockTag::Earliest).await, 0);
        assert_eq!(resolve_depth(&node, BlockTag::Depth(7)).await, 7);
    }
}

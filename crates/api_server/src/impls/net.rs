use std::sync::Arc;

use bdnode_api_decl::NetNamespaceServer;
use bdnode_core::NodeOrchestrator;
use jsonrpsee::core::{async_trait, RpcResult};
use tokio::sync::Mutex;

pub struct NetNamespace {
    node: Arc<Mutex<NodeOrchestrator>>,
}

impl NetNamespace {
    pub fn new(node: Arc<Mutex<NodeOrchestrator>>) -> Self {
        Self { node }
    }
}

#[async_trait]
impl NetNamespaceServer for NetNamespace {
    async fn version(&self) -> RpcResult<String> {
        Ok(self.node.lock().await.chain_id().to_string())
    }

    async fn listening(&self) -> RpcResult<bool> {
        Ok(true)
    }

    async fn peer_count(&self) -> RpcResult<String> {
        Ok("0x0".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdnode_config::NodeConfigBuilder;

    #[tokio::test]
    async fn version_reports_chain_id() {
        let config = NodeConfigBuilder::new().build().unwrap();
        let ns = NetNamespace::new(Arc::new(Mutex::new(NodeOrchestrator::new(config))));
        assert_eq!(ns.version().await.unwrap(), "1337");
        assert!(ns.listening().await.unwrap());
        assert_eq!(ns.peer_count().await.unwrap(), "0x0");
    }
}

use std::sync::Arc;

use bdnode_api_decl::{BlockTag, BlockView, EthNamespaceServer, ReceiptView, TransactionRequestView};
use bdnode_common::genesis_accounts::GENESIS_ACCOUNTS;
use bdnode_core::NodeOrchestrator;
use bdnode_types::{u256_to_hex, Address, Hash, U256};
use jsonrpsee::core::{async_trait, RpcResult};
use tokio::sync::Mutex;

use crate::error::RpcErrorAdapter;
use crate::resolve::resolve_depth;

pub struct EthNamespace {
    node: Arc<Mutex<NodeOrchestrator>>,
}

impl EthNamespace {
    pub fn new(node: Arc<Mutex<NodeOrchestrator>>) -> Self {
        Self { node }
    }
}

#[async_trait]
impl EthNamespaceServer for EthNamespace {
    async fn chain_id(&self) -> RpcResult<String> {
        Ok(format!("0x{:x}", self.node.lock().await.chain_id()))
    }

    async fn block_number(&self) -> RpcResult<String> {
        Ok(format!("0x{:x}", self.node.lock().await.get_max_depth().await))
    }

    async fn get_balance(&self, address: Address, tag: BlockTag) -> RpcResult<String> {
        let node = self.node.lock().await;
        let _ = resolve_depth(&node, tag).await;
        Ok(u256_to_hex(node.get_balance(address).await))
    }

    async fn get_transaction_count(&self, address: Address, tag: BlockTag) -> RpcResult<String> {
        let node = self.node.lock().await;
        let _ = resolve_depth(&node, tag).await;
        Ok(format!("0x{:x}", node.get_nonce(address).await))
    }

    async fn get_code(&self, address: Address, tag: BlockTag) -> RpcResult<String> {
        let node = self.node.lock().await;
        let _ = resolve_depth(&node, tag).await;
        Ok(format!("0x{}", hex::encode(node.get_code(address).await)))
    }

    async fn get_storage_at(
        &self,
        address: Address,
        slot: U256,
        tag: BlockTag,
    ) -> RpcResult<String> {
        let node = self.node.lock().await;
        let _ = resolve_depth(&node, tag).await;
        Ok(u256_to_hex(node.get_storage_at(address, slot).await))
    }

    async fn get_block_by_hash(
        &self,
        hash: Hash,
        full_txs: bool,
    ) -> RpcResult<Option<BlockView>> {
        let node = self.node.lock().await;
        Ok(node.get_block(&hash).await.map(|b| BlockView::from_block(&b, full_txs)))
    }

    async fn get_block_by_number(
        &self,
        tag: BlockTag,
        full_txs: bool,
    ) -> RpcResult<Option<BlockView>> {
        let node = self.node.lock().await;
        let depth = resolve_depth(&node, tag).await;
        Ok(node
            .get_block_by_depth(depth)
            .await
            .map(|b| BlockView::from_block(&b, full_txs)))
    }

    async fn send_transaction(&self, tx: TransactionRequestView) -> RpcResult<Hash> {
        self.node
            .lock()
            .await
            .add_transaction(tx.into())
            .await
            .map_err(RpcErrorAdapter::into)
    }

    async fn send_raw_transaction(&self, tx: TransactionRequestView) -> RpcResult<Hash> {
        self.send_transaction(tx).await
    }

    async fn call(&self, tx: TransactionRequestView, tag: BlockTag) -> RpcResult<String> {
        let node = self.node.lock().await;
        let _ = resolve_depth(&node, tag).await;
        let to = tx
            .to
            .ok_or_else(|| RpcErrorAdapter::into(anyhow::anyhow!("invalid params: call requires `to`")))?;
        let result = node
            .call(to, tx.data, Some(tx.from), Some(tx.value))
            .await
            .map_err(RpcErrorAdapter::into)?;
        Ok(format!("0x{}", hex::encode(result)))
    }

    async fn estimate_gas(&self, tx: TransactionRequestView) -> RpcResult<String> {
        let req: bdnode_types::TransactionRequest = tx.into();
        let gas = self
            .node
            .lock()
            .await
            .estimate_gas(&req)
            .await
            .map_err(RpcErrorAdapter::into)?;
        Ok(format!("0x{gas:x}"))
    }

    async fn get_transaction_receipt(&self, hash: Hash) -> RpcResult<Option<ReceiptView>> {
        Ok(self
            .node
            .lock()
            .await
            .get_receipt(&hash)
            .await
            .map(|r| ReceiptView::from_receipt(&r)))
    }

    async fn gas_price(&self) -> RpcResult<String> {
        Ok(format!("0x{:x}", bdnode_core::executor::FIXED_GAS_PRICE))
    }

    async fn accounts(&self) -> RpcResult<Vec<Address>> {
        Ok(GENESIS_ACCOUNTS.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdnode_api_decl::BlockTag;
    use bdnode_config::NodeConfigBuilder;
    use bdnode_types::U256;

    fn namespace() -> EthNamespace {
        let config = NodeConfigBuilder::new()
            .parallelism(1)
            .block_time_ms(20)
            .build()
            .unwrap();
        EthNamespace::new(Arc::new(Mutex::new(NodeOrchestrator::new(config))))
    }

    #[tokio::test]
    async fn chain_id_matches_config() {
        let ns = namespace();
        assert_eq!(ns.chain_id().await.unwrap(), "0x539");
    }

    #[tokio::test]
    async fn genesis_account_is_funded() {
        let ns = namespace();
        let addr = GENESIS_ACCOUNTS[0];
        let balance = ns.get_balance(addr, BlockTag::Latest).await.unwrap();
        assert_ne!(U256::from_str_radix(balance.trim_start_matches("0x"), 16).unwrap(), U256::ZERO);
    }

    #[tokio::test]
    async fn call_without_to_is_rejected() {
        let ns = namespace();
        let tx = TransactionRequestView {
            from: GENESIS_ACCOUNTS[0],
            to: None,
            value: U256::ZERO,
            data: vec![],
            nonce: 0,
            gas_limit: 0,
            gas_price: U256::ZERO,
        };
        assert!(ns.call(tx, BlockTag::Latest).await.is_err());
    }

    #[tokio::test]
    async fn mining_then_block_number_advances() {
        let ns = namespace();
        assert_eq!(ns.block_number().await.unwrap(), "0x0");
        ns.node.lock().await.mine_blocks(1).await.unwrap();
        assert_eq!(ns.block_number().await.unwrap(), "0x1");
    }
}

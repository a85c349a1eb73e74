//! Ethereum-compatible JSON-RPC surface. Block depth stands in for
//! Ethereum's block number; `chainId` is fixed at 1337.

use bdnode_types::{Address, Hash, U256};
use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use crate::views::{BlockTag, BlockView, ReceiptView, TransactionRequestView};

#[rpc(server, namespace = "eth")]
pub trait EthNamespace {
    #[method(name = "chainId")]
    async fn chain_id(&self) -> RpcResult<String>;

    #[method(name = "blockNumber")]
    async fn block_number(&self) -> RpcResult<String>;

    #[method(name = "getBalance")]
    async fn get_balance(&self, address: Address, tag: BlockTag) -> RpcResult<String>;

    #[method(name = "getTransactionCount")]
    async fn get_transaction_count(&self, address: Address, tag: BlockTag) -> RpcResult<String>;

    #[method(name = "getCode")]
    async fn get_code(&self, address: Address, tag: BlockTag) -> RpcResult<String>;

    #[method(name = "getStorageAt")]
    async fn get_storage_at(
        &self,
        address: Address,
        slot: U256,
        tag: BlockTag,
    ) -> RpcResult<String>;

    #[method(name = "getBlockByHash")]
    async fn get_block_by_hash(
        &self,
        hash: Hash,
        full_txs: bool,
    ) -> RpcResult<Option<BlockView>>;

    #[method(name = "getBlockByNumber")]
    async fn get_block_by_number(
        &self,
        tag: BlockTag,
        full_txs: bool,
    ) -> RpcResult<Option<BlockView>>;

    #[method(name = "sendTransaction")]
    async fn send_transaction(&self, tx: TransactionRequestView) -> RpcResult<Hash>;

    #[method(name = "sendRawTransaction")]
    async fn send_raw_transaction(&self, tx: TransactionRequestView) -> RpcResult<Hash>;

    #[method(name = "call")]
    async fn call(&self, tx: TransactionRequestView, tag: BlockTag) -> RpcResult<String>;

    #[method(name = "estimateGas")]
    async fn estimate_gas(&self, tx: TransactionRequestView) -> RpcResult<String>;

    #[method(name = "getTransactionReceipt")]
    async fn get_transaction_receipt(&self, hash: Hash) -> RpcResult<Option<ReceiptView>>;

    #[method(name = "gasPrice")]
    async fn gas_price(&self) -> RpcResult<String>;

    #[method(name = "accounts")]
    async fn accounts(&self) -> RpcResult<Vec<Address>>;
}

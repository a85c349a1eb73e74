//! `net_*` namespace: the three methods a local dev node needs to satisfy
//! tooling that probes for peer-to-peer liveness it doesn't have.

use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

#[rpc(server, namespace = "net")]
pub trait NetNamespace {
    #[method(name = "version")]
    async fn version(&self) -> RpcResult<String>;

    #[method(name = "listening")]
    async fn listening(&self) -> RpcResult<bool>;

    #[method(name = "peerCount")]
    async fn peer_count(&self) -> RpcResult<String>;
}

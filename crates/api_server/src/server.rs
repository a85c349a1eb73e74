//! The HTTP JSON-RPC server: CORS-allow-all, a `/health` proxy endpoint,
//! and the merged `eth_*`/`dag_*`/`net_*` namespaces.

use std::net::SocketAddr;
use std::sync::Arc;

use bdnode_api_decl::{DagNamespaceServer, EthNamespaceServer, NetNamespaceServer};
use bdnode_core::NodeOrchestrator;
use http::Method;
use jsonrpsee::server::middleware::http::ProxyGetRequestLayer;
use jsonrpsee::server::{ServerBuilder, ServerHandle};
use jsonrpsee::RpcModule;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::impls::{DagNamespace, EthNamespace, NetNamespace};

pub type SharedNode = Arc<Mutex<NodeOrchestrator>>;

/// Builds the merged RPC module plus the internal `/health` proxy target.
fn build_rpc(node: SharedNode) -> RpcModule<()> {
    let mut rpc = RpcModule::new(());
    rpc.merge(EthNamespace::new(node.clone()).into_rpc()).unwrap();
    rpc.merge(DagNamespace::new(node.clone()).into_rpc()).unwrap();
    rpc.merge(NetNamespace::new(node.clone()).into_rpc()).unwrap();

    rpc.register_async_method("internal_health", move |_params, _ctx| {
        let node = node.clone();
        async move {
            let node = node.lock().await;
            let blocks = node.get_stats().await.block_count;
            let status = if node.is_mining() { "running" } else { "stopped" };
            json!({"status": "ok", "node": status, "blocks": blocks})
        }
    })
    .expect("internal_health does not collide with a namespaced method");

    rpc
}

/// Starts the HTTP JSON-RPC server bound to `addr`. CORS is wide-open, as
/// appropriate for a local development node.
pub async fn serve_http(addr: SocketAddr, node: SharedNode) -> anyhow::Result<ServerHandle> {
    let rpc = build_rpc(node);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST]);
    let health = ProxyGetRequestLayer::new("/health", "internal_health")?;

    let server = ServerBuilder::default()
        .http_only()
        .set_http_middleware(tower::ServiceBuilder::new().layer(cors).layer(health))
        .build(addr)
        .await?;

    Ok(server.start(rpc))
}

//! HTTP JSON-RPC and `/ws` event-stream servers for the node's external
//! surface. `bdnode_cli` wires a [`bdnode_core::NodeOrchestrator`] into
//! [`serve`] to bring that surface up.

mod error;
mod impls;
mod resolve;
mod server;
mod ws;

pub use server::{serve_http, SharedNode};
pub use ws::serve_ws;

use std::net::SocketAddr;

use jsonrpsee::server::ServerHandle;

/// Starts both servers and returns once both are listening. The returned
/// [`ServerHandle`] controls only the HTTP server; the WebSocket listener
/// runs for the life of the process, with no intrinsic timeout.
pub async fn serve(
    http_addr: SocketAddr,
    ws_addr: SocketAddr,
    node: SharedNode,
) -> anyhow::Result<ServerHandle> {
    let handle = server::serve_http(http_addr, node.clone()).await?;
    tokio::spawn(async move {
        if let Err(error) = ws::serve_ws(ws_addr, node).await {
            tracing::error!(%error, "websocket server exited");
        }
    });
    Ok(handle)
}

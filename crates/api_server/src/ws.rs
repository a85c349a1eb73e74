//! The `/ws` event stream: a bespoke typed-message protocol, distinct from
//! JSON-RPC, so it's served over a raw `tokio-tungstenite` listener rather
//! than jsonrpsee's own WebSocket transport.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use bdnode_api_decl::BlockView;
use bdnode_core::NodeEvent;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;

use crate::server::SharedNode;

const HISTORY_CAPACITY: usize = 100;
const HISTORY_REPLAY_LEN: usize = 20;

type History = Arc<Mutex<VecDeque<Value>>>;

/// Binds `addr` and serves `/ws` connections until the process exits. The
/// node's lifecycle is driven elsewhere (the orchestrator / HTTP server);
/// this task only ever reads node state and the broadcast event channel.
pub async fn serve_ws(addr: SocketAddr, node: SharedNode) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let history: History = Arc::new(Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)));

    tokio::spawn(collect_history(node.clone(), history.clone()));

    loop {
        let (stream, peer) = listener.accept().await?;
        tokio::spawn(handle_connection(stream, peer, node.clone(), history.clone()));
    }
}

/// The single writer of `history`: every connection's live event stream
/// independently subscribes to the orchestrator's broadcast channel, but
/// only this task appends to the shared replay buffer.
async fn collect_history(node: SharedNode, history: History) {
    let mut rx = node.lock().await.subscribe();
    loop {
        match rx.recv().await {
            Ok(ev) => {
                for msg in event_messages(&node, &ev).await {
                    let mut h = history.lock().await;
                    if h.len() == HISTORY_CAPACITY {
                        h.pop_front();
                    }
                    h.push_back(msg);
                }
            }
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, node: SharedNode, history: History) {
    let ws = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(error) => {
            tracing::debug!(%peer, %error, "websocket handshake failed");
            return;
        }
    };
    let (mut sink, mut stream) = ws.split();
    let mut rx = node.lock().await.subscribe();

    let welcome = welcome_message(&node).await;
    if sink.send(Message::text(welcome.to_string())).await.is_err() {
        return;
    }
    let history_snapshot: Vec<Value> = {
        let h = history.lock().await;
        h.iter().rev().take(HISTORY_REPLAY_LEN).rev().cloned().collect()
    };
    let history_msg = json!({"type": "history", "data": {"messages": history_snapshot}});
    if sink.send(Message::text(history_msg.to_string())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(ev) => {
                        for msg in event_messages(&node, &ev).await {
                            if sink.send(Message::text(msg.to_string())).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => return,
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = handle_client_message(&node, &text).await {
                            if sink.send(Message::text(reply.to_string())).await.is_err() {
                                return;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Ok(_)) => continue,
                    Some(Err(error)) => {
                        tracing::debug!(%peer, %error, "websocket read error");
                        return;
                    }
                }
            }
        }
    }
}

async fn welcome_message(node: &SharedNode) -> Value {
    let node = node.lock().await;
    let stats = node.get_stats().await;
    let tips = node.get_tips().await;
    json!({
        "type": "welcome",
        "data": {
            "message": "connected to blockdag node",
            "dagStats": stats_json(&stats),
            "tips": tips,
        },
        "timestamp": now_ms(),
    })
}

/// Dispatches one of the client-initiated request types the wire protocol
/// defines. Unknown message types are logged and ignored rather than
/// closing the connection.
async fn handle_client_message(node: &SharedNode, text: &str) -> Option<Value> {
    let parsed: Value = serde_json::from_str(text).ok()?;
    let kind = parsed.get("type").and_then(Value::as_str)?;
    match kind {
        "ping" => Some(json!({"type": "pong", "timestamp": now_ms()})),
        "getStats" => {
            let node = node.lock().await;
            let stats = node.get_stats().await;
            Some(json!({"type": "stats", "data": stats_json(&stats)}))
        }
        "getTips" => {
            let tips = node.lock().await.get_tips().await;
            Some(json!({"type": "tips", "data": {"tips": tips}}))
        }
        "getBlock" => {
            let hash_str = parsed.get("hash").and_then(Value::as_str)?;
            let hash: bdnode_types::Hash = hash_str.parse().ok()?;
            let block = node.lock().await.get_block(&hash).await;
            Some(json!({
                "type": "block",
                "data": block.map(|b| BlockView::from_block(&b, true)),
            }))
        }
        "getAllBlocks" => {
            let node = node.lock().await;
            let stats = node.get_stats().await;
            let tips = node.get_tips().await;
            let mut blocks = Vec::new();
            for tip in &tips {
                if let Some(b) = node.get_block(tip).await {
                    blocks.push(BlockView::from_block(&b, false));
                }
            }
            Some(json!({
                "type": "allBlocks",
                "data": {"blocks": blocks, "totalCount": stats.block_count},
            }))
        }
        "mineBlocks" => {
            let count = parsed
                .get("count")
                .and_then(Value::as_u64)
                .unwrap_or(1) as usize;
            let mut node = node.lock().await;
            match node.mine_blocks(count).await {
                Ok(blocks) => {
                    let views: Vec<_> = blocks.iter().map(|b| BlockView::from_block(b, false)).collect();
                    Some(json!({"type": "minedBlocks", "data": {"blocks": views}}))
                }
                Err(error) => Some(json!({"type": "error", "data": {"message": error.to_string()}})),
            }
        }
        _ => {
            tracing::debug!(kind, "ignoring unknown websocket message type");
            None
        }
    }
}

async fn event_messages(node: &SharedNode, ev: &NodeEvent) -> Vec<Value> {
    match ev {
        NodeEvent::Started => vec![json!({"type": "nodeStarted", "timestamp": now_ms()})],
        NodeEvent::Stopped => vec![json!({"type": "nodeStopped", "timestamp": now_ms()})],
        NodeEvent::MiningStarted => vec![json!({"type": "miningStarted", "timestamp": now_ms()})],
        NodeEvent::MiningStopped => vec![json!({"type": "miningStopped", "timestamp": now_ms()})],
        NodeEvent::TransactionAdded(tx) => vec![json!({
            "type": "transactionAdded",
            "data": {"hash": tx.hash},
            "timestamp": now_ms(),
        })],
        NodeEvent::BlockMined(block) => {
            let view = BlockView::from_block(block, false);
            let node = node.lock().await;
            let stats = node.get_stats().await;
            let tips = node.get_tips().await;
            vec![
                json!({"type": "blockMined", "data": view, "timestamp": now_ms()}),
                json!({"type": "tipsChanged", "data": {"tips": tips}, "timestamp": now_ms()}),
                json!({"type": "dagStatsUpdated", "data": stats_json(&stats), "timestamp": now_ms()}),
            ]
        }
    }
}

fn stats_json(stats: &bdnode_core::DagStats) -> Value {
    json!({
        "blockCount": stats.block_count,
        "tipCount": stats.tip_count,
        "maxDepth": stats.max_depth,
        "blueCount": stats.blue_count,
        "redCount": stats.red_count,
    })
}

fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

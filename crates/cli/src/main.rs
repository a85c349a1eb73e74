use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::Context;
use bdnode_common::shell::{get_shell, OutputMode};
use bdnode_config::{NodeConfigBuilder, DEFAULT_RPC_PORT, DEFAULT_WS_PORT};
use bdnode_core::NodeOrchestrator;
use clap::Parser;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// A local development node for a BlockDAG network.
#[derive(Debug, Parser)]
#[command(name = "bdnode", version, about)]
struct Cli {
    /// Number of blocks the miner produces per round.
    #[arg(long, default_value_t = bdnode_config::DEFAULT_PARALLELISM)]
    parallelism: usize,

    /// Milliseconds between mining rounds.
    #[arg(long, default_value_t = bdnode_config::DEFAULT_BLOCK_TIME_MS)]
    block_time_ms: u64,

    /// Maximum parents a mined block may reference.
    #[arg(long, default_value_t = bdnode_config::DEFAULT_MAX_PARENTS)]
    max_parents: usize,

    /// GHOSTDAG anticone-size bound.
    #[arg(long, default_value_t = bdnode_config::DEFAULT_K)]
    k: u64,

    /// Maximum number of pending transactions the mempool holds.
    #[arg(long, default_value_t = bdnode_config::DEFAULT_MEMPOOL_MAX_SIZE)]
    mempool_max_size: usize,

    /// Port for the HTTP JSON-RPC server.
    #[arg(long, default_value_t = DEFAULT_RPC_PORT)]
    rpc_port: u16,

    /// Port for the `/ws` event stream.
    #[arg(long, default_value_t = DEFAULT_WS_PORT)]
    ws_port: u16,

    /// Address credited as `miner` on every mined block. Defaults to the
    /// first funded genesis account.
    #[arg(long)]
    miner_address: Option<Address>,

    /// Suppress informational output; only warnings and errors are printed.
    #[arg(long)]
    silent: bool,

    /// Start the miner immediately instead of waiting for the first
    /// `dag_mineBlocks` / `eth_sendTransaction` activity.
    #[arg(long)]
    mine_on_start: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.silent {
        get_shell().output_mode = OutputMode::Quiet;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let miner_address = cli
        .miner_address
        .unwrap_or(bdnode_common::genesis_accounts::GENESIS_ACCOUNTS[0]);

    let config = NodeConfigBuilder::new()
        .parallelism(cli.parallelism)
        .block_time_ms(cli.block_time_ms)
        .max_parents(cli.max_parents)
        .k(cli.k)
        .mempool_max_size(cli.mempool_max_size)
        .rpc_port(cli.rpc_port)
        .ws_port(cli.ws_port)
        .miner_address(miner_address)
        .build()
        .context("invalid node configuration")?;

    tracing::info!(
        parallelism = config.parallelism,
        block_time_ms = config.block_time_ms,
        max_parents = config.max_parents,
        k = config.k,
        rpc_port = config.rpc_port,
        ws_port = config.ws_port,
        "starting blockdag node",
    );

    let mut node = NodeOrchestrator::new(config.clone());
    if cli.mine_on_start {
        node.start();
    }
    let node = Arc::new(Mutex::new(node));

    let http_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.rpc_port);
    let ws_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.ws_port);
    let handle = bdnode_api_server::serve(http_addr, ws_addr, node.clone()).await?;

    sh_println_started(http_addr, ws_addr);

    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    tracing::info!("shutting down");
    node.lock().await.stop();
    let _ = handle.stop();
    handle.stopped().await;
    Ok(())
}

fn sh_println_started(http_addr: SocketAddr, ws_addr: SocketAddr) {
    bdnode_common::sh_println!("BlockDAG node listening: http://{http_addr} ws://{ws_addr}/ws");
}

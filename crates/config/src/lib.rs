//! Node configuration: defaults, validation, and the error kinds that are
//! fatal at startup.

use alloy_primitives::{Address, U256};
use bdnode_common::genesis_accounts::{self, GENESIS_ACCOUNTS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chain id reported by `eth_chainId` / `net_version`; fixed for this node.
pub const CHAIN_ID: u64 = 1337;

pub const DEFAULT_PARALLELISM: usize = 3;
pub const DEFAULT_BLOCK_TIME_MS: u64 = 2000;
pub const DEFAULT_MAX_PARENTS: usize = 3;
pub const DEFAULT_K: u64 = 18;
pub const DEFAULT_MEMPOOL_MAX_SIZE: usize = 1000;
pub const DEFAULT_RPC_PORT: u16 = 8545;
pub const DEFAULT_WS_PORT: u16 = 8546;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("parallelism must be >= 1, got {0}")]
    ParallelismTooLow(usize),
    #[error("maxParents must be >= 1, got {0}")]
    MaxParentsTooLow(usize),
    #[error("k (GHOSTDAG anticone bound) must be >= 1, got {0}")]
    KTooLow(u64),
}

/// Full node configuration. Construct through [`NodeConfigBuilder`] or
/// [`NodeConfig::try_new`] — both validate before returning a usable value,
/// since a misconfigured node must fail at startup, not at first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub parallelism: usize,
    pub block_time_ms: u64,
    pub max_parents: usize,
    pub miner_address: Address,
    pub k: u64,
    pub mempool_max_size: usize,
    pub rpc_port: u16,
    pub ws_port: u16,
    pub chain_id: u64,
    /// Accounts pre-funded with [`bdnode_common::genesis_accounts::default_genesis_balance`]
    /// when the executor's genesis state is built.
    pub genesis_accounts: Vec<(Address, U256)>,
}

impl NodeConfig {
    pub fn try_new(
        parallelism: usize,
        block_time_ms: u64,
        max_parents: usize,
        miner_address: Address,
        k: u64,
        mempool_max_size: usize,
        rpc_port: u16,
        ws_port: u16,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            parallelism,
            block_time_ms,
            max_parents,
            miner_address,
            k,
            mempool_max_size,
            rpc_port,
            ws_port,
            chain_id: CHAIN_ID,
            genesis_accounts: default_genesis_accounts(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let err = if self.parallelism < 1 {
            Some(ConfigError::ParallelismTooLow(self.parallelism))
        } else if self.max_parents < 1 {
            Some(ConfigError::MaxParentsTooLow(self.max_parents))
        } else if self.k < 1 {
            Some(ConfigError::KTooLow(self.k))
        } else {
            None
        };
        if let Some(e) = err {
            tracing::error!(error = %e, "invalid node configuration, refusing to start");
            return Err(e);
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            block_time_ms: DEFAULT_BLOCK_TIME_MS,
            max_parents: DEFAULT_MAX_PARENTS,
            miner_address: Address::ZERO,
            k: DEFAULT_K,
            mempool_max_size: DEFAULT_MEMPOOL_MAX_SIZE,
            rpc_port: DEFAULT_RPC_PORT,
            ws_port: DEFAULT_WS_PORT,
            chain_id: CHAIN_ID,
            genesis_accounts: default_genesis_accounts(),
        }
    }
}

fn default_genesis_accounts() -> Vec<(Address, U256)> {
    let balance = genesis_accounts::default_genesis_balance();
    GENESIS_ACCOUNTS.iter().map(|&addr| (addr, balance)).collect()
}

/// Builder mirroring [`NodeConfig`]'s fields with the same defaults,
/// validated on [`build`](NodeConfigBuilder::build).
#[derive(Debug, Clone)]
pub struct NodeConfigBuilder {
    inner: NodeConfig,
}

impl NodeConfigBuilder {
    pub fn new() -> Self {
        Self {
            inner: NodeConfig::default(),
        }
    }

    pub fn parallelism(mut self, v: usize) -> Self {
        self.inner.parallelism = v;
        self
    }

    pub fn block_time_ms(mut self, v: u64) -> Self {
        self.inner.block_time_ms = v;
        self
    }

    pub fn max_parents(mut self, v: usize) -> Self {
        self.inner.max_parents = v;
        self
    }

    pub fn miner_address(mut self, v: Address) -> Self {
        self.inner.miner_address = v;
        self
    }

    pub fn k(mut self, v: u64) -> Self {
        self.inner.k = v;
        self
    }

    pub fn mempool_max_size(mut self, v: usize) -> Self {
        self.inner.mempool_max_size = v;
        self
    }

    pub fn rpc_port(mut self, v: u16) -> Self {
        self.inner.rpc_port = v;
        self
    }

    pub fn ws_port(mut self, v: u16) -> Self {
        self.inner.ws_port = v;
        self
    }

    pub fn genesis_accounts(mut self, accounts: Vec<(Address, U256)>) -> Self {
        self.inner.genesis_accounts = accounts;
        self
    }

    pub fn build(self) -> Result<NodeConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

impl Default for NodeConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

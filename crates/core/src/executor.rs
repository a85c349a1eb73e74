//! The EVM executor: applies transactions to world state, tracks
//! per-block cumulative gas, and issues receipts.
//!
//! Wraps `revm`'s in-memory `CacheDB` rather than a from-scratch
//! interpreter, the same open-source EVM crate the rest of the Rust
//! execution-client ecosystem (reth and friends) uses.

use std::collections::BTreeMap;

use alloy_primitives::{keccak256, Address, Bytes, U256};
use bdnode_types::{Hash, Receipt, ReceiptStatus, Transaction};
use revm::db::{CacheDB, EmptyDB};
use revm::primitives::{AccountInfo, ExecutionResult, Output, TransactTo, TxEnv};
use revm::{Database, Evm};
use serde_json::json;

use crate::error::ExecutorError;

/// Gas price reported by `eth_gasPrice`: fixed, since this node has no fee
/// market.
pub const FIXED_GAS_PRICE: u64 = 1_000_000_000;

pub struct Executor {
    db: CacheDB<EmptyDB>,
    checkpoints: Vec<CacheDB<EmptyDB>>,
    cumulative_gas_used: u64,
}

/// Outcome of [`Executor::execute`].
pub struct ExecuteOutcome {
    pub receipt: Receipt,
    pub return_value: Vec<u8>,
    pub created_address: Option<Address>,
}

impl Executor {
    pub fn new() -> Self {
        Self {
            db: CacheDB::new(EmptyDB::default()),
            checkpoints: Vec::new(),
            cumulative_gas_used: 0,
        }
    }

    /// Seeds `addr` with `balance` wei and a zero nonce, for genesis funding.
    pub fn fund_account(&mut self, addr: Address, balance: U256) {
        let info = AccountInfo {
            balance,
            nonce: 0,
            code_hash: revm::primitives::KECCAK_EMPTY,
            code: None,
        };
        self.db.insert_account_info(addr, info);
    }

    pub fn reset_cumulative_gas(&mut self) {
        self.cumulative_gas_used = 0;
    }

    pub fn cumulative_gas_used(&self) -> u64 {
        self.cumulative_gas_used
    }

    /// Applies `tx` to the live world state, producing a [`Receipt`] keyed
    /// on `block_hash`. Never returns `Err` for an execution trap — a trap
    /// produces a `status = failed` receipt; `Err` is reserved for
    /// conditions the executor itself cannot recover from.
    pub fn execute(&mut self, tx: &Transaction, block_hash: Hash) -> Result<ExecuteOutcome, ExecutorError> {
        let is_deployment = tx.is_deployment();
        let tx_env = build_tx_env(tx);
        let result = run(&mut self.db, tx_env)
            .map_err(|e| ExecutorError::Trap(e.to_string()))?;

        let (status, gas_used, return_value, created_address, logs) = match result {
            ExecutionResult::Success {
                gas_used,
                output,
                logs,
                ..
            } => {
                let (return_value, created) = match output {
                    Output::Call(bytes) => (bytes.to_vec(), None),
                    Output::Create(bytes, addr) => (bytes.to_vec(), addr),
                };
                let logs_json = logs
                    .iter()
                    .map(|log| {
                        json!({
                            "address": format!("{:#x}", log.address),
                            "topics": log.data.topics().iter().map(|t| format!("{t:#x}")).collect::<Vec<_>>(),
                            "data": format!("0x{}", hex::encode(log.data.data.as_ref())),
                        })
                    })
                    .collect();
                (ReceiptStatus::Success, gas_used, return_value, created, logs_json)
            }
            ExecutionResult::Revert { gas_used, .. } => {
                (ReceiptStatus::Failed, gas_used, Vec::new(), None, Vec::new())
            }
            ExecutionResult::Halt { gas_used, .. } => {
                (ReceiptStatus::Failed, gas_used, Vec::new(), None, Vec::new())
            }
        };

        let gas_used = if status == ReceiptStatus::Failed {
            tx.gas_limit
        } else {
            gas_used
        };
        self.cumulative_gas_used += gas_used;

        let receipt = Receipt {
            transaction_hash: tx.hash,
            block_hash,
            from: tx.from,
            to: if is_deployment { None } else { tx.to },
            gas_used,
            cumulative_gas_used: self.cumulative_gas_used,
            status,
            logs,
            contract_address: created_address,
        };

        Ok(ExecuteOutcome {
            receipt,
            return_value,
            created_address,
        })
    }

    /// Read-only call: executes against a checkpointed view of current
    /// state and always reverts afterward, so it can never leak a mutation.
    pub fn call(
        &mut self,
        to: Address,
        data: Vec<u8>,
        from: Option<Address>,
        value: Option<U256>,
    ) -> Result<Vec<u8>, ExecutorError> {
        self.checkpoint();
        let mut tx_env = TxEnv::default();
        tx_env.caller = from.unwrap_or(Address::ZERO);
        tx_env.transact_to = TransactTo::Call(to);
        tx_env.data = Bytes::from(data);
        tx_env.value = value.unwrap_or(U256::ZERO);
        tx_env.gas_limit = 50_000_000;
        tx_env.gas_price = U256::from(FIXED_GAS_PRICE);

        let result = run(&mut self.db, tx_env);
        self.revert();

        match result.map_err(|e| ExecutorError::Trap(e.to_string()))? {
            ExecutionResult::Success { output, .. } => Ok(match output {
                Output::Call(bytes) => bytes.to_vec(),
                Output::Create(bytes, _) => bytes.to_vec(),
            }),
            ExecutionResult::Revert { output, .. } => {
                Err(ExecutorError::Trap(format!("reverted: 0x{}", hex::encode(output))))
            }
            ExecutionResult::Halt { reason, .. } => {
                Err(ExecutorError::Trap(format!("halted: {reason:?}")))
            }
        }
    }

    /// `used + 21000` as a conservative gas estimate. Runs and reverts
    /// exactly like [`Executor::call`] so no state leaks.
    pub fn estimate_gas(&mut self, tx: &Transaction) -> Result<u64, ExecutorError> {
        self.checkpoint();
        let tx_env = build_tx_env(tx);
        let result = run(&mut self.db, tx_env);
        self.revert();

        let result = result.map_err(|e| ExecutorError::Trap(e.to_string()))?;
        let used = match result {
            ExecutionResult::Success { gas_used, .. } => gas_used,
            ExecutionResult::Revert { gas_used, .. } => gas_used,
            ExecutionResult::Halt { gas_used, .. } => gas_used,
        };
        Ok(used + 21_000)
    }

    pub fn get_balance(&mut self, addr: Address) -> U256 {
        self.db
            .basic(addr)
            .ok()
            .flatten()
            .map(|i| i.balance)
            .unwrap_or_default()
    }

    pub fn set_balance(&mut self, addr: Address, balance: U256) {
        let mut info = self.db.basic(addr).ok().flatten().unwrap_or_default();
        info.balance = balance;
        self.db.insert_account_info(addr, info);
    }

    pub fn get_nonce(&mut self, addr: Address) -> u64 {
        self.db
            .basic(addr)
            .ok()
            .flatten()
            .map(|i| i.nonce)
            .unwrap_or(0)
    }

    pub fn get_code(&mut self, addr: Address) -> Vec<u8> {
        self.db
            .basic(addr)
            .ok()
            .flatten()
            .and_then(|i| i.code)
            .map(|c| c.bytes().to_vec())
            .unwrap_or_default()
    }

    pub fn get_storage_at(&mut self, addr: Address, key: U256) -> U256 {
        self.db.storage(addr, key).unwrap_or_default()
    }

    /// A deterministic 32-byte digest of the account set, standing in for
    /// a full Merkle-Patricia state root: no trie-construction crate is in
    /// scope for this node, so the root is defined as `keccak256` over
    /// every `(address, balance, nonce, code_hash, storage)` tuple in
    /// address order, with each account's storage sorted by key, so two
    /// states that differ only in a contract's storage still commit to
    /// different roots.
    pub fn get_state_root(&self) -> Hash {
        let mut sorted: BTreeMap<Address, &revm::db::DbAccount> = BTreeMap::new();
        for (addr, account) in self.db.accounts.iter() {
            sorted.insert(*addr, account);
        }
        let mut preimage = Vec::new();
        for (addr, account) in sorted {
            preimage.extend_from_slice(addr.as_slice());
            preimage.extend_from_slice(&account.info.balance.to_be_bytes::<32>());
            preimage.extend_from_slice(&account.info.nonce.to_be_bytes());
            preimage.extend_from_slice(account.info.code_hash.as_slice());

            let mut storage: BTreeMap<U256, U256> = BTreeMap::new();
            for (key, value) in account.storage.iter() {
                storage.insert(*key, *value);
            }
            for (key, value) in storage {
                preimage.extend_from_slice(&key.to_be_bytes::<32>());
                preimage.extend_from_slice(&value.to_be_bytes::<32>());
            }
        }
        keccak256(preimage)
    }

    pub fn checkpoint(&mut self) {
        self.checkpoints.push(self.db.clone());
    }

    pub fn commit(&mut self) -> Result<(), ExecutorError> {
        self.checkpoints.pop().map(|_| ()).ok_or(ExecutorError::NoCheckpoint)
    }

    pub fn revert(&mut self) {
        if let Some(snapshot) = self.checkpoints.pop() {
            self.db = snapshot;
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

fn build_tx_env(tx: &Transaction) -> TxEnv {
    let mut env = TxEnv::default();
    env.caller = tx.from;
    env.transact_to = match tx.to {
        Some(to) => TransactTo::Call(to),
        None => TransactTo::Create,
    };
    env.value = tx.value;
    env.data = Bytes::from(tx.data.clone());
    env.nonce = Some(tx.nonce);
    env.gas_limit = tx.gas_limit;
    env.gas_price = tx.gas_price;
    env
}

fn run(
    db: &mut CacheDB<EmptyDB>,
    tx_env: TxEnv,
) -> anyhow::Result<ExecutionResult> {
    let mut evm = Evm::builder()
        .with_db(db)
        .with_tx_env(tx_env)
        .build();
    let result = evm
        .transact_commit()
        .map_err(|e| anyhow::anyhow!("evm execution error: {e:?}"))?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdnode_types::TransactionRequest;

    fn deploy_tx(data: Vec<u8>, gas_limit: u64) -> Transaction {
        TransactionRequest {
            from: Address::repeat_byte(1),
            to: None,
            value: U256::ZERO,
            data,
            nonce: 0,
            gas_limit,
            gas_price: U256::from(1u64),
        }
        .into_transaction()
    }

    #[test]
    fn checkpoint_revert_restores_balance() {
        let mut ex = Executor::new();
        let addr = Address::repeat_byte(0xaa);
        ex.set_balance(addr, U256::from(1000u64));
        ex.checkpoint();
        ex.set_balance(addr, U256::from(999u64));
        assert_eq!(ex.get_balance(addr), U256::from(999u64));
        ex.revert();
        assert_eq!(ex.get_balance(addr), U256::from(1000u64));
    }

    #[test]
    fn deployment_of_answer_contract_succeeds() {
        let mut ex = Executor::new();
        let funded = Address::repeat_byte(1);
        ex.fund_account(funded, U256::from(10u64).pow(U256::from(21u64)));

        let tx = deploy_tx(hex::decode("604260005260206000f3").unwrap(), 100_000);
        let outcome = ex.execute(&tx, Hash::ZERO).unwrap();
        assert!(outcome.receipt.is_success());
        assert!(outcome.created_address.is_some());
    }

    #[test]
    fn estimate_gas_does_not_leak_state() {
        let mut ex = Executor::new();
        let funded = Address::repeat_byte(1);
        ex.fund_account(funded, U256::from(10u64).pow(U256::from(21u64)));
        let root_before = ex.get_state_root();

        let tx = deploy_tx(hex::decode("604260005260206000f3").unwrap(), 100_000);
        let _ = ex.estimate_gas(&tx);

        assert_eq!(ex.get_state_root(), root_before);
    }

    #[test]
    fn state_root_differs_when_only_storage_differs() {
        let addr = Address::repeat_byte(0xbb);

        let mut plain = Executor::new();
        plain.fund_account(addr, U256::from(1u64));
        let plain_root = plain.get_state_root();

        let mut with_storage = Executor::new();
        with_storage.fund_account(addr, U256::from(1u64));
        with_storage
            .db
            .insert_account_storage(addr, U256::from(7u64), U256::from(42u64))
            .unwrap();
        let storage_root = with_storage.get_state_root();

        assert_ne!(plain_root, storage_root);
    }

    #[test]
    fn cumulative_gas_is_monotonic_within_a_block() {
        let mut ex = Executor::new();
        let funded = Address::repeat_byte(1);
        ex.fund_account(funded, U256::from(10u64).pow(U256::from(21u64)));
        ex.reset_cumulative_gas();

        let mut last = 0u64;
        for nonce in 0..3u64 {
            let tx = TransactionRequest {
                from: Address::repeat_byte(1),
                to: None,
                value: U256::ZERO,
                data: hex::decode("604260005260206000f3").unwrap(),
                nonce,
                gas_limit: 100_000,
                gas_price: U256::from(1u64),
            }
            .into_transaction();
            let outcome = ex.execute(&tx, Hash::ZERO).unwrap();
            assert!(ex.cumulative_gas_used() >= last);
            last = ex.cumulative_gas_used();
            let _ = outcome;
        }
    }
}

//! Wire and domain types shared by the DAG core and the RPC boundary.

mod block;
mod receipt;
pub mod serde_helpers;
mod transaction;

pub use alloy_primitives::{Address, Bytes, B256 as Hash, U256};

pub use block::{empty_transactions_root, transactions_root, u256_to_hex, Block, BlockColor};
pub use receipt::{Receipt, ReceiptStatus};
pub use transaction::{Transaction, TransactionRequest};

//! Pre-funded development accounts seeded into the EVM state at genesis.
//!
//! Unlike the mnemonic-derived rich wallets of a testnet-facing fork, these
//! are plain fixed addresses: this node has no signing story of its own, so
//! there is nothing to derive a private key for.

use alloy_primitives::{address, Address};

/// Ten accounts, each funded with [`DEFAULT_GENESIS_BALANCE_ETHER`] ether at
/// genesis, addressed `0x1000...0001` through `0x1000...000a`.
pub const GENESIS_ACCOUNTS: [Address; 10] = [
    address!("1000000000000000000000000000000000000001"),
    address!("1000000000000000000000000000000000000002"),
    address!("1000000000000000000000000000000000000003"),
    address!("1000000000000000000000000000000000000004"),
    address!("1000000000000000000000000000000000000005"),
    address!("1000000000000000000000000000000000000006"),
    address!("1000000000000000000000000000000000000007"),
    address!("1000000000000000000000000000000000000008"),
    address!("1000000000000000000000000000000000000009"),
    address!("100000000000000000000000000000000000000a"),
];

/// Default per-account genesis balance: 1000 ether, in wei.
pub fn default_genesis_balance() -> alloy_primitives::U256 {
    crate::units::parse_ether("1000").expect("1000 is a valid ether amount")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for addr in GENESIS_ACCOUNTS {
            assert!(seen.insert(addr), "duplicate genesis account {addr}");
        }
    }

    #[test]
    fn default_balance_is_1000_ether() {
        let balance = default_genesis_balance();
        assert_eq!(balance, crate::units::parse_ether("1000").unwrap());
    }
}

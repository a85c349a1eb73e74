//! End-to-end scenarios driven entirely through `NodeOrchestrator`: parallel
//! mining rounds, contract deployment and calls, and lifecycle idempotence.

use alloy_primitives::{Address, U256};
use bdnode_config::NodeConfigBuilder;
use bdnode_core::NodeOrchestrator;
use bdnode_types::{ReceiptStatus, TransactionRequest};

fn config(parallelism: usize, max_parents: usize) -> bdnode_config::NodeConfig {
    NodeConfigBuilder::new()
        .parallelism(parallelism)
        .max_parents(max_parents)
        .block_time_ms(20)
        .build()
        .unwrap()
}

#[tokio::test]
async fn second_mining_round_references_prior_tips() {
    let mut node = NodeOrchestrator::new(config(3, 3));

    let first_round = node.mine_blocks(3).await.unwrap();
    assert_eq!(first_round.len(), 3);
    assert_eq!(node.get_max_depth().await, 1);
    assert_eq!(node.get_tips().await.len(), 3);

    let second_round = node.mine_blocks(3).await.unwrap();
    assert_eq!(second_round.len(), 3);
    assert_eq!(node.get_max_depth().await, 2);

    for block in &second_round {
        assert_eq!(block.parent_hashes.len(), 3);
    }

    let stats = node.get_stats().await;
    assert_eq!(stats.block_count, 7);
}

#[tokio::test]
async fn deployment_transaction_produces_runtime_bytecode_and_callable_contract() {
    let funded = Address::repeat_byte(1);
    let mut cfg = config(1, 1);
    cfg.genesis_accounts = vec![(funded, U256::from(10u64).pow(U256::from(21u64)))];
    let mut node = NodeOrchestrator::new(cfg);

    let deploy = TransactionRequest {
        from: funded,
        to: None,
        value: U256::ZERO,
        data: hex::decode("604260005260206000f3").unwrap(),
        nonce: 0,
        gas_limit: 100_000,
        gas_price: U256::from(1u64),
    };
    let hash = node.add_transaction(deploy).await.unwrap();

    let mined = node.mine_blocks(1).await.unwrap();
    assert_eq!(mined.len(), 1);

    let receipt = node.get_receipt(&hash).await.expect("receipt must exist");
    assert_eq!(receipt.status, ReceiptStatus::Success);
    let contract = receipt.contract_address.expect("deployment must yield a contract address");

    let code = node.get_code(contract).await;
    assert!(!code.is_empty());

    let result = node.call(contract, vec![], None, None).await.unwrap();
    assert_eq!(result.len(), 32);
    assert_eq!(*result.last().unwrap(), 0x42);
}

#[tokio::test]
async fn stop_then_start_is_idempotent_and_resumes_mining() {
    let mut node = NodeOrchestrator::new(config(1, 1));
    node.start();
    node.start(); // no-op, already running
    node.stop();
    node.stop(); // no-op, already stopped

    let mined = node.mine_blocks(1).await.unwrap();
    assert_eq!(mined.len(), 1);
}

use scrooge_ledger::{
    settle, tx_fee, Secp256k1Verifier, SettlementPolicy, Transaction, TxHandler, TxOutput,
    UTXOPool, Wallet, UTXO,
};
use std::collections::HashSet;

// 辅助函数：构造一个种子集合，每个值对应一个由 owner 持有的UTXO
fn seed(owner: &Wallet, values: &[i64]) -> (UTXOPool, Vec<UTXO>) {
    let mut issuance = Transaction::new();
    for value in values {
        issuance.add_output(*value, owner.public_key);
    }
    let mut pool = UTXOPool::new();
    let mut utxos = Vec::new();
    for (utxo, output) in issuance.produced_utxos() {
        pool.add_utxo(utxo, output.clone());
        utxos.push(utxo);
    }
    (pool, utxos)
}

fn spend(from: &Wallet, to: &Wallet, utxo: UTXO, values: &[i64]) -> Transaction {
    let mut tx = Transaction::new();
    tx.add_input(utxo.tx_hash, utxo.index);
    for value in values {
        tx.add_output(*value, to.public_key);
    }
    from.sign_input(&mut tx, 0).unwrap();
    tx
}

#[test]
fn test_split_payment_settles() {
    let scrooge = Wallet::new();
    let bob = Wallet::new();
    let (pool, utxos) = seed(&scrooge, &[10]);
    let tx = spend(&scrooge, &bob, utxos[0], &[5, 3, 2]);

    for policy in [SettlementPolicy::FirstValid, SettlementPolicy::MaxFee] {
        let settlement = settle(&[tx.clone()], &pool, policy, &Secp256k1Verifier::new());

        assert_eq!(settlement.accepted, vec![tx.clone()]);
        assert_eq!(settlement.total_fees, 0);
        assert!(!settlement.pool.contains(&utxos[0]));
        assert_eq!(settlement.pool.len(), 3);

        let mut values: Vec<i64> = settlement
            .pool
            .iter()
            .map(|(utxo, out)| {
                assert_eq!(utxo.tx_hash, tx.hash());
                assert_eq!(out.owner, bob.public_key);
                out.value
            })
            .collect();
        values.sort();
        assert_eq!(values, vec![2, 3, 5]);
    }
}

#[test]
fn test_overspend_leaves_ledger_unchanged() {
    let scrooge = Wallet::new();
    let bob = Wallet::new();
    let (pool, utxos) = seed(&scrooge, &[10]);
    let tx = spend(&scrooge, &bob, utxos[0], &[5, 3, 3]);

    let settlement = settle(&[tx], &pool, SettlementPolicy::FirstValid, &Secp256k1Verifier::new());
    assert!(settlement.accepted.is_empty());
    assert_eq!(settlement.pool, pool);
}

#[test]
fn test_max_fee_picks_higher_fee_conflict() {
    let scrooge = Wallet::new();
    let bob = Wallet::new();
    let (pool, utxos) = seed(&scrooge, &[10]);

    let fee_two = spend(&scrooge, &bob, utxos[0], &[8]);
    let fee_five = spend(&scrooge, &bob, utxos[0], &[5]);
    assert_eq!(tx_fee(&fee_two, &pool), 2);
    assert_eq!(tx_fee(&fee_five, &pool), 5);

    let candidates = vec![fee_two.clone(), fee_five.clone()];
    let verifier = Secp256k1Verifier::new();

    let max_fee = settle(&candidates, &pool, SettlementPolicy::MaxFee, &verifier);
    assert_eq!(max_fee.accepted, vec![fee_five]);
    assert_eq!(max_fee.total_fees, 5);

    // 先到先得按调用方顺序接受第一笔
    let first_valid = settle(&candidates, &pool, SettlementPolicy::FirstValid, &verifier);
    assert_eq!(first_valid.accepted, vec![fee_two]);
    assert_eq!(first_valid.total_fees, 2);
}

#[test]
fn test_non_conflicting_both_accepted_in_any_order() {
    let scrooge = Wallet::new();
    let bob = Wallet::new();
    let (pool, utxos) = seed(&scrooge, &[10, 20]);
    let a = spend(&scrooge, &bob, utxos[0], &[9]);
    let b = spend(&scrooge, &bob, utxos[1], &[15]);
    let verifier = Secp256k1Verifier::new();

    for candidates in [vec![a.clone(), b.clone()], vec![b.clone(), a.clone()]] {
        for policy in [SettlementPolicy::FirstValid, SettlementPolicy::MaxFee] {
            let settlement = settle(&candidates, &pool, policy, &verifier);
            assert_eq!(settlement.accepted.len(), 2);
            assert_eq!(settlement.total_fees, 6);
        }
    }

    // 手续费优先时，手续费 5 的交易先处理
    let settlement = settle(&[a.clone(), b.clone()], &pool, SettlementPolicy::MaxFee, &verifier);
    assert_eq!(settlement.accepted, vec![b, a]);
}

#[test]
fn test_no_double_spend_after_settle() {
    let scrooge = Wallet::new();
    let alice = Wallet::new();
    let bob = Wallet::new();
    let (pool, utxos) = seed(&scrooge, &[10, 10, 10]);

    let candidates = vec![
        spend(&scrooge, &alice, utxos[0], &[10]),
        spend(&scrooge, &bob, utxos[0], &[9]),
        spend(&scrooge, &alice, utxos[1], &[1]),
        spend(&scrooge, &bob, utxos[1], &[2]),
        spend(&scrooge, &bob, utxos[2], &[11]),
    ];

    for policy in [SettlementPolicy::FirstValid, SettlementPolicy::MaxFee] {
        let settlement = settle(&candidates, &pool, policy, &Secp256k1Verifier::new());
        assert_eq!(settlement.accepted.len(), 2);

        let mut claimed = HashSet::new();
        for tx in &settlement.accepted {
            assert!(tx_fee(tx, &pool) >= 0);
            for input in tx.inputs() {
                assert!(claimed.insert(input.utxo()));
                assert!(!settlement.pool.contains(&input.utxo()));
            }
        }
        // 未被花费的第三个UTXO仍然存在
        assert!(settlement.pool.contains(&utxos[2]));
    }
}

#[test]
fn test_chained_spend_within_one_round() {
    let scrooge = Wallet::new();
    let alice = Wallet::new();
    let bob = Wallet::new();
    let (pool, utxos) = seed(&scrooge, &[10]);

    let first = spend(&scrooge, &alice, utxos[0], &[10]);
    let second = spend(&alice, &bob, UTXO::new(first.hash(), 0), &[10]);
    let verifier = Secp256k1Verifier::new();

    let settlement = settle(
        &[first.clone(), second.clone()],
        &pool,
        SettlementPolicy::FirstValid,
        &verifier,
    );
    assert_eq!(settlement.accepted.len(), 2);
    assert_eq!(settlement.pool.len(), 1);
    assert!(settlement.pool.contains(&UTXO::new(second.hash(), 0)));

    // 子交易排在父交易之前时，本轮只能接受父交易
    let settlement = settle(&[second, first], &pool, SettlementPolicy::FirstValid, &verifier);
    assert_eq!(settlement.accepted.len(), 1);
}

#[test]
fn test_snapshot_isolation() {
    let scrooge = Wallet::new();
    let bob = Wallet::new();
    let (pool, utxos) = seed(&scrooge, &[10]);
    let before = pool.clone();
    let tx = spend(&scrooge, &bob, utxos[0], &[10]);

    let mut settlement = settle(&[tx], &pool, SettlementPolicy::MaxFee, &Secp256k1Verifier::new());
    assert_eq!(pool, before);

    for utxo in settlement.pool.all_utxo() {
        settlement.pool.remove_utxo(&utxo);
    }
    settlement
        .pool
        .add_utxo(UTXO::new(utxos[0].tx_hash, 9), TxOutput::new(1, bob.public_key));
    assert_eq!(pool, before);
}

#[test]
fn test_tx_handler_keeps_state_across_rounds() {
    let scrooge = Wallet::new();
    let alice = Wallet::new();
    let (pool, utxos) = seed(&scrooge, &[10]);
    let mut handler = TxHandler::new(&pool).with_policy(SettlementPolicy::MaxFee);
    assert_eq!(handler.policy(), SettlementPolicy::MaxFee);

    let first = spend(&scrooge, &alice, utxos[0], &[6, 4]);
    assert!(handler.is_valid_tx(&first));
    assert_eq!(handler.handle_txs(&[first.clone()]).len(), 1);

    // 同一笔交易在下一轮已经无效
    assert!(!handler.is_valid_tx(&first));
    assert!(handler.handle_txs(&[first.clone()]).is_empty());

    let second = spend(&alice, &scrooge, UTXO::new(first.hash(), 1), &[4]);
    assert_eq!(handler.handle_txs(&[second]).len(), 1);
    assert_eq!(handler.utxo_pool().len(), 2);
    assert_eq!(handler.utxo_pool().total_value(), 10);

    // 构造时复制了集合
    assert_eq!(pool.len(), 1);
    assert!(pool.contains(&utxos[0]));
}

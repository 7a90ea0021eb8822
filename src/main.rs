//! # Scrooge 账本演示程序
//!
//! Scrooge 发行一枚面值 10 的币并转给 Alice，随后演示一次双花冲突在所选策略下的结算结果。
//!
//! 用法：`scrooge-demo [first-valid|max-fee]`，也可以通过环境变量 `SCROOGE_POLICY` 指定。

use std::env;

use anyhow::{Context, Result};
use serde::Serialize;

use scrooge_ledger::{
    settle, Secp256k1Verifier, SettlementPolicy, Transaction, TxHandler, TxHash, UTXOPool, Wallet,
    UTXO,
};

#[derive(Serialize)]
struct RoundReport {
    policy: SettlementPolicy,
    candidates: usize,
    accepted: Vec<TxHash>,
    total_fees: String,
    utxos: usize,
    ledger_value: String,
}

/// 读取结算策略：命令行参数优先，其次环境变量，最后使用默认值
fn read_policy() -> Result<SettlementPolicy> {
    let raw = env::args().nth(1).or_else(|| env::var("SCROOGE_POLICY").ok());
    match raw {
        Some(name) => name
            .parse()
            .with_context(|| format!("invalid policy argument `{}`", name)),
        None => Ok(SettlementPolicy::default()),
    }
}

fn main() -> Result<()> {
    // 初始化日志
    env_logger::init();

    let policy = read_policy()?;
    let scrooge = Wallet::new();
    let alice = Wallet::new();
    let bob = Wallet::new();
    println!("Scrooge 地址: {}", scrooge.address);
    println!("Alice 地址: {}", alice.address);

    // 发行交易：Scrooge 拥有一枚面值 10 的币
    let mut issuance = Transaction::new();
    issuance.add_output(10, scrooge.public_key);
    let mut pool = UTXOPool::new();
    for (utxo, output) in issuance.produced_utxos() {
        pool.add_utxo(utxo, output.clone());
    }

    // 10 拆分为 5 + 3 + 2 转给 Alice
    let mut payment = Transaction::new();
    payment.add_input(issuance.hash(), 0);
    payment.add_output(5, alice.public_key);
    payment.add_output(3, alice.public_key);
    payment.add_output(2, alice.public_key);
    scrooge.sign_input(&mut payment, 0)?;

    let mut handler = TxHandler::new(&pool).with_policy(policy);
    println!("is_valid_tx(payment) 返回: {}", handler.is_valid_tx(&payment));
    let accepted = handler.handle_txs(std::slice::from_ref(&payment));
    println!("handle_txs([payment]) 返回 {} 笔交易", accepted.len());

    // Alice 用同一个输出签出两笔交易，手续费分别为 2 和 5
    let spent = UTXO::new(payment.hash(), 0);
    let mut low_fee = Transaction::new();
    low_fee.add_input(spent.tx_hash, spent.index);
    low_fee.add_output(3, bob.public_key);
    alice.sign_input(&mut low_fee, 0)?;

    let mut high_fee = Transaction::new();
    high_fee.add_input(spent.tx_hash, spent.index);
    high_fee.add_output(0, bob.public_key);
    alice.sign_input(&mut high_fee, 0)?;

    let candidates = vec![low_fee, high_fee];
    let settlement = settle(&candidates, handler.utxo_pool(), policy, &Secp256k1Verifier::new());

    let report = RoundReport {
        policy,
        candidates: candidates.len(),
        accepted: settlement.accepted.iter().map(Transaction::hash).collect(),
        total_fees: settlement.total_fees.to_string(),
        utxos: settlement.pool.len(),
        ledger_value: settlement.pool.total_value().to_string(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

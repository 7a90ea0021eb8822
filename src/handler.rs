//! # 批量结算模块
//!
//! 接收一批无序的候选交易，选出互不冲突的有效子集，并据此更新UTXO集合。
//!
//! 支持两种策略：
//!
//! * [`SettlementPolicy::FirstValid`] - 按调用方给出的顺序，先到先得；
//! * [`SettlementPolicy::MaxFee`] - 按手续费从高到低贪心接受。
//!
//! 贪心按手续费排序只是启发式方法，并不保证选出手续费总和最大的子集
//! （一般情况下那是最大权独立集问题）。

use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::crypto::{Secp256k1Verifier, SignatureVerifier};
use crate::error::UnknownPolicy;
use crate::transaction::{Transaction, TxHash};
use crate::utxo_pool::UTXOPool;
use crate::validator::{is_valid_tx, tx_fee};

/// 结算策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettlementPolicy {
    /// 按调用方顺序处理，第一个有效的交易胜出
    #[default]
    FirstValid,
    /// 按结算前快照计算的手续费从高到低处理，手续费相同时按交易哈希升序
    MaxFee,
}

impl fmt::Display for SettlementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementPolicy::FirstValid => f.write_str("first-valid"),
            SettlementPolicy::MaxFee => f.write_str("max-fee"),
        }
    }
}

impl FromStr for SettlementPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-valid" | "first_valid" | "firstvalid" => Ok(SettlementPolicy::FirstValid),
            "max-fee" | "max_fee" | "maxfee" => Ok(SettlementPolicy::MaxFee),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// 一轮结算的结果
#[derive(Debug, Clone)]
pub struct Settlement {
    /// 被接受的交易，按接受顺序排列，不含重复
    pub accepted: Vec<Transaction>,
    /// 应用全部被接受交易之后的UTXO集合
    pub pool: UTXOPool,
    /// 被接受交易的手续费总和
    pub total_fees: i128,
}

/// 把一笔交易的效果应用到UTXO集合：移除它花费的输出，加入它产生的输出
///
/// 调用前应先用 [`is_valid_tx`] 验证交易。
pub fn apply_tx(pool: &mut UTXOPool, tx: &Transaction) {
    for input in tx.inputs() {
        pool.remove_utxo(&input.utxo());
    }
    for (utxo, output) in tx.produced_utxos() {
        pool.add_utxo(utxo, output.clone());
    }
}

/// 结算一批候选交易
///
/// `pool` 不会被修改，结果中的集合是独立的副本。无效交易被直接跳过，不是错误。
pub fn settle<V: SignatureVerifier>(
    candidates: &[Transaction],
    pool: &UTXOPool,
    policy: SettlementPolicy,
    verifier: &V,
) -> Settlement {
    let order = processing_order(candidates, pool, policy);

    let mut current = pool.clone();
    let mut accepted = Vec::new();
    let mut seen: HashSet<TxHash> = HashSet::new();
    let mut total_fees: i128 = 0;

    for index in order {
        let tx = &candidates[index];
        if seen.contains(&tx.hash()) {
            log::debug!("skipping duplicate tx {}", tx.hash());
            continue;
        }
        if !is_valid_tx(tx, &current, verifier) {
            log::debug!("rejected tx {}", tx.hash());
            continue;
        }

        let fee = tx_fee(tx, &current);
        apply_tx(&mut current, tx);
        seen.insert(tx.hash());
        total_fees += fee;
        log::debug!("accepted tx {} with fee {}", tx.hash(), fee);
        accepted.push(tx.clone());
    }

    log::info!(
        "settled {} of {} candidate(s) under {} policy, fees {}",
        accepted.len(),
        candidates.len(),
        policy,
        total_fees
    );

    Settlement {
        accepted,
        pool: current,
        total_fees,
    }
}

// 返回候选交易的处理顺序（下标）。手续费只根据结算前的快照计算一次。
fn processing_order(candidates: &[Transaction], pool: &UTXOPool, policy: SettlementPolicy) -> Vec<usize> {
    match policy {
        SettlementPolicy::FirstValid => (0..candidates.len()).collect(),
        SettlementPolicy::MaxFee => {
            let mut ranked: Vec<(i128, TxHash, usize)> = candidates
                .iter()
                .enumerate()
                .map(|(i, tx)| (tx_fee(tx, pool), tx.hash(), i))
                .collect();
            ranked.sort_by_key(|&(fee, hash, i)| (Reverse(fee), hash, i));
            ranked.into_iter().map(|(_, _, i)| i).collect()
        }
    }
}

/// 有状态的交易处理器
///
/// 创建时复制传入的UTXO集合，之后每一轮 [`TxHandler::handle_txs`] 的结果集合
/// 就是下一轮的输入。
pub struct TxHandler<V = Secp256k1Verifier> {
    pool: UTXOPool,
    policy: SettlementPolicy,
    verifier: V,
}

impl TxHandler<Secp256k1Verifier> {
    /// 使用 secp256k1 验证器和先到先得策略
    pub fn new(pool: &UTXOPool) -> Self {
        Self::with_verifier(pool, Secp256k1Verifier::new())
    }
}

impl<V: SignatureVerifier> TxHandler<V> {
    pub fn with_verifier(pool: &UTXOPool, verifier: V) -> Self {
        TxHandler {
            pool: pool.clone(),
            policy: SettlementPolicy::default(),
            verifier,
        }
    }

    pub fn with_policy(mut self, policy: SettlementPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    /// 当前UTXO集合
    pub fn utxo_pool(&self) -> &UTXOPool {
        &self.pool
    }

    /// 相对当前UTXO集合验证交易
    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        is_valid_tx(tx, &self.pool, &self.verifier)
    }

    /// 处理一轮候选交易，返回被接受的交易并更新内部集合
    pub fn handle_txs(&mut self, possible_txs: &[Transaction]) -> Vec<Transaction> {
        let settlement = settle(possible_txs, &self.pool, self.policy, &self.verifier);
        self.pool = settlement.pool;
        settlement.accepted
    }
}

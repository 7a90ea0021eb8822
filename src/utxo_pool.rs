//! # UTXO集合模块
//!
//! 维护当前所有未花费输出，即账本的余额状态。
//! 集合只负责增删查，签名和金额规则都不在这里。

use std::collections::HashMap;

use crate::transaction::{TxOutput, UTXO};

/// 未花费输出集合，UTXO标识 -> 输出
///
/// `clone()` 产生完全独立的副本，修改副本不会影响原集合。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UTXOPool {
    utxos: HashMap<UTXO, TxOutput>,
}

impl UTXOPool {
    /// 创建空集合
    pub fn new() -> Self {
        UTXOPool {
            utxos: HashMap::new(),
        }
    }

    /// 添加一个未花费输出，已存在的标识会被覆盖
    pub fn add_utxo(&mut self, utxo: UTXO, output: TxOutput) {
        self.utxos.insert(utxo, output);
    }

    /// 移除一个未花费输出，返回被移除的输出
    pub fn remove_utxo(&mut self, utxo: &UTXO) -> Option<TxOutput> {
        self.utxos.remove(utxo)
    }

    /// 查找 `utxo` 对应的输出
    pub fn get_tx_output(&self, utxo: &UTXO) -> Option<&TxOutput> {
        self.utxos.get(utxo)
    }

    pub fn contains(&self, utxo: &UTXO) -> bool {
        self.utxos.contains_key(utxo)
    }

    /// 所有UTXO标识，顺序不确定
    pub fn all_utxo(&self) -> Vec<UTXO> {
        self.utxos.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    /// 集合中全部输出的金额之和
    pub fn total_value(&self) -> i128 {
        self.utxos.values().map(|out| out.value as i128).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UTXO, &TxOutput)> {
        self.utxos.iter()
    }
}

//! # 交易验证模块
//!
//! 判断一笔交易相对于给定UTXO集合是否有效。验证是纯函数，不修改任何状态。
//!
//! 交易有效当且仅当：
//!
//! 1. 所有引用的输出都在当前UTXO集合中；
//! 2. 每个输入的签名都由被引用输出的所有者签出；
//! 3. 同一笔交易中没有重复引用同一个UTXO；
//! 4. 所有输出金额非负；
//! 5. 输入金额之和不小于输出金额之和，差额即手续费。

use std::collections::HashSet;

use crate::crypto::SignatureVerifier;
use crate::transaction::Transaction;
use crate::utxo_pool::UTXOPool;

/// 验证交易
///
/// 检查按上面的顺序进行，遇到第一个失败立即返回 `false`。
/// 对每个输入先检查存在性，再检查签名，再检查重复，
/// 因此引用不存在输出的输入不会触发签名验证。
pub fn is_valid_tx<V: SignatureVerifier>(tx: &Transaction, pool: &UTXOPool, verifier: &V) -> bool {
    let mut claimed = HashSet::with_capacity(tx.num_inputs());
    let mut input_sum: i128 = 0;

    for (index, input) in tx.inputs().iter().enumerate() {
        let utxo = input.utxo();

        // (1) 引用的输出必须存在
        let prev_output = match pool.get_tx_output(&utxo) {
            Some(output) => output,
            None => {
                log::debug!("tx {} input {} claims missing utxo {}", tx.hash(), index, utxo);
                return false;
            }
        };

        // (2) 签名
        let signature = match input.signature.as_deref() {
            Some(signature) => signature,
            None => {
                log::debug!("tx {} input {} is unsigned", tx.hash(), index);
                return false;
            }
        };
        let message = match tx.raw_data_to_sign(index) {
            Ok(message) => message,
            Err(e) => {
                log::warn!("tx {} input {}: {}", tx.hash(), index, e);
                return false;
            }
        };
        if !verifier.verify(&prev_output.owner, &message, signature) {
            log::debug!("tx {} input {} has a bad signature", tx.hash(), index);
            return false;
        }

        // (3) 同一交易内不能重复引用
        if !claimed.insert(utxo) {
            log::debug!("tx {} claims utxo {} twice", tx.hash(), utxo);
            return false;
        }

        input_sum += prev_output.value as i128;
    }

    // (4) 输出金额非负
    if let Some(output) = tx.outputs().iter().find(|out| out.value < 0) {
        log::debug!("tx {} has negative output value {}", tx.hash(), output.value);
        return false;
    }

    // (5) 价值守恒
    let output_sum = tx.output_sum();
    if input_sum < output_sum {
        log::debug!(
            "tx {} spends {} but only claims {}",
            tx.hash(),
            output_sum,
            input_sum
        );
        return false;
    }

    true
}

/// 计算交易手续费：引用输出金额之和减去输出金额之和
///
/// 只用于排序。`pool` 中不存在的引用按 0 计入，不会导致失败；
/// 最终是否接受仍由 [`is_valid_tx`] 决定。
pub fn tx_fee(tx: &Transaction, pool: &UTXOPool) -> i128 {
    let input_sum: i128 = tx
        .inputs()
        .iter()
        .filter_map(|input| pool.get_tx_output(&input.utxo()))
        .map(|out| out.value as i128)
        .sum();
    input_sum - tx.output_sum()
}

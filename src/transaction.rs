//! # 交易模块
//!
//! 定义账本中的基本数据结构：交易哈希、未花费输出标识(UTXO)、交易输入和交易输出。
//!
//! 交易哈希只覆盖交易结构（每个输入引用的输出和全部输出），不包含任何签名。
//! 因此哈希在每次结构变化时立即重新计算，签名前后保持不变。

use std::fmt;

use secp256k1::PublicKey;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::TransactionError;

/// 金额，以最小货币单位计数的整数
///
/// 使用有符号类型，使负数输出可以被表示，并由验证器拒绝。
pub type Amount = i64;

/// 签名内容的域分隔前缀
const SIGN_DOMAIN: &[u8] = b"scrooge-tx-input";

/// 交易哈希（SHA-256，32字节）
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// 返回哈希的原始字节
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// 未花费输出的唯一标识：(产生该输出的交易哈希, 输出索引)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UTXO {
    /// 产生该输出的交易哈希
    pub tx_hash: TxHash,
    /// 输出在该交易中的位置
    pub index: u32,
}

impl UTXO {
    pub fn new(tx_hash: TxHash, index: u32) -> Self {
        UTXO { tx_hash, index }
    }
}

impl fmt::Display for UTXO {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tx_hash, self.index)
    }
}

/// 交易输出结构，表示金额和所有者
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxOutput {
    /// 输出金额
    pub value: Amount,
    /// 所有者公钥，花费该输出时需要对应私钥的签名
    pub owner: PublicKey,
}

impl TxOutput {
    pub fn new(value: Amount, owner: PublicKey) -> Self {
        TxOutput { value, owner }
    }
}

/// 交易输入结构，引用之前交易的输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxInput {
    /// 被引用输出所在交易的哈希
    pub prev_tx_hash: TxHash,
    /// 被引用输出的索引
    pub output_index: u32,
    /// 被引用输出的所有者对签名内容的签名
    pub signature: Option<Vec<u8>>,
}

impl TxInput {
    /// 该输入所花费的UTXO标识
    pub fn utxo(&self) -> UTXO {
        UTXO::new(self.prev_tx_hash, self.output_index)
    }
}

/// 交易结构，包含有序的输入、有序的输出和结构哈希
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    hash: TxHash,
    inputs: Vec<TxInput>,
    outputs: Vec<TxOutput>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// 创建一个没有输入和输出的空交易
    pub fn new() -> Self {
        let mut tx = Transaction {
            hash: TxHash::default(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        };
        tx.rehash();
        tx
    }

    /// 交易哈希
    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub fn inputs(&self) -> &[TxInput] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOutput] {
        &self.outputs
    }

    pub fn input(&self, index: usize) -> Option<&TxInput> {
        self.inputs.get(index)
    }

    pub fn output(&self, index: usize) -> Option<&TxOutput> {
        self.outputs.get(index)
    }

    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// 添加一个未签名的输入，引用 `prev_tx_hash` 的第 `output_index` 个输出
    pub fn add_input(&mut self, prev_tx_hash: TxHash, output_index: u32) -> &mut Self {
        self.inputs.push(TxInput {
            prev_tx_hash,
            output_index,
            signature: None,
        });
        self.rehash();
        self
    }

    /// 添加一个输出
    pub fn add_output(&mut self, value: Amount, owner: PublicKey) -> &mut Self {
        self.outputs.push(TxOutput::new(value, owner));
        self.rehash();
        self
    }

    /// 移除第 `index` 个输入
    pub fn remove_input(&mut self, index: usize) -> Result<TxInput, TransactionError> {
        self.check_input_index(index)?;
        let removed = self.inputs.remove(index);
        self.rehash();
        Ok(removed)
    }

    /// 为第 `index` 个输入设置签名，哈希不变
    pub fn add_signature(&mut self, index: usize, signature: Vec<u8>) -> Result<(), TransactionError> {
        self.check_input_index(index)?;
        self.inputs[index].signature = Some(signature);
        Ok(())
    }

    /// 第 `index` 个输入需要签名的内容
    ///
    /// 内容由域前缀、输入索引和不含任何签名的交易结构组成，
    /// 因此签名者只认证交易结构，不认证其他输入的签名。
    pub fn raw_data_to_sign(&self, index: usize) -> Result<Vec<u8>, TransactionError> {
        self.check_input_index(index)?;
        let mut data = Vec::with_capacity(SIGN_DOMAIN.len() + 4 + self.encoded_len());
        data.extend_from_slice(SIGN_DOMAIN);
        data.extend_from_slice(&(index as u32).to_le_bytes());
        self.encode_unsigned(&mut data);
        Ok(data)
    }

    /// 该交易的全部输出对应的UTXO标识和输出
    pub fn produced_utxos(&self) -> impl Iterator<Item = (UTXO, &TxOutput)> + '_ {
        let hash = self.hash;
        self.outputs
            .iter()
            .enumerate()
            .map(move |(i, out)| (UTXO::new(hash, i as u32), out))
    }

    /// 输出金额之和
    pub fn output_sum(&self) -> i128 {
        self.outputs.iter().map(|out| out.value as i128).sum()
    }

    fn check_input_index(&self, index: usize) -> Result<(), TransactionError> {
        if index >= self.inputs.len() {
            return Err(TransactionError::InputIndexOutOfRange {
                index,
                len: self.inputs.len(),
            });
        }
        Ok(())
    }

    fn rehash(&mut self) {
        let mut data = Vec::with_capacity(self.encoded_len());
        self.encode_unsigned(&mut data);
        let mut hasher = Sha256::new();
        hasher.update(&data);
        self.hash = TxHash(hasher.finalize().into());
    }

    fn encoded_len(&self) -> usize {
        8 + self.inputs.len() * (32 + 4) + self.outputs.len() * (8 + 33)
    }

    // 规范编码：小端序，输入数量、每个输入的(哈希, 索引)、输出数量、每个输出的(金额, 压缩公钥)
    fn encode_unsigned(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&(self.inputs.len() as u32).to_le_bytes());
        for input in &self.inputs {
            buf.extend_from_slice(input.prev_tx_hash.as_bytes());
            buf.extend_from_slice(&input.output_index.to_le_bytes());
        }
        buf.extend_from_slice(&(self.outputs.len() as u32).to_le_bytes());
        for output in &self.outputs {
            buf.extend_from_slice(&output.value.to_le_bytes());
            buf.extend_from_slice(&output.owner.serialize());
        }
    }
}

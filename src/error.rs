//! # 错误模块
//!
//! 交易验证失败不是错误，验证器只返回 `false`。
//! 这里的错误只表示调用方违反了交易结构上的约定。

use thiserror::Error;

/// 交易结构错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// 输入索引越界
    #[error("input index {index} out of range for transaction with {len} input(s)")]
    InputIndexOutOfRange { index: usize, len: usize },
    /// 签名计算失败
    #[error("signing failed: {0}")]
    Signing(#[from] secp256k1::Error),
}

/// 无法识别的结算策略名称
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown settlement policy `{0}`, expected `first-valid` or `max-fee`")]
pub struct UnknownPolicy(pub String);

//! # Scrooge 账本结算
//!
//! 基于UTXO模型的单发行方账本：验证候选交易，选出互不冲突的子集并更新未花费输出集合。
//!
//! ## 主要模块
//!
//! * `transaction` - 交易、输入、输出和UTXO标识
//! * `utxo_pool` - 未花费输出集合
//! * `crypto` - 签名验证接口和 secp256k1 实现
//! * `validator` - 单笔交易验证和手续费计算
//! * `handler` - 批量结算（先到先得 / 手续费优先）
//! * `wallet` - 密钥持有和输入签名

pub mod crypto;
pub mod error;
pub mod handler;
pub mod transaction;
pub mod utxo_pool;
pub mod validator;
pub mod wallet;

pub use crypto::{Secp256k1Verifier, SignatureVerifier};
pub use error::{TransactionError, UnknownPolicy};
pub use handler::{apply_tx, settle, Settlement, SettlementPolicy, TxHandler};
pub use transaction::{Amount, Transaction, TxHash, TxInput, TxOutput, UTXO};
pub use utxo_pool::UTXOPool;
pub use validator::{is_valid_tx, tx_fee};
pub use wallet::Wallet;

//! # 钱包模块
//!
//! 持有一对 secp256k1 密钥，用于发行输出和为交易输入签名。

use ripemd::Ripemd160;
use secp256k1::{PublicKey, SecretKey};
use sha2::{Digest, Sha256};

use crate::crypto;
use crate::error::TransactionError;
use crate::transaction::Transaction;

pub struct Wallet {
    pub private_key: SecretKey,
    pub public_key: PublicKey,
    pub address: String,
}

impl Wallet {
    /// 生成新的随机密钥对
    pub fn new() -> Self {
        let secp = secp256k1::Secp256k1::new();
        let mut rng = rand::thread_rng();
        let (secret_key, public_key) = secp.generate_keypair(&mut rng);
        let address = Self::public_key_to_address(&public_key);

        Wallet {
            private_key: secret_key,
            public_key,
            address,
        }
    }

    fn public_key_to_address(public_key: &PublicKey) -> String {
        let mut hasher = Sha256::new();
        hasher.update(public_key.serialize_uncompressed());
        let result = hasher.finalize();

        // 使用RIPEMD160进行二次哈希
        let mut ripemd = Ripemd160::new();
        ripemd.update(result);
        hex::encode(ripemd.finalize())
    }

    /// 为交易的第 `index` 个输入签名
    ///
    /// 签名内容见 [`Transaction::raw_data_to_sign`]，签名不会改变交易哈希。
    pub fn sign_input(&self, tx: &mut Transaction, index: usize) -> Result<(), TransactionError> {
        let message = tx.raw_data_to_sign(index)?;
        let signature = crypto::sign_message(&self.private_key, &message)?;
        tx.add_signature(index, signature)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

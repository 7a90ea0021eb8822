//! # 签名模块
//!
//! 验证器只通过 [`SignatureVerifier`] 检查签名，默认实现基于 secp256k1 ECDSA。
//! 消息先做 SHA-256 摘要，签名使用 64 字节紧凑格式。

use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey, VerifyOnly};
use sha2::{Digest, Sha256};

/// 签名验证接口
///
/// 实现必须是同步且无副作用的。密钥或签名格式错误应返回 `false`，不能 panic。
pub trait SignatureVerifier {
    /// `signature` 是否是 `owner` 对 `message` 的有效签名
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &[u8]) -> bool;
}

impl<V: SignatureVerifier + ?Sized> SignatureVerifier for &V {
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
        (**self).verify(owner, message, signature)
    }
}

/// secp256k1 ECDSA 签名验证器
pub struct Secp256k1Verifier {
    secp: Secp256k1<VerifyOnly>,
}

impl Secp256k1Verifier {
    pub fn new() -> Self {
        Secp256k1Verifier {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl Default for Secp256k1Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureVerifier for Secp256k1Verifier {
    fn verify(&self, owner: &PublicKey, message: &[u8], signature: &[u8]) -> bool {
        let signature = match Signature::from_compact(signature) {
            Ok(sig) => sig,
            Err(e) => {
                log::debug!("malformed signature: {}", e);
                return false;
            }
        };
        match message_digest(message) {
            Ok(digest) => self.secp.verify_ecdsa(&digest, &signature, owner).is_ok(),
            Err(_) => false,
        }
    }
}

/// 用 `secret_key` 对 `message` 签名，返回紧凑格式签名
pub fn sign_message(secret_key: &SecretKey, message: &[u8]) -> Result<Vec<u8>, secp256k1::Error> {
    let secp = Secp256k1::signing_only();
    let signature = secp.sign_ecdsa(&message_digest(message)?, secret_key);
    Ok(signature.serialize_compact().to_vec())
}

fn message_digest(message: &[u8]) -> Result<Message, secp256k1::Error> {
    let mut hasher = Sha256::new();
    hasher.update(message);
    Message::from_slice(&hasher.finalize())
}

use crate::error::{CoreError, Result};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use fernet::Fernet;

/// 凭据加密器
///
/// 目标的 Shell 口令与 SNMP community 以 Fernet 密文入库，
/// 只在采集前的一瞬间解密。解密失败一律还原成空串，
/// 绝不向调用方抛错，探测流程因此不会被坏密文打断。
pub struct CredentialSealer {
    fernet: Fernet,
}

impl CredentialSealer {
    /// 从配置的密钥串构造
    ///
    /// 密钥取前 32 字节，不足 32 字节用 '0' 右补齐。
    pub fn new(secret: &str) -> Result<Self> {
        let mut key = secret.as_bytes().to_vec();
        key.truncate(32);
        key.resize(32, b'0');

        let encoded = URL_SAFE.encode(&key);
        let fernet = Fernet::new(&encoded)
            .ok_or_else(|| CoreError::InvalidKey("derived key rejected".to_string()))?;

        Ok(Self { fernet })
    }

    /// 加密明文，空串原样返回
    pub fn seal(&self, plaintext: &str) -> String {
        if plaintext.is_empty() {
            return String::new();
        }
        self.fernet.encrypt(plaintext.as_bytes())
    }

    /// 解密密文，空串或任何解密失败都返回空串
    pub fn open(&self, token: &str) -> String {
        if token.is_empty() {
            return String::new();
        }
        match self.fernet.decrypt(token) {
            Ok(bytes) => String::from_utf8(bytes).unwrap_or_default(),
            Err(_) => String::new(),
        }
    }
}

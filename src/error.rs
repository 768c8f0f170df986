use crate::algorithms::{Algorithm, OperationKind};
use thiserror::Error;

/// The error taxonomy of the facade.
///
/// Every failure a caller can observe is one of these typed variants; nothing
/// is swallowed or retried internally, and no operation returns partial
/// output alongside an error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("不支持的操作/算法组合: {operation} + {algorithm}")]
    UnsupportedCapability {
        operation: OperationKind,
        algorithm: Algorithm,
    },

    #[error("在密钥存储中找不到指定的密钥ID: {0}")]
    KeyNotFound(String),

    #[error("密钥生成失败: {0}")]
    KeyGeneration(String),

    #[error(
        "key identifier `{key_id}` is already provisioned for {existing}, refusing {requested}"
    )]
    KeyConflict {
        key_id: String,
        existing: Algorithm,
        requested: Algorithm,
    },

    #[error("invalid input rejected before reaching a primitive: {0}")]
    InvalidInput(String),

    #[error("加密失败: {0}")]
    Encryption(String),

    #[error("解密失败：数据可能已被篡改或密钥不匹配 ({0})")]
    Decryption(String),

    #[error("签名失败: {0}")]
    Signing(String),

    #[error("structurally invalid verification input: {0}")]
    Verification(String),

    #[error("payload of {requested} bytes exceeds the resource ceiling of {limit} bytes")]
    ResourceExhausted { requested: usize, limit: usize },
}

// 定义一个统一的 Result 类型
pub type Result<T> = std::result::Result<T, Error>;

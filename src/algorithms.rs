//! Algorithm tags, operation kinds and the `Capability` pair.
//!
//! 算法标签、操作类型以及 `Capability` 组合。

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// RSA modulus size in bits. The backing store provisions 512-bit moduli.
pub const RSA_MODULUS_BITS: usize = 512;

/// RSA modulus size in bytes.
pub const RSA_MODULUS_BYTES: usize = RSA_MODULUS_BITS / 8;

/// PKCS#1 v1.5 reserves eleven bytes of every encryption block for padding.
pub const RSA_PKCS1_RESERVED: usize = 11;

/// Fixed length of an ECDSA P-256 signature in its raw (r || s) encoding.
pub const ECDSA_P256_SIGNATURE_LEN: usize = 64;

/// AES-GCM nonce length prepended to every symmetric ciphertext.
pub const AES_GCM_NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length.
pub const AES_GCM_TAG_LEN: usize = 16;

/// 加密算法枚举
///
/// Each tag fully determines the operation set, padding/digest scheme and
/// size limits of the keys provisioned under it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// AES-256 in GCM mode. Encrypt/decrypt only.
    Aes256Gcm,
    /// 512-bit RSA with PKCS#1 v1.5 padding for both encryption and signing,
    /// SHA-256 as the signing digest.
    Rsa512Pkcs1,
    /// ECDSA over NIST P-256 with SHA-256. Sign/verify only.
    EcdsaP256,
}

impl Algorithm {
    /// Every algorithm the crate knows about, in registry order.
    pub const ALL: [Algorithm; 3] = [
        Algorithm::Aes256Gcm,
        Algorithm::Rsa512Pkcs1,
        Algorithm::EcdsaP256,
    ];

    /// The operations keys of this algorithm are provisioned for.
    ///
    /// 此算法的密钥所支持的操作集合。
    pub fn operations(&self) -> &'static [OperationKind] {
        match self {
            Algorithm::Aes256Gcm => &[OperationKind::Encrypt, OperationKind::Decrypt],
            Algorithm::Rsa512Pkcs1 => &[
                OperationKind::Encrypt,
                OperationKind::Decrypt,
                OperationKind::Sign,
                OperationKind::Verify,
            ],
            Algorithm::EcdsaP256 => &[OperationKind::Sign, OperationKind::Verify],
        }
    }

    /// Maximum plaintext length a single encryption accepts, if the
    /// algorithm imposes one.
    ///
    /// PKCS#1 v1.5 caps the plaintext at modulus length minus the padding
    /// overhead: 64 - 11 = 53 bytes for the 512-bit moduli provisioned here.
    /// Signing is not affected by this bound because it digests first.
    pub fn max_plaintext_len(&self) -> Option<usize> {
        match self {
            Algorithm::Rsa512Pkcs1 => Some(RSA_MODULUS_BYTES - RSA_PKCS1_RESERVED),
            Algorithm::Aes256Gcm | Algorithm::EcdsaP256 => None,
        }
    }

    /// Fixed signature length of this algorithm's detached signatures,
    /// if it is a signing algorithm.
    pub fn signature_len(&self) -> Option<usize> {
        match self {
            Algorithm::Rsa512Pkcs1 => Some(RSA_MODULUS_BYTES),
            Algorithm::EcdsaP256 => Some(ECDSA_P256_SIGNATURE_LEN),
            Algorithm::Aes256Gcm => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::Aes256Gcm => "AES-256-GCM",
            Algorithm::Rsa512Pkcs1 => "RSA-512-PKCS1",
            Algorithm::EcdsaP256 => "ECDSA-P256",
        };
        f.write_str(name)
    }
}

/// 操作类型枚举
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefixes; the capability harness filters on these.
        let name = match self {
            OperationKind::Encrypt => "ENC",
            OperationKind::Decrypt => "DEC",
            OperationKind::Sign => "SIG",
            OperationKind::Verify => "VRF",
        };
        f.write_str(name)
    }
}

/// A supported (operation, algorithm) combination.
///
/// The set of capabilities is fixed at build time; see
/// [`CapabilityRegistry`](crate::registry::CapabilityRegistry).
///
/// 一个受支持的（操作，算法）组合。
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Capability {
    pub operation: OperationKind,
    pub algorithm: Algorithm,
}

impl Capability {
    pub fn new(operation: OperationKind, algorithm: Algorithm) -> Self {
        Self {
            operation,
            algorithm,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.operation, self.algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsa_plaintext_bound_is_fifty_three_bytes() {
        assert_eq!(Algorithm::Rsa512Pkcs1.max_plaintext_len(), Some(53));
    }

    #[test]
    fn aes_has_no_plaintext_bound() {
        assert_eq!(Algorithm::Aes256Gcm.max_plaintext_len(), None);
    }

    #[test]
    fn capability_names_use_harness_prefixes() {
        let cap = Capability::new(OperationKind::Encrypt, Algorithm::Aes256Gcm);
        assert_eq!(cap.to_string(), "ENC-AES-256-GCM");
        let cap = Capability::new(OperationKind::Sign, Algorithm::EcdsaP256);
        assert_eq!(cap.to_string(), "SIG-ECDSA-P256");
    }

    #[test]
    fn ec_keys_never_encrypt() {
        assert!(!Algorithm::EcdsaP256
            .operations()
            .contains(&OperationKind::Encrypt));
    }
}

//! The opaque boundary to a secure key store.
//!
//! Key material lives behind [`KeystoreBackend`] and never crosses the
//! boundary outward; the facade only holds identifiers. One implementation
//! exists per target platform's secure-storage API and is selected at
//! startup by handing the facade a backend instance.
//!
//! 安全密钥存储的不透明边界。密钥材料位于 [`KeystoreBackend`] 之后，
//! 绝不会向外泄露；门面层只持有标识符。

use crate::algorithms::Algorithm;
use crate::error::Result;
use crate::identifiers::KeyIdentifier;

pub mod software;

/// What a key is allowed to be used for once provisioned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPurpose {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
}

/// Digest algorithms a key is provisioned with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

/// Padding schemes a key is provisioned with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaddingScheme {
    Pkcs1,
}

/// The full parameter set handed to the store when creating a key.
///
/// Mirrors what a platform key-generation parameter builder would receive:
/// purpose set, digest set and padding, all derived from the algorithm tag.
#[derive(Clone, Debug)]
pub struct KeySpec {
    pub algorithm: Algorithm,
    pub purposes: &'static [KeyPurpose],
    pub digests: &'static [DigestAlgorithm],
    pub padding: Option<PaddingScheme>,
}

impl KeySpec {
    /// The provisioning parameters implied by an algorithm tag.
    ///
    /// The digest set is fixed to {SHA-256, SHA-512}; RSA padding is fixed
    /// to PKCS1 for both encryption and signing. Each key is restricted to
    /// the operations its algorithm tag implies.
    pub fn for_algorithm(algorithm: Algorithm) -> Self {
        const ALL_DIGESTS: &[DigestAlgorithm] =
            &[DigestAlgorithm::Sha256, DigestAlgorithm::Sha512];
        match algorithm {
            Algorithm::Aes256Gcm => Self {
                algorithm,
                purposes: &[KeyPurpose::Encrypt, KeyPurpose::Decrypt],
                digests: ALL_DIGESTS,
                padding: None,
            },
            Algorithm::Rsa512Pkcs1 => Self {
                algorithm,
                purposes: &[
                    KeyPurpose::Encrypt,
                    KeyPurpose::Decrypt,
                    KeyPurpose::Sign,
                    KeyPurpose::Verify,
                ],
                digests: ALL_DIGESTS,
                padding: Some(PaddingScheme::Pkcs1),
            },
            Algorithm::EcdsaP256 => Self {
                algorithm,
                purposes: &[KeyPurpose::Sign, KeyPurpose::Verify],
                digests: ALL_DIGESTS,
                padding: None,
            },
        }
    }
}

/// The pluggable backend boundary.
///
/// Implementations own key handles for their whole lifetime; the facade is
/// stateless between calls except for the identifier-to-handle association
/// inside the store. Implementations must be safe to call from arbitrary
/// threads.
///
/// 可插拔的后端边界。实现方在整个生命周期内持有密钥句柄。
pub trait KeystoreBackend: Send + Sync {
    /// Creates a key under `key_id` with the given parameters.
    ///
    /// Re-creating an existing key with the same algorithm is a no-op;
    /// a different algorithm under the same identifier must fail with
    /// [`Error::KeyConflict`](crate::Error::KeyConflict). Parameter sets the
    /// store cannot satisfy fail with
    /// [`Error::KeyGeneration`](crate::Error::KeyGeneration).
    fn create_key(&self, key_id: &KeyIdentifier, spec: &KeySpec) -> Result<()>;

    /// The algorithm `key_id` was provisioned for, or
    /// [`Error::KeyNotFound`](crate::Error::KeyNotFound).
    fn algorithm_of(&self, key_id: &KeyIdentifier) -> Result<Algorithm>;

    /// Encrypts `plaintext` under the named key.
    fn encrypt(&self, key_id: &KeyIdentifier, plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypts `ciphertext` under the named key.
    fn decrypt(&self, key_id: &KeyIdentifier, ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Produces a detached signature over the exact `message` bytes.
    fn sign(&self, key_id: &KeyIdentifier, message: &[u8]) -> Result<Vec<u8>>;

    /// Verifies a detached signature. A well-formed but mismatched signature
    /// is `Ok(false)`, never an error.
    fn verify(&self, key_id: &KeyIdentifier, message: &[u8], signature: &[u8]) -> Result<bool>;

    /// Public key bytes for verification-side interop. Private or secret
    /// material never crosses this boundary outward; symmetric identifiers
    /// fail with [`Error::InvalidInput`](crate::Error::InvalidInput).
    fn public_material(&self, key_id: &KeyIdentifier) -> Result<Vec<u8>>;
}

//! Capability-checked operation dispatch.
//!
//! Each operation runs the same preflight, in this order: capability check,
//! payload presence, resource ceiling, key lookup, then algorithm-specific
//! size and state constraints. Algorithm and operation together fully determine
//! the transform; there is no fallback or best-effort negotiation, and
//! mismatches are hard failures.
//!
//! 基于能力检查的操作分发。算法与操作共同唯一确定变换，不存在回退或
//! 协商机制。

use std::sync::Arc;

use tracing::debug;

use crate::algorithms::{Algorithm, OperationKind};
use crate::common::{Payload, SealOptions};
use crate::error::{Error, Result};
use crate::identifiers::KeyIdentifier;
use crate::keystore::KeystoreBackend;
use crate::registry::CapabilityRegistry;

pub struct CryptoOperationDispatcher {
    backend: Arc<dyn KeystoreBackend>,
    registry: &'static CapabilityRegistry,
    options: SealOptions,
}

impl CryptoOperationDispatcher {
    pub fn new(backend: Arc<dyn KeystoreBackend>, options: SealOptions) -> Self {
        Self {
            backend,
            registry: CapabilityRegistry::global(),
            options,
        }
    }

    /// Shared preflight; returns the resolved payload bytes.
    fn preflight<'p>(
        &self,
        operation: OperationKind,
        algorithm: Algorithm,
        key_id: &KeyIdentifier,
        payload: Payload<'p>,
        what: &str,
    ) -> Result<&'p [u8]> {
        if !self.registry.supports(operation, algorithm) {
            return Err(Error::UnsupportedCapability {
                operation,
                algorithm,
            });
        }

        let bytes = payload.require(what)?;

        let limit = self.options.max_payload_len();
        if bytes.len() > limit {
            // Caller's memory budget, not a cryptographic failure.
            return Err(Error::ResourceExhausted {
                requested: bytes.len(),
                limit,
            });
        }

        // Key lookup precedes the per-algorithm constraints: any operation
        // against a never-generated identifier reports KeyNotFound, even if
        // the payload would also violate an algorithm bound.
        let provisioned = self.backend.algorithm_of(key_id)?;
        if provisioned != algorithm {
            return Err(Error::KeyConflict {
                key_id: key_id.to_string(),
                existing: provisioned,
                requested: algorithm,
            });
        }

        debug!(%operation, %algorithm, key_id = %key_id, len = bytes.len(), "dispatch");
        Ok(bytes)
    }

    pub fn encrypt(
        &self,
        key_id: &KeyIdentifier,
        algorithm: Algorithm,
        payload: Payload<'_>,
    ) -> Result<Vec<u8>> {
        let plaintext = self.preflight(
            OperationKind::Encrypt,
            algorithm,
            key_id,
            payload,
            "encrypt",
        )?;

        // PKCS#1 v1.5 caps the plaintext; reject instead of truncating.
        if let Some(max) = algorithm.max_plaintext_len() {
            if plaintext.len() > max {
                return Err(Error::Encryption(format!(
                    "plaintext of {} bytes exceeds the {max}-byte bound of {algorithm}",
                    plaintext.len()
                )));
            }
        }

        self.backend.encrypt(key_id, plaintext)
    }

    pub fn decrypt(
        &self,
        key_id: &KeyIdentifier,
        algorithm: Algorithm,
        payload: Payload<'_>,
    ) -> Result<Vec<u8>> {
        let ciphertext = self.preflight(
            OperationKind::Decrypt,
            algorithm,
            key_id,
            payload,
            "decrypt",
        )?;

        // PKCS#1 ciphertext is never shorter than the modulus; an empty
        // input cannot reach the primitive.
        if algorithm == Algorithm::Rsa512Pkcs1 && ciphertext.is_empty() {
            return Err(Error::Decryption(
                "empty ciphertext has no PKCS1 padding block".to_string(),
            ));
        }

        self.backend.decrypt(key_id, ciphertext)
    }

    /// Signs arbitrary-length input.
    ///
    /// The input is digested before the private-key operation, so the RSA
    /// encryption plaintext bound does not apply here; any ceiling the
    /// backing primitive imposes surfaces as [`Error::Signing`].
    pub fn sign(
        &self,
        key_id: &KeyIdentifier,
        algorithm: Algorithm,
        payload: Payload<'_>,
    ) -> Result<Vec<u8>> {
        let message = self.preflight(OperationKind::Sign, algorithm, key_id, payload, "sign")?;
        self.backend.sign(key_id, message)
    }

    /// Pure function of (message, signature, key).
    ///
    /// A syntactically well-formed but mismatched signature yields
    /// `Ok(false)`; only structurally invalid inputs are errors.
    pub fn verify(
        &self,
        key_id: &KeyIdentifier,
        algorithm: Algorithm,
        message: Payload<'_>,
        signature: &[u8],
    ) -> Result<bool> {
        let message = self.preflight(OperationKind::Verify, algorithm, key_id, message, "verify")?;

        if let Some(expected) = algorithm.signature_len() {
            if signature.len() != expected {
                return Err(Error::Verification(format!(
                    "{algorithm} signatures are {expected} bytes, got {}",
                    signature.len()
                )));
            }
        }

        self.backend.verify(key_id, message, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SealOptionsBuilder;
    use crate::keystore::software::SoftwareKeystore;
    use crate::keystore::KeySpec;

    fn dispatcher() -> (Arc<SoftwareKeystore>, CryptoOperationDispatcher) {
        let backend = Arc::new(SoftwareKeystore::new());
        let dispatcher =
            CryptoOperationDispatcher::new(backend.clone(), SealOptions::default());
        (backend, dispatcher)
    }

    fn provision(backend: &SoftwareKeystore, id: &str, algorithm: Algorithm) -> KeyIdentifier {
        let id = KeyIdentifier::from(id);
        backend
            .create_key(&id, &KeySpec::for_algorithm(algorithm))
            .unwrap();
        id
    }

    #[test]
    fn unsupported_pair_fails_before_key_lookup() {
        let (_, dispatcher) = dispatcher();
        // The key was never generated; the capability check must win.
        let id = KeyIdentifier::from("no-such-key");
        let err = dispatcher
            .sign(&id, Algorithm::Aes256Gcm, b"data".into())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedCapability { .. }));
    }

    #[test]
    fn absent_payload_fails_before_key_lookup() {
        let (_, dispatcher) = dispatcher();
        let id = KeyIdentifier::from("no-such-key");
        let err = dispatcher
            .decrypt(&id, Algorithm::Rsa512Pkcs1, Payload::absent())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn unknown_key_wins_over_algorithm_constraints() {
        let (_, dispatcher) = dispatcher();
        let id = KeyIdentifier::from("never-generated");

        // Oversized RSA plaintext under an unknown key: the lookup runs
        // before the 53-byte bound, so this is KeyNotFound, not Encryption.
        let too_long = vec![0x42u8; 54];
        let err = dispatcher
            .encrypt(&id, Algorithm::Rsa512Pkcs1, (&too_long).into())
            .unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(_)));

        // Same for an empty RSA ciphertext on decrypt.
        let err = dispatcher
            .decrypt(&id, Algorithm::Rsa512Pkcs1, (&[] as &[u8]).into())
            .unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(_)));
    }

    #[test]
    fn unknown_key_is_key_not_found() {
        let (_, dispatcher) = dispatcher();
        let id = KeyIdentifier::from("never-generated");
        let err = dispatcher
            .encrypt(&id, Algorithm::Aes256Gcm, b"data".into())
            .unwrap_err();
        assert!(matches!(err, Error::KeyNotFound(_)));
    }

    #[test]
    fn algorithm_mismatch_is_a_hard_failure() {
        let (backend, dispatcher) = dispatcher();
        let id = provision(&backend, "aes-key", Algorithm::Aes256Gcm);
        let err = dispatcher
            .encrypt(&id, Algorithm::Rsa512Pkcs1, b"data".into())
            .unwrap_err();
        assert!(matches!(err, Error::KeyConflict { .. }));
    }

    #[test]
    fn rsa_plaintext_bound_is_enforced_by_the_dispatcher() {
        let (backend, dispatcher) = dispatcher();
        let id = provision(&backend, "rsa-key", Algorithm::Rsa512Pkcs1);

        let ok = vec![0x42u8; 53];
        assert!(dispatcher
            .encrypt(&id, Algorithm::Rsa512Pkcs1, (&ok).into())
            .is_ok());

        let too_long = vec![0x42u8; 54];
        let err = dispatcher
            .encrypt(&id, Algorithm::Rsa512Pkcs1, (&too_long).into())
            .unwrap_err();
        assert!(matches!(err, Error::Encryption(_)));
    }

    #[test]
    fn empty_rsa_ciphertext_is_a_decryption_error() {
        let (backend, dispatcher) = dispatcher();
        let id = provision(&backend, "rsa-key", Algorithm::Rsa512Pkcs1);
        let err = dispatcher
            .decrypt(&id, Algorithm::Rsa512Pkcs1, (&[] as &[u8]).into())
            .unwrap_err();
        assert!(matches!(err, Error::Decryption(_)));
    }

    #[test]
    fn resource_ceiling_is_not_a_crypto_error() {
        let backend = Arc::new(SoftwareKeystore::new());
        let dispatcher = CryptoOperationDispatcher::new(
            backend.clone(),
            SealOptionsBuilder::new().set_max_payload_len(16).build(),
        );
        let id = provision(&backend, "aes-key", Algorithm::Aes256Gcm);

        let oversized = vec![0u8; 17];
        let err = dispatcher
            .encrypt(&id, Algorithm::Aes256Gcm, (&oversized).into())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ResourceExhausted {
                requested: 17,
                limit: 16
            }
        ));
    }

    #[test]
    fn malformed_signature_is_structural_mismatched_is_false() {
        let (backend, dispatcher) = dispatcher();
        let id = provision(&backend, "ec-key", Algorithm::EcdsaP256);
        let message = b"signed message";
        let signature = dispatcher
            .sign(&id, Algorithm::EcdsaP256, message.into())
            .unwrap();

        // 长度错误 => 结构性错误
        let err = dispatcher
            .verify(&id, Algorithm::EcdsaP256, message.into(), &signature[1..])
            .unwrap_err();
        assert!(matches!(err, Error::Verification(_)));

        // 位翻转、长度正确 => 干净的 false
        let mut flipped = signature.clone();
        flipped[10] ^= 1;
        let verdict = dispatcher
            .verify(&id, Algorithm::EcdsaP256, message.into(), &flipped)
            .unwrap();
        assert!(!verdict);
    }
}

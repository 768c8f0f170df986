//! An in-memory, process-local keystore backend.
//!
//! Stands in for a hardware- or OS-protected store in tests and development.
//! Key material is held privately inside the store, zeroized where the
//! wrapping types allow, and is never returned to callers; only handles keyed
//! by identifier leave this module.

use std::collections::HashMap;
use std::sync::Arc;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use p256::ecdsa::{
    Signature as EcSignature, SigningKey as EcSigningKey, VerifyingKey as EcVerifyingKey,
};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::pkcs1v15::{
    Signature as RsaSignature, SigningKey as RsaSigningKey, VerifyingKey as RsaVerifyingKey,
};
use rsa::sha2::Sha256;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use signature::{SignatureEncoding, Signer, Verifier};
use tracing::debug;
use zeroize::Zeroizing;

use crate::algorithms::{Algorithm, AES_GCM_NONCE_LEN, AES_GCM_TAG_LEN, RSA_MODULUS_BITS};
use crate::error::{Error, Result};
use crate::identifiers::KeyIdentifier;
use crate::keystore::{DigestAlgorithm, KeyPurpose, KeySpec, KeystoreBackend, PaddingScheme};

/// Key material, private to the store.
///
/// `RsaPrivateKey` and the P-256 signing key zeroize themselves on drop;
/// the raw AES bytes are wrapped explicitly.
enum KeyMaterial {
    Aes(Zeroizing<[u8; 32]>),
    Rsa(Box<RsaPrivateKey>),
    Ec(EcSigningKey),
}

struct KeyEntry {
    algorithm: Algorithm,
    purposes: &'static [KeyPurpose],
    material: KeyMaterial,
}

impl KeyEntry {
    fn allows(&self, purpose: KeyPurpose) -> bool {
        self.purposes.contains(&purpose)
    }
}

/// 进程内软件密钥存储。
#[derive(Default)]
pub struct SoftwareKeystore {
    keys: RwLock<HashMap<String, Arc<KeyEntry>>>,
}

impl SoftwareKeystore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, key_id: &KeyIdentifier) -> Result<Arc<KeyEntry>> {
        self.keys
            .read()
            .get(key_id.as_str())
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(key_id.to_string()))
    }

    fn validate_spec(spec: &KeySpec) -> Result<()> {
        if !spec.digests.contains(&DigestAlgorithm::Sha256) {
            return Err(Error::KeyGeneration(
                "this store signs with SHA-256; the digest set must include it".to_string(),
            ));
        }
        match spec.algorithm {
            Algorithm::Rsa512Pkcs1 if spec.padding != Some(PaddingScheme::Pkcs1) => {
                Err(Error::KeyGeneration(
                    "this store only supports PKCS1 padding for RSA keys".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    fn generate_material(algorithm: Algorithm) -> Result<KeyMaterial> {
        match algorithm {
            Algorithm::Aes256Gcm => {
                let mut bytes = Zeroizing::new([0u8; 32]);
                OsRng.fill_bytes(bytes.as_mut());
                Ok(KeyMaterial::Aes(bytes))
            }
            Algorithm::Rsa512Pkcs1 => {
                let private = RsaPrivateKey::new(&mut OsRng, RSA_MODULUS_BITS)
                    .map_err(|e| Error::KeyGeneration(e.to_string()))?;
                Ok(KeyMaterial::Rsa(Box::new(private)))
            }
            Algorithm::EcdsaP256 => Ok(KeyMaterial::Ec(EcSigningKey::random(&mut OsRng))),
        }
    }
}

impl KeystoreBackend for SoftwareKeystore {
    fn create_key(&self, key_id: &KeyIdentifier, spec: &KeySpec) -> Result<()> {
        Self::validate_spec(spec)?;

        let mut keys = self.keys.write();
        if let Some(existing) = keys.get(key_id.as_str()) {
            if existing.algorithm == spec.algorithm {
                // Identifiers are caller-owned slots; regeneration with the
                // same algorithm reuses the existing key.
                debug!(key_id = %key_id, algorithm = %spec.algorithm, "reusing existing key");
                return Ok(());
            }
            return Err(Error::KeyConflict {
                key_id: key_id.to_string(),
                existing: existing.algorithm,
                requested: spec.algorithm,
            });
        }

        let material = Self::generate_material(spec.algorithm)?;
        keys.insert(
            key_id.to_string(),
            Arc::new(KeyEntry {
                algorithm: spec.algorithm,
                purposes: spec.purposes,
                material,
            }),
        );
        debug!(key_id = %key_id, algorithm = %spec.algorithm, "created key");
        Ok(())
    }

    fn algorithm_of(&self, key_id: &KeyIdentifier) -> Result<Algorithm> {
        Ok(self.entry(key_id)?.algorithm)
    }

    fn encrypt(&self, key_id: &KeyIdentifier, plaintext: &[u8]) -> Result<Vec<u8>> {
        let entry = self.entry(key_id)?;
        if !entry.allows(KeyPurpose::Encrypt) {
            return Err(Error::Encryption(format!(
                "key `{key_id}` is not provisioned for encryption"
            )));
        }
        match &entry.material {
            KeyMaterial::Aes(key_bytes) => {
                let cipher = Aes256Gcm::new_from_slice(key_bytes.as_ref())
                    .map_err(|e| Error::Encryption(e.to_string()))?;
                let mut nonce_bytes = [0u8; AES_GCM_NONCE_LEN];
                OsRng.fill_bytes(&mut nonce_bytes);
                let ciphertext = cipher
                    .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
                    .map_err(|_| Error::Encryption("AEAD encryption failed".to_string()))?;
                // Layout: nonce || ciphertext+tag.
                let mut output = Vec::with_capacity(AES_GCM_NONCE_LEN + ciphertext.len());
                output.extend_from_slice(&nonce_bytes);
                output.extend_from_slice(&ciphertext);
                Ok(output)
            }
            KeyMaterial::Rsa(private) => {
                let public = RsaPublicKey::from(private.as_ref());
                public
                    .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
                    .map_err(|e| Error::Encryption(e.to_string()))
            }
            KeyMaterial::Ec(_) => Err(Error::Encryption(format!(
                "key `{key_id}` is a signing-only key"
            ))),
        }
    }

    fn decrypt(&self, key_id: &KeyIdentifier, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let entry = self.entry(key_id)?;
        if !entry.allows(KeyPurpose::Decrypt) {
            return Err(Error::Decryption(format!(
                "key `{key_id}` is not provisioned for decryption"
            )));
        }
        match &entry.material {
            KeyMaterial::Aes(key_bytes) => {
                if ciphertext.len() < AES_GCM_NONCE_LEN + AES_GCM_TAG_LEN {
                    return Err(Error::Decryption(
                        "ciphertext shorter than nonce and tag".to_string(),
                    ));
                }
                let (nonce_bytes, body) = ciphertext.split_at(AES_GCM_NONCE_LEN);
                let cipher = Aes256Gcm::new_from_slice(key_bytes.as_ref())
                    .map_err(|e| Error::Decryption(e.to_string()))?;
                cipher
                    .decrypt(Nonce::from_slice(nonce_bytes), body)
                    .map_err(|_| Error::Decryption("authentication failed".to_string()))
            }
            KeyMaterial::Rsa(private) => private
                .decrypt(Pkcs1v15Encrypt, ciphertext)
                .map_err(|e| Error::Decryption(e.to_string())),
            KeyMaterial::Ec(_) => Err(Error::Decryption(format!(
                "key `{key_id}` is a signing-only key"
            ))),
        }
    }

    fn sign(&self, key_id: &KeyIdentifier, message: &[u8]) -> Result<Vec<u8>> {
        let entry = self.entry(key_id)?;
        if !entry.allows(KeyPurpose::Sign) {
            return Err(Error::Signing(format!(
                "key `{key_id}` is not provisioned for signing"
            )));
        }
        match &entry.material {
            KeyMaterial::Rsa(private) => {
                let signing_key = RsaSigningKey::<Sha256>::new(private.as_ref().clone());
                let signature: RsaSignature = signing_key
                    .try_sign(message)
                    .map_err(|e| Error::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
            KeyMaterial::Ec(signing_key) => {
                let signature: EcSignature = signing_key
                    .try_sign(message)
                    .map_err(|e| Error::Signing(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
            KeyMaterial::Aes(_) => Err(Error::Signing(format!(
                "key `{key_id}` is a symmetric key"
            ))),
        }
    }

    fn verify(&self, key_id: &KeyIdentifier, message: &[u8], signature: &[u8]) -> Result<bool> {
        let entry = self.entry(key_id)?;
        if !entry.allows(KeyPurpose::Verify) {
            return Err(Error::Verification(format!(
                "key `{key_id}` is not provisioned for verification"
            )));
        }
        match &entry.material {
            KeyMaterial::Rsa(private) => {
                let signature = RsaSignature::try_from(signature)
                    .map_err(|e| Error::Verification(e.to_string()))?;
                let verifying_key =
                    RsaVerifyingKey::<Sha256>::new(RsaPublicKey::from(private.as_ref()));
                Ok(verifying_key.verify(message, &signature).is_ok())
            }
            KeyMaterial::Ec(signing_key) => {
                let signature = EcSignature::from_slice(signature)
                    .map_err(|e| Error::Verification(e.to_string()))?;
                let verifying_key: &EcVerifyingKey = signing_key.verifying_key();
                Ok(verifying_key.verify(message, &signature).is_ok())
            }
            KeyMaterial::Aes(_) => Err(Error::Verification(format!(
                "key `{key_id}` is a symmetric key"
            ))),
        }
    }

    fn public_material(&self, key_id: &KeyIdentifier) -> Result<Vec<u8>> {
        let entry = self.entry(key_id)?;
        match &entry.material {
            KeyMaterial::Rsa(private) => RsaPublicKey::from(private.as_ref())
                .to_pkcs1_der()
                .map(|doc| doc.into_vec())
                .map_err(|e| Error::InvalidInput(e.to_string())),
            KeyMaterial::Ec(signing_key) => Ok(signing_key
                .verifying_key()
                .to_encoded_point(false)
                .as_bytes()
                .to_vec()),
            KeyMaterial::Aes(_) => Err(Error::InvalidInput(format!(
                "key `{key_id}` is symmetric and has no public material"
            ))),
        }
    }
}

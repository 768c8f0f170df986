//! Key lifecycle management: creates keys on demand with per-algorithm
//! parameters, reusing existing keys by identifier.

use std::sync::Arc;

use tracing::debug;

use crate::algorithms::Algorithm;
use crate::error::{Error, Result};
use crate::identifiers::KeyIdentifier;
use crate::keystore::{KeySpec, KeystoreBackend};
use crate::registry::CapabilityRegistry;

/// Creates keys on demand and owns the identifier-reuse policy.
///
/// Identifiers are caller-owned slots: regenerating with the same algorithm
/// is a no-op reuse, regenerating with a different algorithm fails with
/// [`Error::KeyConflict`]. There is no silent overwrite.
pub struct KeyLifecycleManager {
    backend: Arc<dyn KeystoreBackend>,
    registry: &'static CapabilityRegistry,
}

impl KeyLifecycleManager {
    pub fn new(backend: Arc<dyn KeystoreBackend>) -> Self {
        Self {
            backend,
            registry: CapabilityRegistry::global(),
        }
    }

    /// Provisions a key for `algorithm` under `key_id`.
    ///
    /// The key parameters (purpose set, digest set, padding) are derived
    /// from the algorithm tag; see [`KeySpec::for_algorithm`].
    pub fn generate_key(&self, key_id: &KeyIdentifier, algorithm: Algorithm) -> Result<()> {
        // An algorithm with no advertised capability has no working code
        // path; refuse to provision keys for it.
        if algorithm
            .operations()
            .iter()
            .all(|&op| !self.registry.supports(op, algorithm))
        {
            return Err(Error::KeyGeneration(format!(
                "algorithm {algorithm} is not in the capability registry"
            )));
        }

        let spec = KeySpec::for_algorithm(algorithm);
        debug!(key_id = %key_id, algorithm = %algorithm, "generate_key");
        self.backend.create_key(key_id, &spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::software::SoftwareKeystore;

    fn manager() -> KeyLifecycleManager {
        KeyLifecycleManager::new(Arc::new(SoftwareKeystore::new()))
    }

    #[test]
    fn generates_keys_for_every_registered_algorithm() {
        let manager = manager();
        for algorithm in Algorithm::ALL {
            let id = KeyIdentifier::new(format!("lifecycle-{algorithm}"));
            manager.generate_key(&id, algorithm).unwrap();
        }
    }

    #[test]
    fn regeneration_with_same_algorithm_is_idempotent() {
        let manager = manager();
        let id = KeyIdentifier::from("lifecycle-idempotent");
        manager.generate_key(&id, Algorithm::EcdsaP256).unwrap();
        manager.generate_key(&id, Algorithm::EcdsaP256).unwrap();
    }

    #[test]
    fn regeneration_with_other_algorithm_is_a_conflict() {
        let manager = manager();
        let id = KeyIdentifier::from("lifecycle-conflict");
        manager.generate_key(&id, Algorithm::Aes256Gcm).unwrap();
        let err = manager.generate_key(&id, Algorithm::EcdsaP256).unwrap_err();
        assert!(matches!(
            err,
            Error::KeyConflict {
                existing: Algorithm::Aes256Gcm,
                requested: Algorithm::EcdsaP256,
                ..
            }
        ));
    }
}

//! The public facade combining lifecycle, dispatch and the backend.
//!
//! 将生命周期管理、操作分发与后端组合起来的公共门面。

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::algorithms::{Algorithm, Capability};
use crate::common::{Payload, SealOptions};
use crate::dispatch::CryptoOperationDispatcher;
use crate::error::Result;
use crate::identifiers::KeyIdentifier;
use crate::keystore::KeystoreBackend;
use crate::lifecycle::KeyLifecycleManager;
use crate::registry::CapabilityRegistry;

/// Serializes access per key identifier.
///
/// The backend is the source of truth for key state; this table guarantees
/// that a generate and a use of the same identifier never interleave even if
/// the backend itself is only read-reentrant. Operations on different
/// identifiers proceed concurrently. Slots no in-flight operation holds are
/// swept on the next mint, so the table tracks live identifiers only.
#[derive(Default)]
struct KeyLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    fn slot(&self, key_id: &KeyIdentifier) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock();
        let slot = slots.entry(key_id.to_string()).or_default().clone();
        // A strong count of 1 means only the table holds the slot; the clone
        // above keeps the current identifier's slot alive through the sweep.
        slots.retain(|_, s| Arc::strong_count(s) > 1);
        slot
    }
}

/// The main entry point: a stateless facade over a keystore backend.
///
/// The facade holds no mutable process-wide state except the immutable
/// capability registry and the per-identifier lock table; all key state
/// lives in the backend. It is cheap to clone and safe to call from
/// arbitrary threads; every call blocks until completion.
///
/// 主入口：基于密钥存储后端的无状态门面。可以廉价克隆，
/// 并且可以从任意线程安全调用。
#[derive(Clone)]
pub struct KeystoreSeal {
    lifecycle: Arc<KeyLifecycleManager>,
    dispatcher: Arc<CryptoOperationDispatcher>,
    backend: Arc<dyn KeystoreBackend>,
    locks: Arc<KeyLocks>,
}

impl KeystoreSeal {
    /// Creates a facade over `backend` with default options.
    pub fn new(backend: Arc<dyn KeystoreBackend>) -> Self {
        Self::with_options(backend, SealOptions::default())
    }

    /// Creates a facade over `backend` with explicit options.
    pub fn with_options(backend: Arc<dyn KeystoreBackend>, options: SealOptions) -> Self {
        Self {
            lifecycle: Arc::new(KeyLifecycleManager::new(backend.clone())),
            dispatcher: Arc::new(CryptoOperationDispatcher::new(backend.clone(), options)),
            backend,
            locks: Arc::new(KeyLocks::default()),
        }
    }

    /// The build-time capability set. Callers and test harnesses drive
    /// their algorithm matrices from this instead of hardcoding names.
    pub fn capabilities(&self) -> &'static [Capability] {
        CapabilityRegistry::global().list()
    }

    /// Provisions a key for `algorithm` under `key_id`.
    ///
    /// Safe to repeat with identical arguments; see
    /// [`KeyLifecycleManager::generate_key`] for the reuse/conflict policy.
    pub fn generate_key(&self, key_id: &KeyIdentifier, algorithm: Algorithm) -> Result<()> {
        let slot = self.locks.slot(key_id);
        let _exclusive = slot.lock();
        self.lifecycle.generate_key(key_id, algorithm)
    }

    /// Encrypts `payload` under the named key. Returns opaque ciphertext.
    pub fn encrypt<'p>(
        &self,
        key_id: &KeyIdentifier,
        algorithm: Algorithm,
        payload: impl Into<Payload<'p>>,
    ) -> Result<Vec<u8>> {
        let slot = self.locks.slot(key_id);
        let _exclusive = slot.lock();
        self.dispatcher.encrypt(key_id, algorithm, payload.into())
    }

    /// Decrypts ciphertext produced by [`encrypt`](Self::encrypt).
    pub fn decrypt<'p>(
        &self,
        key_id: &KeyIdentifier,
        algorithm: Algorithm,
        payload: impl Into<Payload<'p>>,
    ) -> Result<Vec<u8>> {
        let slot = self.locks.slot(key_id);
        let _exclusive = slot.lock();
        self.dispatcher.decrypt(key_id, algorithm, payload.into())
    }

    /// Produces a detached signature over the exact payload bytes.
    pub fn sign<'p>(
        &self,
        key_id: &KeyIdentifier,
        algorithm: Algorithm,
        payload: impl Into<Payload<'p>>,
    ) -> Result<Vec<u8>> {
        let slot = self.locks.slot(key_id);
        let _exclusive = slot.lock();
        self.dispatcher.sign(key_id, algorithm, payload.into())
    }

    /// Verifies a detached signature against `message`.
    pub fn verify<'p>(
        &self,
        key_id: &KeyIdentifier,
        algorithm: Algorithm,
        message: impl Into<Payload<'p>>,
        signature: &[u8],
    ) -> Result<bool> {
        let slot = self.locks.slot(key_id);
        let _exclusive = slot.lock();
        self.dispatcher
            .verify(key_id, algorithm, message.into(), signature)
    }

    /// Public key bytes of an asymmetric key, for verification-side interop.
    pub fn public_material(&self, key_id: &KeyIdentifier) -> Result<Vec<u8>> {
        let slot = self.locks.slot(key_id);
        let _exclusive = slot.lock();
        self.backend.public_material(key_id)
    }
}

//! `seal-keystore` is a key management and cryptographic operation facade.
//! Applications generate, store and use keys through a uniform
//! identifier/algorithm interface while the key material itself stays inside
//! a keystore backend that never exposes private or secret bytes to the
//! caller. Capabilities are discovered at runtime, key lifecycles are
//! idempotent per identifier, and every operation either fully succeeds or
//! fails with one typed error.

pub mod algorithms;
pub mod common;
pub mod dispatch;
pub mod error;
pub mod identifiers;
pub mod keystore;
pub mod lifecycle;
pub mod registry;
pub mod seal;
pub mod transport;

pub use error::{Error, Result};

/// The commonly used surface in one import.
pub mod prelude {
    pub use crate::algorithms::{Algorithm, Capability, OperationKind};
    pub use crate::common::{Payload, SealOptions, SealOptionsBuilder};
    pub use crate::error::{Error, Result};
    pub use crate::identifiers::{KeyIdRegistry, KeyIdentifier};
    pub use crate::keystore::{software::SoftwareKeystore, KeySpec, KeystoreBackend};
    pub use crate::registry::CapabilityRegistry;
    pub use crate::seal::KeystoreSeal;
}

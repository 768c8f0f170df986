//! Key identifiers and the namespace object that mints them.

use crate::algorithms::Capability;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An opaque, caller-supplied identifier for one logical key.
///
/// The backing store persists keys under this name, so an identifier stays
/// valid across process restarts. The facade only ever moves
/// (`KeyIdentifier`, `Algorithm`) pairs across its boundary; raw key material
/// never follows.
///
/// 一个不透明的、由调用方提供的逻辑密钥标识符。
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyIdentifier(String);

impl KeyIdentifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyIdentifier {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for KeyIdentifier {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Mints key identifiers inside an explicit namespace.
///
/// Passed to callers and test harnesses instead of module-level key-name
/// constants, so independent runs can use isolated identifier namespaces.
#[derive(Clone, Debug)]
pub struct KeyIdRegistry {
    prefix: String,
}

impl KeyIdRegistry {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The deterministic identifier for the key backing one capability,
    /// `"<prefix>-<capability>"`.
    pub fn for_capability(&self, capability: &Capability) -> KeyIdentifier {
        KeyIdentifier(format!("{}-{}", self.prefix, capability))
    }

    /// A namespaced identifier for a caller-chosen name.
    pub fn named(&self, name: &str) -> KeyIdentifier {
        KeyIdentifier(format!("{}-{}", self.prefix, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{Algorithm, OperationKind};

    #[test]
    fn capability_ids_are_deterministic() {
        let registry = KeyIdRegistry::new("harness");
        let cap = Capability::new(OperationKind::Encrypt, Algorithm::Aes256Gcm);
        assert_eq!(
            registry.for_capability(&cap),
            registry.for_capability(&cap)
        );
        assert_eq!(
            registry.for_capability(&cap).as_str(),
            "harness-ENC-AES-256-GCM"
        );
    }

    #[test]
    fn namespaces_do_not_collide() {
        let a = KeyIdRegistry::new("run-a");
        let b = KeyIdRegistry::new("run-b");
        assert_ne!(a.named("key"), b.named("key"));
    }
}

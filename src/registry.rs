//! The process-wide capability registry.
//!
//! 进程级能力注册表。

use crate::algorithms::{Algorithm, Capability, OperationKind};
use once_cell::sync::Lazy;

static REGISTRY: Lazy<CapabilityRegistry> = Lazy::new(CapabilityRegistry::build);

/// Enumerates which (operation, algorithm) pairs this build supports.
///
/// The set is computed once at first use and is immutable for the rest of
/// the process lifetime. Enumeration has no side effects and no failure
/// modes; an empty set would signal a misconfigured build, not a runtime
/// error.
///
/// 枚举本构建支持哪些（操作，算法）组合。集合在首次使用时计算一次，
/// 之后在整个进程生命周期内保持不变。
pub struct CapabilityRegistry {
    capabilities: Vec<Capability>,
}

impl CapabilityRegistry {
    /// Returns the process-wide registry.
    pub fn global() -> &'static CapabilityRegistry {
        &REGISTRY
    }

    fn build() -> Self {
        let mut capabilities = Vec::new();
        for algorithm in Algorithm::ALL {
            for &operation in algorithm.operations() {
                capabilities.push(Capability::new(operation, algorithm));
            }
        }
        Self { capabilities }
    }

    /// All advertised capabilities, in a stable order.
    ///
    /// Test harnesses iterate this instead of hardcoding algorithm names.
    pub fn list(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Whether the pair is advertised by this build.
    pub fn supports(&self, operation: OperationKind, algorithm: Algorithm) -> bool {
        self.capabilities
            .iter()
            .any(|c| c.operation == operation && c.algorithm == algorithm)
    }
}

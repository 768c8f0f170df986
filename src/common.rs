//! Shared types and limits: the [`Payload`] wrapper and facade options.

use crate::error::{Error, Result};
use std::sync::Arc;

/// Default resource ceiling for a single payload, in bytes (256 MiB).
///
/// Large enough for megabyte-scale symmetric payloads, small enough that a
/// gigabyte-scale request is rejected before any allocation instead of
/// exhausting the caller's memory budget.
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 256 * 1024 * 1024;

/// An immutable byte-sequence argument that may be absent.
///
/// Transport adapters deal in nullable inputs; the core contract is defined
/// purely in bytes. `Payload` carries the distinction across the boundary so
/// the dispatcher can reject absent input with [`Error::InvalidInput`] before
/// any key lookup or primitive call. Plain slices convert implicitly, so
/// byte-level callers never see the wrapper.
///
/// 一个可能缺失的不可变字节序列参数。普通切片可以隐式转换，
/// 因此字节级调用方不会感知到这个包装器。
#[derive(Clone, Copy, Debug)]
pub struct Payload<'a> {
    bytes: Option<&'a [u8]>,
}

impl<'a> Payload<'a> {
    /// An absent (null) payload, as produced by a transport layer.
    pub fn absent() -> Self {
        Self { bytes: None }
    }

    /// Resolves to the underlying bytes, or fails fast for absent input.
    pub fn require(&self, what: &str) -> Result<&'a [u8]> {
        self.bytes
            .ok_or_else(|| Error::InvalidInput(format!("{what} payload is absent")))
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self { bytes: Some(bytes) }
    }
}

impl<'a> From<&'a Vec<u8>> for Payload<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self {
            bytes: Some(bytes.as_slice()),
        }
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Payload<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self {
            bytes: Some(bytes.as_slice()),
        }
    }
}

impl<'a> From<Option<&'a [u8]>> for Payload<'a> {
    fn from(bytes: Option<&'a [u8]>) -> Self {
        Self { bytes }
    }
}

pub(crate) struct OptionsIndex {
    pub max_payload_len: usize,
}

impl Default for OptionsIndex {
    fn default() -> Self {
        Self {
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }
}

/// Immutable, cheaply cloneable facade options.
#[derive(Clone, Default)]
pub struct SealOptions {
    index: Arc<OptionsIndex>,
}

impl SealOptions {
    pub fn max_payload_len(&self) -> usize {
        self.index.max_payload_len
    }
}

/// Builder for [`SealOptions`].
pub struct SealOptionsBuilder {
    pub max_payload_len: usize,
}

impl Default for SealOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SealOptionsBuilder {
    pub fn new() -> Self {
        Self {
            max_payload_len: DEFAULT_MAX_PAYLOAD_LEN,
        }
    }

    /// Caps the size of a single payload accepted by any operation.
    pub fn set_max_payload_len(mut self, max_payload_len: usize) -> Self {
        self.max_payload_len = max_payload_len;
        self
    }

    pub fn build(self) -> SealOptions {
        SealOptions {
            index: Arc::new(OptionsIndex {
                max_payload_len: self.max_payload_len,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_payload_is_present() {
        let data = [1u8, 2, 3];
        let payload: Payload = (&data[..]).into();
        assert_eq!(payload.require("test").unwrap(), &data);
    }

    #[test]
    fn absent_payload_is_invalid_input() {
        let payload = Payload::absent();
        assert!(matches!(
            payload.require("decrypt"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn options_builder_overrides_ceiling() {
        let options = SealOptionsBuilder::new().set_max_payload_len(1024).build();
        assert_eq!(options.max_payload_len(), 1024);
        assert_eq!(
            SealOptions::default().max_payload_len(),
            DEFAULT_MAX_PAYLOAD_LEN
        );
    }
}

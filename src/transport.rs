//! Text/transport adapter: URL-safe base64 marshalling over the byte-level
//! facade.
//!
//! The core contract is defined purely in bytes and identifiers; this module
//! is the thin collaborator that maps display/storage encodings onto it and
//! turns absent or malformed text into [`Error::InvalidInput`] before the
//! core is reached.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;

use crate::algorithms::Algorithm;
use crate::common::Payload;
use crate::error::{Error, Result};
use crate::identifiers::KeyIdentifier;
use crate::seal::KeystoreSeal;

/// Encodes bytes for display or storage.
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE.encode(bytes)
}

/// Decodes transport text back into bytes.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    URL_SAFE
        .decode(text)
        .map_err(|e| Error::InvalidInput(format!("malformed base64: {e}")))
}

/// A text-in, text-out view of a [`KeystoreSeal`].
pub struct TextTransport<'s> {
    seal: &'s KeystoreSeal,
}

impl<'s> TextTransport<'s> {
    pub fn new(seal: &'s KeystoreSeal) -> Self {
        Self { seal }
    }

    /// Encrypts UTF-8 text, returning URL-safe base64 ciphertext.
    pub fn encrypt_text(
        &self,
        key_id: &KeyIdentifier,
        algorithm: Algorithm,
        text: &str,
    ) -> Result<String> {
        let ciphertext = self.seal.encrypt(key_id, algorithm, text.as_bytes())?;
        Ok(encode(&ciphertext))
    }

    /// Decrypts URL-safe base64 ciphertext back into UTF-8 text.
    ///
    /// `None` models absent transport input and is rejected as
    /// [`Error::InvalidInput`] without touching the keystore.
    pub fn decrypt_text(
        &self,
        key_id: &KeyIdentifier,
        algorithm: Algorithm,
        text: Option<&str>,
    ) -> Result<String> {
        let plaintext = match text {
            Some(text) => {
                let ciphertext = decode(text)?;
                self.seal.decrypt(key_id, algorithm, &ciphertext)?
            }
            None => {
                // Let the dispatcher report the absence uniformly.
                self.seal.decrypt(key_id, algorithm, Payload::absent())?
            }
        };
        String::from_utf8(plaintext)
            .map_err(|e| Error::InvalidInput(format!("decrypted bytes are not UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::software::SoftwareKeystore;
    use std::sync::Arc;

    #[test]
    fn base64_roundtrip() {
        let bytes = b"\x00\xffsome bytes";
        assert_eq!(decode(&encode(bytes)).unwrap(), bytes);
    }

    #[test]
    fn malformed_text_is_invalid_input() {
        assert!(matches!(
            decode("not*base64*"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn text_roundtrip_over_the_facade() {
        let seal = KeystoreSeal::new(Arc::new(SoftwareKeystore::new()));
        let id = KeyIdentifier::from("transport-aes");
        seal.generate_key(&id, Algorithm::Aes256Gcm).unwrap();

        let transport = TextTransport::new(&seal);
        let ciphertext = transport
            .encrypt_text(&id, Algorithm::Aes256Gcm, "облако hello 云")
            .unwrap();
        let decrypted = transport
            .decrypt_text(&id, Algorithm::Aes256Gcm, Some(&ciphertext))
            .unwrap();
        assert_eq!(decrypted, "облако hello 云");
    }

    #[test]
    fn absent_text_is_invalid_input() {
        let seal = KeystoreSeal::new(Arc::new(SoftwareKeystore::new()));
        let id = KeyIdentifier::from("transport-rsa");
        seal.generate_key(&id, Algorithm::Rsa512Pkcs1).unwrap();

        let transport = TextTransport::new(&seal);
        assert!(matches!(
            transport.decrypt_text(&id, Algorithm::Rsa512Pkcs1, None),
            Err(Error::InvalidInput(_))
        ));
    }
}

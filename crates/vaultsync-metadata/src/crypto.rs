//! AES-256-GCM sealing under a folder key.

use std::fmt;

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Length of a folder key in bytes.
pub const KEY_LEN: usize = 32;
/// Length of a GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Errors from sealing or opening data.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Key material has the wrong length.
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),
    /// Nonce has the wrong length.
    #[error("invalid nonce length: expected {NONCE_LEN} bytes, got {0}")]
    InvalidNonceLength(usize),
    /// Encryption failed.
    #[error("encryption failed")]
    Encrypt,
    /// Decryption or authentication failed.
    #[error("decryption failed: wrong key or tampered data")]
    Decrypt,
    /// Base64 decoding failed.
    #[error("invalid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
}

/// Output of [`FolderKey::seal`].
#[derive(Debug, Clone)]
pub struct Sealed {
    /// Random nonce used for this sealing.
    pub nonce: Vec<u8>,
    /// Ciphertext with the 16-byte authentication tag appended.
    pub ciphertext: Vec<u8>,
}

/// The symmetric key shared by everyone with access to an encrypted folder scope.
#[derive(Clone, PartialEq, Eq)]
pub struct FolderKey([u8; KEY_LEN]);

impl fmt::Debug for FolderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FolderKey(..)")
    }
}

impl FolderKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let key = Aes256Gcm::generate_key(OsRng);
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(key.as_slice());
        Self(bytes)
    }

    /// Decode a base64 encoded key.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let raw = STANDARD.decode(encoded.trim())?;
        let bytes: [u8; KEY_LEN] = raw
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength(raw.len()))?;
        Ok(Self(bytes))
    }

    /// Encode the key as base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.0))
    }

    /// Encrypt `plaintext` bound to `aad` with a fresh nonce.
    pub fn seal(&self, plaintext: &[u8], aad: &[u8]) -> Result<Sealed, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher()
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| CryptoError::Encrypt)?;
        Ok(Sealed {
            nonce: nonce.to_vec(),
            ciphertext,
        })
    }

    /// Decrypt and authenticate data produced by [`FolderKey::seal`].
    pub fn open(
        &self,
        nonce: &[u8],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if nonce.len() != NONCE_LEN {
            return Err(CryptoError::InvalidNonceLength(nonce.len()));
        }
        self.cipher()
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| CryptoError::Decrypt)
    }

    /// Seal a secret into one base64 string (`nonce || ciphertext`).
    pub fn wrap(&self, secret: &[u8], aad: &[u8]) -> Result<String, CryptoError> {
        let sealed = self.seal(secret, aad)?;
        let mut buf = sealed.nonce;
        buf.extend_from_slice(&sealed.ciphertext);
        Ok(STANDARD.encode(buf))
    }

    /// Reverse of [`FolderKey::wrap`].
    pub fn unwrap(&self, wrapped: &str, aad: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let raw = STANDARD.decode(wrapped)?;
        if raw.len() < NONCE_LEN {
            return Err(CryptoError::InvalidNonceLength(raw.len()));
        }
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        self.open(nonce, ciphertext, aad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = FolderKey::generate();
        let sealed = key.seal(b"report.pdf", b"files").unwrap();
        assert_eq!(key.open(&sealed.nonce, &sealed.ciphertext, b"files").unwrap(), b"report.pdf");
    }

    #[test]
    fn test_open_rejects_other_aad_and_key() {
        let key = FolderKey::generate();
        let sealed = key.seal(b"secret", b"files").unwrap();
        assert!(matches!(
            key.open(&sealed.nonce, &sealed.ciphertext, b"filedrop"),
            Err(CryptoError::Decrypt)
        ));
        let other = FolderKey::generate();
        assert!(matches!(
            other.open(&sealed.nonce, &sealed.ciphertext, b"files"),
            Err(CryptoError::Decrypt)
        ));
    }

    #[test]
    fn test_base64_key_length_checked() {
        assert!(matches!(
            FolderKey::from_base64("AAAA"),
            Err(CryptoError::InvalidKeyLength(3))
        ));
        let key = FolderKey::generate();
        assert_eq!(FolderKey::from_base64(&key.to_base64()).unwrap(), key);
    }

    #[test]
    fn test_debug_is_redacted() {
        assert_eq!(format!("{:?}", FolderKey::generate()), "FolderKey(..)");
    }
}

//! Secret sealing for the persistent store.
//!
//! Values stored under a secret-suggesting key name are sealed with
//! XChaCha20-Poly1305 under a caller-supplied 32-byte key before they reach
//! disk. The sealed envelope is `sealed:<base64(nonce || ciphertext)>` with a
//! random 24-byte nonce per seal, so sealing the same value twice produces
//! different envelopes. A store opened without a key stores everything in
//! plaintext; there is no fallback cipher.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use std::fmt;

/// Prefix marking a sealed envelope.
pub const SEALED_PREFIX: &str = "sealed:";

/// Length of the XChaCha20-Poly1305 nonce in bytes.
const NONCE_LEN: usize = 24;

/// Key name fragments that mark a store key as holding a secret.
const SECRET_KEY_MARKERS: &[&str] = &[
    "token",
    "secret",
    "password",
    "credential",
    "apikey",
    "api-key",
    "api_key",
];

/// Errors that can occur while sealing or opening secrets.
#[derive(Debug)]
pub enum SealError {
    /// The supplied key is not 32 bytes long.
    InvalidKeyLength(usize),
    /// The envelope is not valid base64 or is too short to hold a nonce.
    MalformedEnvelope(String),
    /// Decryption failed: wrong key or tampered ciphertext.
    Crypto,
}

impl fmt::Display for SealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SealError::InvalidKeyLength(len) => {
                write!(f, "Sealing key must be 32 bytes, got {}", len)
            }
            SealError::MalformedEnvelope(msg) => write!(f, "Malformed sealed envelope: {}", msg),
            SealError::Crypto => write!(f, "Failed to open sealed value (wrong key or tampered)"),
        }
    }
}

impl std::error::Error for SealError {}

/// Checks whether a store key's name suggests it holds a secret.
///
/// Matching is case-insensitive on a fixed set of name fragments. The
/// standard workbench keys (`profiles`, `history`, `darkMode`, `mockEnabled`)
/// do not match.
///
/// # Examples
///
/// ```
/// use api_workbench::store::secrets::is_secret_key;
///
/// assert!(is_secret_key("apiToken"));
/// assert!(is_secret_key("client_secret"));
/// assert!(!is_secret_key("profiles"));
/// ```
pub fn is_secret_key(name: &str) -> bool {
    let lowered = name.to_lowercase();
    SECRET_KEY_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Checks whether a stored string value is a sealed envelope.
pub fn is_sealed(value: &str) -> bool {
    value.starts_with(SEALED_PREFIX)
}

/// Seals and opens secret values under a fixed 32-byte key.
#[derive(Clone)]
pub struct SecretSealer {
    cipher: XChaCha20Poly1305,
}

impl fmt::Debug for SecretSealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never expose key material through Debug output.
        f.debug_struct("SecretSealer").finish_non_exhaustive()
    }
}

impl SecretSealer {
    /// Creates a sealer from a 32-byte key.
    ///
    /// # Arguments
    ///
    /// * `key` - Exactly 32 bytes of key material
    ///
    /// # Errors
    ///
    /// Returns `SealError::InvalidKeyLength` for any other key length.
    pub fn new(key: &[u8]) -> Result<Self, SealError> {
        if key.len() != 32 {
            return Err(SealError::InvalidKeyLength(key.len()));
        }

        Ok(Self {
            cipher: XChaCha20Poly1305::new(Key::from_slice(key)),
        })
    }

    /// Seals plaintext bytes into an envelope string.
    ///
    /// A fresh random nonce is drawn per call, so repeated seals of the same
    /// plaintext differ.
    pub fn seal(&self, plaintext: &[u8]) -> Result<String, SealError> {
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| SealError::Crypto)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", SEALED_PREFIX, STANDARD.encode(blob)))
    }

    /// Opens an envelope produced by [`seal`](Self::seal).
    ///
    /// # Errors
    ///
    /// Returns `MalformedEnvelope` if the envelope cannot be decoded, or
    /// `Crypto` if authentication fails (wrong key or tampered data).
    pub fn open(&self, envelope: &str) -> Result<Vec<u8>, SealError> {
        let encoded = envelope
            .strip_prefix(SEALED_PREFIX)
            .ok_or_else(|| SealError::MalformedEnvelope("missing sealed: prefix".to_string()))?;

        let blob = STANDARD
            .decode(encoded)
            .map_err(|e| SealError::MalformedEnvelope(e.to_string()))?;

        if blob.len() < NONCE_LEN {
            return Err(SealError::MalformedEnvelope(format!(
                "envelope too short: {} bytes",
                blob.len()
            )));
        }

        let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
        self.cipher
            .decrypt(XNonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| SealError::Crypto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_sealer() -> SecretSealer {
        SecretSealer::new(&[7u8; 32]).unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_key_length() {
        assert!(matches!(
            SecretSealer::new(&[0u8; 16]),
            Err(SealError::InvalidKeyLength(16))
        ));
        assert!(SecretSealer::new(&[0u8; 32]).is_ok());
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let sealer = test_sealer();
        let envelope = sealer.seal(b"my-api-token").unwrap();

        assert!(is_sealed(&envelope));
        assert!(!envelope.contains("my-api-token"));
        assert_eq!(sealer.open(&envelope).unwrap(), b"my-api-token");
    }

    #[test]
    fn test_seal_is_randomized() {
        let sealer = test_sealer();
        let a = sealer.seal(b"same input").unwrap();
        let b = sealer.seal(b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_open_with_wrong_key_fails() {
        let envelope = test_sealer().seal(b"secret").unwrap();
        let other = SecretSealer::new(&[8u8; 32]).unwrap();

        assert!(matches!(other.open(&envelope), Err(SealError::Crypto)));
    }

    #[test]
    fn test_open_tampered_envelope_fails() {
        let sealer = test_sealer();
        let envelope = sealer.seal(b"secret").unwrap();

        // Flip a character in the base64 payload.
        let mut chars: Vec<char> = envelope.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        assert!(sealer.open(&tampered).is_err());
    }

    #[test]
    fn test_open_rejects_malformed_envelopes() {
        let sealer = test_sealer();
        assert!(matches!(
            sealer.open("plaintext"),
            Err(SealError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            sealer.open("sealed:!!not-base64!!"),
            Err(SealError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            sealer.open("sealed:AAAA"),
            Err(SealError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_is_secret_key() {
        assert!(is_secret_key("apiToken"));
        assert!(is_secret_key("API_KEY"));
        assert!(is_secret_key("client_secret"));
        assert!(is_secret_key("dbPassword"));
        assert!(is_secret_key("x-api-key"));

        assert!(!is_secret_key("profiles"));
        assert!(!is_secret_key("history"));
        assert!(!is_secret_key("darkMode"));
        assert!(!is_secret_key("mockEnabled"));
    }

    proptest! {
        #[test]
        fn prop_roundtrip_arbitrary_bytes(data in proptest::collection::vec(any::<u8>(), 0..512)) {
            let sealer = test_sealer();
            let envelope = sealer.seal(&data).unwrap();
            prop_assert_eq!(sealer.open(&envelope).unwrap(), data);
        }
    }
}

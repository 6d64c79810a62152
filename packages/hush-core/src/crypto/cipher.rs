//! # Message Cipher
//!
//! Authenticated encryption of message bodies with AES-256-GCM.
//!
//! ## Wire Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ENCRYPTED PAYLOAD                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  base64( nonce ‖ ciphertext ‖ tag )                                    │
//! │          ──12B────────────────16B─                                      │
//! │                                                                         │
//! │  The base64 string is the literal body of a chat message; the          │
//! │  transport is unaware the payload is encrypted.                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A fresh random nonce is drawn per encryption. **Never reuse a nonce
//! with the same key**: random 96-bit nonces are safe for up to 2^32
//! messages per key. Decryption fails closed: a tag mismatch or a
//! malformed blob returns an error and never partial plaintext.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce as AesNonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::crypto::kdf::SymmetricKey;
use crate::error::{Error, Result};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// An encrypted message payload: base64 of `nonce ‖ ciphertext ‖ tag`
///
/// Opaque to the transport and the document store; only
/// [`decrypt`] gives it meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedPayload(String);

impl EncryptedPayload {
    /// Wrap a base64 string received off the wire
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The base64 text to transmit or store
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EncryptedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encrypt a UTF-8 message body under a symmetric key
///
/// Fresh random nonce per call; output is `nonce ‖ ciphertext ‖ tag`
/// base64-encoded for transport. Fails only on an underlying primitive
/// error, which is unexpected.
pub fn encrypt(plaintext: &str, key: &SymmetricKey) -> Result<EncryptedPayload> {
    let blob = seal(key.as_bytes(), plaintext.as_bytes())?;
    Ok(EncryptedPayload(BASE64.encode(blob)))
}

/// Decrypt an encrypted payload back to the message text
///
/// ## Errors
///
/// - `AuthenticationFailure`: the tag does not verify, or the blob is
///   malformed (bad base64, too short). Fail-closed: no plaintext.
/// - `EncodingFailure`: the bytes authenticated but are not valid UTF-8.
pub fn decrypt(payload: &EncryptedPayload, key: &SymmetricKey) -> Result<String> {
    let blob = BASE64
        .decode(payload.as_str())
        .map_err(|_| Error::AuthenticationFailure)?;

    let plaintext = open(key.as_bytes(), &blob)?;

    String::from_utf8(plaintext).map_err(|_| Error::EncodingFailure)
}

/// AEAD-seal raw bytes: returns `nonce ‖ ciphertext ‖ tag`
///
/// Shared with the private key vault, which keys the same scheme from a
/// passphrase instead of a shared secret.
pub(crate) fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {}", e)))?;

    let mut nonce = [0u8; NONCE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce), plaintext)
        .map_err(|e| Error::EncryptionFailed(format!("Encryption failed: {}", e)))?;

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// AEAD-open a `nonce ‖ ciphertext ‖ tag` blob
///
/// Any parse or verification failure maps to `AuthenticationFailure`.
pub(crate) fn open(key: &[u8; 32], blob: &[u8]) -> Result<Vec<u8>> {
    // Shortest valid blob: nonce plus the tag of an empty message.
    if blob.len() < NONCE_SIZE + TAG_SIZE {
        return Err(Error::AuthenticationFailure);
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| Error::AuthenticationFailure)?;

    let (nonce, ciphertext) = blob.split_at(NONCE_SIZE);
    cipher
        .decrypt(AesNonce::from_slice(nonce), ciphertext)
        .map_err(|_| Error::AuthenticationFailure)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::derive_symmetric_key;
    use crate::crypto::keys::KeyPair;

    fn test_key(byte: u8) -> SymmetricKey {
        SymmetricKey::from_bytes([byte; 32])
    }

    #[test]
    fn test_round_trip() {
        let key = test_key(42);
        let payload = encrypt("Hello, World!", &key).unwrap();
        assert_eq!(decrypt(&payload, &key).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_round_trip_unicode_and_empty() {
        let key = test_key(42);
        for msg in ["", "héllo wörld", "日本語のメッセージ", "🔐🔑"] {
            let payload = encrypt(msg, &key).unwrap();
            assert_eq!(decrypt(&payload, &key).unwrap(), msg);
        }
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let key = test_key(42);
        let p1 = encrypt("same message", &key).unwrap();
        let p2 = encrypt("same message", &key).unwrap();
        assert_ne!(p1, p2);
    }

    #[test]
    fn test_any_single_bit_flip_fails_closed() {
        let key = test_key(42);
        let payload = encrypt("Hey this is a test", &key).unwrap();
        let blob = BASE64.decode(payload.as_str()).unwrap();

        for byte_idx in 0..blob.len() {
            for bit in 0..8 {
                let mut tampered = blob.clone();
                tampered[byte_idx] ^= 1 << bit;
                let tampered = EncryptedPayload::from_base64(BASE64.encode(&tampered));

                let err = decrypt(&tampered, &key).unwrap_err();
                assert!(
                    matches!(err, Error::AuthenticationFailure),
                    "flip at byte {} bit {} did not fail closed",
                    byte_idx,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_cross_key_isolation() {
        let k1 = test_key(1);
        let k2 = test_key(2);

        let payload = encrypt("for k1 only", &k1).unwrap();
        let err = decrypt(&payload, &k2).unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailure));
    }

    #[test]
    fn test_malformed_payloads_fail_closed() {
        let key = test_key(42);

        let one_byte_short = BASE64.encode([0u8; NONCE_SIZE + TAG_SIZE - 1]);
        for bad in ["", "!!!! not base64", "AAAA", one_byte_short.as_str()] {
            let err = decrypt(&EncryptedPayload::from_base64(bad), &key).unwrap_err();
            assert!(matches!(err, Error::AuthenticationFailure));
        }
    }

    #[test]
    fn test_invalid_utf8_after_authentication() {
        let key = test_key(42);

        // Seal bytes that are not valid UTF-8; the tag verifies but
        // decoding the text must fail.
        let blob = seal(key.as_bytes(), &[0xff, 0xfe, 0x80]).unwrap();
        let payload = EncryptedPayload::from_base64(BASE64.encode(blob));

        let err = decrypt(&payload, &key).unwrap_err();
        assert!(matches!(err, Error::EncodingFailure));
    }

    #[test]
    fn test_pairwise_scenario() {
        // A and B derive the same key from opposite halves, and a message
        // encrypted under A's derivation decrypts under B's.
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        let k_a = derive_symmetric_key(&bob.public_base64(), &alice.private_base64()).unwrap();
        let k_b = derive_symmetric_key(&alice.public_base64(), &bob.private_base64()).unwrap();

        let payload = encrypt("Hey this is a test", &k_a).unwrap();
        assert_eq!(decrypt(&payload, &k_b).unwrap(), "Hey this is a test");
    }
}

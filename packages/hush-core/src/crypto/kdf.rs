//! # Key Derivation Functions
//!
//! Derives symmetric message keys from X25519 key agreement, and
//! passphrase-derived keys for the private key vault.
//!
//! ## Shared Secret Derivation
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 KEY AGREEMENT → MESSAGE KEY                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  local X25519 private key  ×  remote X25519 public key                 │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  Diffie-Hellman output (32 bytes)                                      │
//! │  [identical for both parties: a_priv × b_pub == b_priv × a_pub]        │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  HKDF-SHA256(ikm = dh_output, salt = empty, info = empty)              │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  SymmetricKey (32 bytes, AES-256-GCM)                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The symmetric key is never persisted: it is recomputed per
//! conversation pair on demand, from the locally held private key and
//! the counterparty's published public key.
//!
//! ## Passphrase Derivation
//!
//! The vault key is Argon2id over the passphrase with a per-record
//! random salt. A deliberately slow, memory-hard KDF resists offline
//! brute-force against a stolen record in a way a plain hash cannot.

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::keys::{decode_key, KeyPair, KEY_SIZE};
use crate::error::{Error, Result};

/// A 32-byte symmetric encryption key
///
/// Zeroized when dropped.
#[derive(ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw key bytes
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

// Opaque on purpose: key bytes must never reach logs or panic messages.
impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// Derive the symmetric message key for a conversation pair
///
/// Takes the counterparty's public key and the local private key, both
/// as base64 text, and returns the shared AES-256-GCM key.
///
/// ## Symmetry
///
/// `derive_symmetric_key(b_pub, a_priv) == derive_symmetric_key(a_pub, b_priv)`
/// — this is the scheme's correctness property.
///
/// ## Errors
///
/// `InvalidKeyMaterial` if either input is malformed base64, decodes to
/// the wrong length, or the key agreement produces a degenerate result
/// (all-zero output, e.g. an identity-element public key). Callers must
/// not proceed to encryption on failure.
pub fn derive_symmetric_key(public_key: &str, private_key: &str) -> Result<SymmetricKey> {
    let their_public = decode_key(public_key)?;
    let our_private = decode_key(private_key)?;

    let local = KeyPair::from_private_bytes(&our_private);
    let mut dh_output = local.diffie_hellman(&their_public);

    // A low-order public key collapses the exchange to zero. Reject it
    // instead of deriving a key an attacker can predict.
    if dh_output == [0u8; KEY_SIZE] {
        return Err(Error::InvalidKeyMaterial(
            "Public key produces a degenerate shared secret".into(),
        ));
    }

    // Empty salt, empty info: the key is bound to the pair alone.
    let hkdf = Hkdf::<Sha256>::new(None, &dh_output);
    let mut key = [0u8; KEY_SIZE];
    hkdf.expand(&[], &mut key)
        .map_err(|_| Error::KeyDerivationFailed("HKDF expansion failed".into()))?;

    dh_output.zeroize();

    Ok(SymmetricKey::from_bytes(key))
}

/// Derive a vault key from a passphrase and per-record salt
///
/// Argon2id with the crate's default parameters. Deterministic for a
/// given (passphrase, salt) pair: `unlock` recomputes the same key that
/// `lock` used.
pub(crate) fn derive_passphrase_key(passphrase: &str, salt: &[u8]) -> Result<[u8; KEY_SIZE]> {
    let mut key = [0u8; KEY_SIZE];
    argon2::Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| Error::KeyDerivationFailed(format!("Argon2 failed: {}", e)))?;
    Ok(key)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    #[test]
    fn test_key_agreement_symmetry() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        let k_a = derive_symmetric_key(&bob.public_base64(), &alice.private_base64()).unwrap();
        let k_b = derive_symmetric_key(&alice.public_base64(), &bob.private_base64()).unwrap();

        assert_eq!(k_a.as_bytes(), k_b.as_bytes());
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        let k1 = derive_symmetric_key(&bob.public_base64(), &alice.private_base64()).unwrap();
        let k2 = derive_symmetric_key(&bob.public_base64(), &alice.private_base64()).unwrap();

        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_different_pairs_different_keys() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();
        let carol = KeyPair::generate();

        let k_ab = derive_symmetric_key(&bob.public_base64(), &alice.private_base64()).unwrap();
        let k_ac = derive_symmetric_key(&carol.public_base64(), &alice.private_base64()).unwrap();

        assert_ne!(k_ab.as_bytes(), k_ac.as_bytes());
    }

    #[test]
    fn test_malformed_public_key_rejected() {
        let alice = KeyPair::generate();

        let err = derive_symmetric_key("@@not-base64@@", &alice.private_base64()).unwrap_err();
        assert!(matches!(err, Error::InvalidKeyMaterial(_)));
    }

    #[test]
    fn test_wrong_length_private_key_rejected() {
        let bob = KeyPair::generate();
        let short = BASE64.encode([7u8; 16]);

        let err = derive_symmetric_key(&bob.public_base64(), &short).unwrap_err();
        assert!(matches!(err, Error::InvalidKeyMaterial(_)));
    }

    #[test]
    fn test_identity_element_public_key_rejected() {
        let alice = KeyPair::generate();
        let zero_public = BASE64.encode([0u8; KEY_SIZE]);

        let err = derive_symmetric_key(&zero_public, &alice.private_base64()).unwrap_err();
        assert!(matches!(err, Error::InvalidKeyMaterial(_)));
    }

    #[test]
    fn test_debug_output_does_not_leak_key_bytes() {
        let key = SymmetricKey::from_bytes([0xAB; KEY_SIZE]);
        let rendered = format!("{:?}", key);

        assert_eq!(rendered, "SymmetricKey(..)");
        assert!(!rendered.contains("171"));
    }

    #[test]
    fn test_passphrase_key_deterministic_per_salt() {
        let salt1 = [1u8; 16];
        let salt2 = [2u8; 16];

        let k1 = derive_passphrase_key("correct horse", &salt1).unwrap();
        let k2 = derive_passphrase_key("correct horse", &salt1).unwrap();
        let k3 = derive_passphrase_key("correct horse", &salt2).unwrap();

        assert_eq!(k1, k2);
        assert_ne!(k1, k3);
    }
}

//! # Key Management
//!
//! X25519 key-agreement key pairs, generated once per user at sign-up.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY PAIR                                       │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  KeyPair (X25519)                                                      │
//! │  ──────────────────                                                     │
//! │                                                                         │
//! │  Purpose:                                                              │
//! │  • Key exchange with conversation partners (ECDH)                     │
//! │  • Deriving shared secrets for E2E message encryption                 │
//! │                                                                         │
//! │  Format:                                                              │
//! │  • Private key: 32 bytes (kept secret, zeroized on drop)             │
//! │  • Public key:  32 bytes (published to the document store)           │
//! │  • Both travel as base64 text                                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The private key never leaves the device in plaintext: it is either in
//! session memory or locked in an [`EncryptedPrivateKeyRecord`].
//!
//! [`EncryptedPrivateKeyRecord`]: crate::crypto::EncryptedPrivateKeyRecord

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::error::{Error, Result};

/// Size of raw X25519 keys in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// X25519 key-agreement key pair
///
/// ## Security
///
/// - The private half is zeroized when this struct is dropped
/// - The public half can be shared freely
#[derive(ZeroizeOnDrop)]
pub struct KeyPair {
    /// Private key (secret)
    #[zeroize(skip)] // x25519_dalek handles its own zeroization
    secret: StaticSecret,
    /// Public key (derived from secret)
    #[zeroize(skip)]
    public: X25519PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    ///
    /// Uses the operating system's secure random number generator.
    /// Infallible: failure of the OS RNG is unreachable in the
    /// underlying primitive.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Reconstruct a key pair from raw private-key bytes
    pub fn from_private_bytes(bytes: &[u8; KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(*bytes);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Reconstruct a key pair from a base64 private key
    ///
    /// This is the sign-in path: the private key text comes out of the
    /// vault and back into a usable key object.
    pub fn from_private_base64(private_key: &str) -> Result<Self> {
        let bytes = decode_key(private_key)?;
        Ok(Self::from_private_bytes(&bytes))
    }

    /// Get the raw public key bytes
    pub fn public_bytes(&self) -> [u8; KEY_SIZE] {
        self.public.to_bytes()
    }

    /// Get the raw private key bytes
    ///
    /// ## Security Warning
    ///
    /// Only use this for vault storage. Never log or transmit these bytes.
    pub fn private_bytes(&self) -> [u8; KEY_SIZE] {
        self.secret.to_bytes()
    }

    /// Public key as base64 text, the form published to the document store
    pub fn public_base64(&self) -> String {
        BASE64.encode(self.public_bytes())
    }

    /// Private key as base64 text, the form the vault locks at rest
    pub fn private_base64(&self) -> String {
        BASE64.encode(self.private_bytes())
    }

    /// Perform X25519 Diffie-Hellman key agreement
    ///
    /// Both parties compute the same value:
    /// - Alice: alice_secret × bob_public
    /// - Bob: bob_secret × alice_public
    pub fn diffie_hellman(&self, their_public: &[u8; KEY_SIZE]) -> [u8; KEY_SIZE] {
        let their_public = X25519PublicKey::from(*their_public);
        self.secret.diffie_hellman(&their_public).to_bytes()
    }
}

/// Decode a base64 key into raw bytes, validating the length
///
/// Shared by key-pair reconstruction and shared-secret derivation.
pub fn decode_key(encoded: &str) -> Result<[u8; KEY_SIZE]> {
    let bytes = BASE64
        .decode(encoded)
        .map_err(|e| Error::InvalidKeyMaterial(format!("Invalid base64: {}", e)))?;

    bytes.try_into().map_err(|_| {
        Error::InvalidKeyMaterial(format!("Key must decode to {} bytes", KEY_SIZE))
    })
}

// ============================================================================
// TESTS
// ============================================================================

//! # Cryptography Module
//!
//! All cryptographic primitives used by Hush Core.
//!
//! ## Scheme Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Message Encryption                                                    │
//! │  ─────────────────────                                                  │
//! │  1. Key Agreement: X25519                                              │
//! │     local private × remote public = shared secret                      │
//! │                                                                         │
//! │  2. Key Derivation: HKDF-SHA256 (empty salt, empty info)               │
//! │     shared secret → 32-byte symmetric key                              │
//! │                                                                         │
//! │  3. Encryption: AES-256-GCM                                            │
//! │     • 96-bit nonce (random per message)                                │
//! │     • 128-bit authentication tag                                       │
//! │     • payload = base64(nonce ‖ ciphertext ‖ tag)                       │
//! │                                                                         │
//! │  Private Key at Rest                                                   │
//! │  ─────────────────────                                                  │
//! │  Same AEAD, keyed by Argon2id(passphrase, per-record salt)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One shared secret per conversation pair, recomputed on demand. There
//! is no ratcheting and no key rotation: compromise of either party's
//! private key exposes the whole pair history. That is a deliberate
//! scope boundary of the scheme, not an implementation gap.
//!
//! ## Security Considerations
//!
//! 1. **Key Zeroization**: secret keys are zeroized when dropped
//! 2. **Constant-Time Operations**: dalek primitives throughout
//! 3. **Secure Random**: `rand::rngs::OsRng` for keys, nonces and salts
//! 4. **No Nonce Reuse**: fresh random nonce for every encryption

mod cipher;
mod kdf;
mod keys;
mod vault;

pub use cipher::{decrypt, encrypt, EncryptedPayload, NONCE_SIZE, TAG_SIZE};
pub use kdf::{derive_symmetric_key, SymmetricKey};
pub use keys::{decode_key, KeyPair, KEY_SIZE};
pub use vault::{lock, unlock, EncryptedPrivateKeyRecord, SALT_SIZE};

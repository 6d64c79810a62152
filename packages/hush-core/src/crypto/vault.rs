//! # Private Key Vault
//!
//! Encrypts the user's own private key under a passphrase for storage
//! in the document store, and decrypts it back at sign-in.
//!
//! ## Record Format
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  ENCRYPTED PRIVATE KEY RECORD                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  base64( salt ‖ nonce ‖ ciphertext ‖ tag )                              │
//! │          ─16B───12B──────────────────16B─                               │
//! │                                                                         │
//! │  AEAD key = Argon2id(passphrase, salt) → 32 bytes                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Same AEAD scheme as the message cipher, keyed differently: a
//! passphrase-derived key instead of a pair-wise shared secret. The salt
//! is drawn fresh per record, so equal passphrases never produce related
//! keys across records.
//!
//! Lifecycle: written once at sign-up completion, read once per sign-in.
//! Persistence of the record is the session's responsibility, not this
//! module's.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::cipher::{open, seal, NONCE_SIZE, TAG_SIZE};
use crate::crypto::kdf::derive_passphrase_key;
use crate::error::{Error, Result};

/// Size of the per-record Argon2id salt in bytes
pub const SALT_SIZE: usize = 16;

/// A private key encrypted at rest, stored per user id
///
/// Serializes to the document-store field shape
/// (`{"encryptedPrivateKey": "<base64 blob>"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPrivateKeyRecord {
    /// base64 of `salt ‖ nonce ‖ ciphertext ‖ tag`
    pub encrypted_private_key: String,
}

/// Lock a private key under a passphrase
///
/// Derives the AEAD key as Argon2id(passphrase, random salt) and seals
/// the private-key text. The salt rides inside the record blob.
pub fn lock(private_key: &str, passphrase: &str) -> Result<EncryptedPrivateKeyRecord> {
    let mut salt = [0u8; SALT_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let mut key = derive_passphrase_key(passphrase, &salt)?;
    let sealed = seal(&key, private_key.as_bytes());
    key.zeroize();
    let sealed = sealed?;

    let mut blob = Vec::with_capacity(SALT_SIZE + sealed.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&sealed);

    Ok(EncryptedPrivateKeyRecord {
        encrypted_private_key: BASE64.encode(blob),
    })
}

/// Unlock a private key record with a passphrase
///
/// ## Errors
///
/// `WrongPassphraseOrCorruptRecord` on any failure: the scheme cannot
/// distinguish a wrong passphrase from data corruption, and callers
/// should present both possibilities to the user.
pub fn unlock(record: &EncryptedPrivateKeyRecord, passphrase: &str) -> Result<String> {
    let blob = BASE64
        .decode(&record.encrypted_private_key)
        .map_err(|_| Error::WrongPassphraseOrCorruptRecord)?;

    if blob.len() < SALT_SIZE + NONCE_SIZE + TAG_SIZE {
        return Err(Error::WrongPassphraseOrCorruptRecord);
    }

    let (salt, sealed) = blob.split_at(SALT_SIZE);

    let mut key = derive_passphrase_key(passphrase, salt)?;
    let plaintext = open(&key, sealed);
    key.zeroize();

    let plaintext = plaintext.map_err(|_| Error::WrongPassphraseOrCorruptRecord)?;

    String::from_utf8(plaintext).map_err(|_| Error::WrongPassphraseOrCorruptRecord)
}

// ============================================================================
// TESTS
// ============================================================================

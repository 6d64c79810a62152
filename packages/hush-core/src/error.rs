//! # Error Handling
//!
//! This module provides the error types for Hush Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── InvalidKeyMaterial      - Malformed/undecodable key           │
//! │  │   ├── EncryptionFailed        - AEAD primitive failed on encrypt    │
//! │  │   ├── AuthenticationFailure   - Tag mismatch / malformed blob       │
//! │  │   ├── EncodingFailure         - Decrypted bytes not valid UTF-8     │
//! │  │   ├── WrongPassphraseOrCorruptRecord - Vault unlock failed          │
//! │  │   └── KeyDerivationFailed     - HKDF/Argon2 expansion failed        │
//! │  │                                                                      │
//! │  └── Session Errors                                                    │
//! │      ├── AuthRejected            - Identity provider refused           │
//! │      ├── RecordNotFound          - No document for the user id         │
//! │      ├── StoreError              - Document store read/write failed    │
//! │      ├── TransportError          - Chat transport call failed          │
//! │      ├── TokenError              - Token issuance failed               │
//! │      └── NotSignedIn             - Operation needs an unlocked key     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All crypto errors are recoverable from the caller's perspective:
//! surface them to the user and allow a retry with corrected input.
//! None is process-fatal.

use thiserror::Error;

/// Result type alias for Hush Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Hush Core
///
/// Errors are categorized by domain so callers can map them to user
/// feedback without string matching.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Crypto Errors (100-199)
    // ========================================================================

    /// Key material could not be decoded into a valid key.
    ///
    /// Raised for malformed base64, wrong decoded length, or a key that
    /// produces a degenerate key-agreement result (e.g. the identity
    /// element). Callers must not proceed to encryption.
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// The AEAD primitive failed during encryption (unexpected).
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// AEAD tag verification failed, or the payload blob was malformed.
    ///
    /// Always fail-closed: no partial or unauthenticated plaintext is
    /// ever returned.
    #[error("Decryption failed: authentication tag mismatch or malformed payload")]
    AuthenticationFailure,

    /// The decrypted bytes were authenticated but are not valid UTF-8 text.
    #[error("Decrypted payload is not valid UTF-8 text")]
    EncodingFailure,

    /// Vault unlock failed.
    ///
    /// The scheme cannot distinguish a wrong passphrase from a corrupt
    /// record: both surface here.
    #[error("Could not unlock private key: wrong passphrase or corrupt record")]
    WrongPassphraseOrCorruptRecord,

    /// Key derivation (HKDF expansion or Argon2) failed.
    #[error("Failed to derive key: {0}")]
    KeyDerivationFailed(String),

    // ========================================================================
    // Session Errors (200-299)
    // ========================================================================

    /// The identity provider rejected the credentials or account request.
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// No document exists for the requested user id.
    #[error("No record found for user: {0}")]
    RecordNotFound(String),

    /// The document store failed to read or write.
    #[error("Document store error: {0}")]
    StoreError(String),

    /// The chat transport failed.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Token issuance failed.
    #[error("Token issuance failed: {0}")]
    TokenError(String),

    /// The operation requires a signed-in session with an unlocked key.
    #[error("Not signed in. Sign in and unlock the private key first.")]
    NotSignedIn,
}

impl Error {
    /// Get the numeric error code.
    ///
    /// Codes are organized by category:
    /// - 100-199: Crypto
    /// - 200-299: Session / collaborators
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidKeyMaterial(_) => 100,
            Error::EncryptionFailed(_) => 101,
            Error::AuthenticationFailure => 102,
            Error::EncodingFailure => 103,
            Error::WrongPassphraseOrCorruptRecord => 104,
            Error::KeyDerivationFailed(_) => 105,

            Error::AuthRejected(_) => 200,
            Error::RecordNotFound(_) => 201,
            Error::StoreError(_) => 202,
            Error::TransportError(_) => 203,
            Error::TokenError(_) => 204,
            Error::NotSignedIn => 205,
        }
    }

    /// Check if this error is recoverable.
    ///
    /// Recoverable errors can be resolved by retrying or by user action
    /// (e.g. re-entering a passphrase). Every crypto error is recoverable;
    /// nothing here should abort the process.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::EncryptionFailed(_) | Error::KeyDerivationFailed(_))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidKeyMaterial("x".into()).code(), 100);
        assert_eq!(Error::AuthenticationFailure.code(), 102);
        assert_eq!(Error::WrongPassphraseOrCorruptRecord.code(), 104);
        assert_eq!(Error::AuthRejected("x".into()).code(), 200);
        assert_eq!(Error::NotSignedIn.code(), 205);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::AuthenticationFailure.is_recoverable());
        assert!(Error::WrongPassphraseOrCorruptRecord.is_recoverable());
        assert!(Error::EncodingFailure.is_recoverable());
        assert!(Error::InvalidKeyMaterial("bad".into()).is_recoverable());
        assert!(!Error::EncryptionFailed("rng".into()).is_recoverable());
    }

    #[test]
    fn test_display_never_leaks_detail_for_auth_failure() {
        // The tag-mismatch message is fixed text: nothing about the key
        // or plaintext can leak through it.
        let msg = Error::AuthenticationFailure.to_string();
        assert!(msg.contains("authentication tag mismatch"));
    }
}

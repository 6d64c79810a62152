//! # Hush Core
//!
//! The end-to-end message encryption core of the Hush chat client.
//!
//! The chat SDK carries messages and the backend stores accounts and
//! documents; neither ever sees plaintext or raw private keys. This
//! crate owns the key derivation and encryption sequence between them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         HUSH CORE MODULES                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │  Session (orchestrator)                                       │     │
//! │  │  sign_up / sign_in / send_message / receive_message           │     │
//! │  └──────┬──────────────────────────────────────┬─────────────────┘     │
//! │         │                                      │                       │
//! │         ▼                                      ▼                       │
//! │  ┌─────────────────────────┐   ┌────────────────────────────────┐     │
//! │  │  Crypto                 │   │  Backend (trait seams)          │     │
//! │  │                         │   │                                │     │
//! │  │  keys   - X25519 pairs  │   │  IdentityProvider - accounts   │     │
//! │  │  kdf    - DH + HKDF,    │   │  DocumentStore    - records    │     │
//! │  │           Argon2id      │   │  ChatTransport    - delivery   │     │
//! │  │  cipher - AES-256-GCM   │   │  TokenSource      - chat token │     │
//! │  │  vault  - key at rest   │   │                                │     │
//! │  └─────────────────────────┘   └────────────────────────────────┘     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`crypto`] - Key pairs, key derivation, message cipher, key vault
//! - [`backend`] - Async trait seams to the external collaborators
//! - [`session`] - The orchestrated sign-up / sign-in / messaging flows
//!
//! ## Security Model
//!
//! One X25519 key pair per user, generated at sign-up. The public half
//! is published to the document store; the private half is stored only
//! inside an Argon2id-passphrase-locked AEAD record. Message keys are
//! derived per conversation pair (X25519 + HKDF-SHA256) and never
//! persisted. No forward secrecy and no key rotation: that is a scope
//! boundary of the scheme, documented in [`crypto`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod backend;
pub mod crypto;
pub mod error;
pub mod session;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use backend::{ChatTransport, DocumentStore, IdentityProvider, TokenSource, UserRecord};
pub use crypto::{
    decrypt, derive_symmetric_key, encrypt, lock, unlock, EncryptedPayload,
    EncryptedPrivateKeyRecord, KeyPair, SymmetricKey,
};
pub use error::{Error, Result};
pub use session::ChatSession;

/// Returns the version of Hush Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}

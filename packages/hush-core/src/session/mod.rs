//! # Chat Session
//!
//! The orchestrator: wires the crypto core into the sign-up, sign-in,
//! and messaging flows, talking to the identity provider and document
//! store for persistence and the chat transport for delivery.
//!
//! ## Call Sequences
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SESSION FLOWS                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Sign-up                                                               │
//! │  ───────                                                               │
//! │  create account → generate key pair → vault-lock private key           │
//! │  → persist record (username, email, encryptedPrivateKey)               │
//! │  → publish publicKey → report success                                  │
//! │                                                                         │
//! │  Sign-in                                                               │
//! │  ───────                                                               │
//! │  authenticate → read record → vault-unlock private key                 │
//! │  → fetch chat token → connect transport → ready                        │
//! │                                                                         │
//! │  Send                                                                  │
//! │  ────                                                                  │
//! │  fetch recipient publicKey → derive symmetric key (fresh)              │
//! │  → encrypt → send payload as a plain text body                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//!
//! - The private key is held in memory only after a successful
//!   passphrase unlock (sign-in); it is never persisted unencrypted.
//! - Every encrypt/decrypt derives its key fresh from (local private
//!   key, counterparty public key). There is no cached symmetric key
//!   store.
//! - Collaborator failures surface immediately; no retries. Concurrent
//!   sign-ins or sends are not serialized here.

use std::sync::Arc;

use parking_lot::RwLock;
use zeroize::Zeroizing;

use crate::backend::{ChatTransport, DocumentStore, IdentityProvider, TokenSource, UserRecord};
use crate::crypto::{self, EncryptedPayload, EncryptedPrivateKeyRecord, KeyPair};
use crate::error::{Error, Result};

/// The signed-in user and their unlocked key material
struct ActiveUser {
    user_id: String,
    username: String,
    keys: KeyPair,
}

/// A process-wide chat session with explicit lifecycle
///
/// Construct once with the collaborators injected, sign in, exchange
/// messages, sign out. Collaborators are trait objects: production
/// wires the real SDK and backend, tests wire
/// [`crate::backend::memory`].
pub struct ChatSession {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    transport: Arc<dyn ChatTransport>,
    tokens: Arc<dyn TokenSource>,
    active: RwLock<Option<ActiveUser>>,
}

impl ChatSession {
    /// Set up a session over the given collaborators
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        transport: Arc<dyn ChatTransport>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            identity,
            store,
            transport,
            tokens,
            active: RwLock::new(None),
        }
    }

    /// Create an account and provision its key material
    ///
    /// Sequence: create the account, generate a fresh key pair, lock the
    /// private key under the chosen passphrase, persist the record keyed
    /// by the new user id, then publish the public key. Success is
    /// reported only after the public key is published.
    ///
    /// Returns the new user id. The session stays signed out: key
    /// material enters memory through [`ChatSession::sign_in`] only.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        username: &str,
        passphrase: &str,
    ) -> Result<String> {
        if email.is_empty() || password.is_empty() || username.is_empty() {
            return Err(Error::AuthRejected("all fields are required".into()));
        }
        if passphrase.is_empty() {
            return Err(Error::AuthRejected("passphrase cannot be empty".into()));
        }

        let user_id = self.identity.create_account(email, password).await?;

        let keys = KeyPair::generate();
        let record = crypto::lock(&keys.private_base64(), passphrase)?;

        self.store
            .merge_user_record(
                &user_id,
                UserRecord {
                    username: Some(username.to_string()),
                    email: Some(email.to_string()),
                    encrypted_private_key: Some(record.encrypted_private_key),
                    ..Default::default()
                },
            )
            .await?;

        self.store
            .merge_user_record(
                &user_id,
                UserRecord {
                    public_key: Some(keys.public_base64()),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = user_id.as_str(), "Sign-up complete, keys provisioned");
        Ok(user_id)
    }

    /// Authenticate and unlock the private key
    ///
    /// Message send/receive becomes available only after the stored
    /// record unlocks under the given passphrase and the transport is
    /// connected with a fresh chat token.
    pub async fn sign_in(&self, email: &str, password: &str, passphrase: &str) -> Result<()> {
        let user_id = self.identity.authenticate(email, password).await?;
        let record = self.store.user_record(&user_id).await?;

        let locked = EncryptedPrivateKeyRecord {
            encrypted_private_key: record.encrypted_private_key.ok_or_else(|| {
                Error::StoreError(format!("record for {} has no encryptedPrivateKey", user_id))
            })?,
        };
        let private_key = Zeroizing::new(crypto::unlock(&locked, passphrase)?);
        let keys = KeyPair::from_private_base64(&private_key)?;

        let username = record.username.unwrap_or_else(|| user_id.clone());

        let token = self.tokens.issue_token(&user_id).await?;
        self.transport
            .connect_user(&user_id, &username, &token)
            .await?;

        *self.active.write() = Some(ActiveUser {
            user_id: user_id.clone(),
            username,
            keys,
        });

        tracing::info!(user_id = user_id.as_str(), "Signed in, private key unlocked");
        Ok(())
    }

    /// Encrypt a message for a recipient and hand it to the transport
    ///
    /// The recipient's public key is fetched and the symmetric key
    /// derived fresh on every call. The transport carries the payload as
    /// an ordinary text body.
    pub async fn send_message(&self, recipient_id: &str, text: &str) -> Result<()> {
        let recipient = self.store.user_record(recipient_id).await?;
        let their_public = recipient.public_key.ok_or_else(|| {
            Error::StoreError(format!("record for {} has no publicKey", recipient_id))
        })?;

        let payload = {
            let active = self.active.read();
            let user = active.as_ref().ok_or(Error::NotSignedIn)?;

            let key = crypto::derive_symmetric_key(
                &their_public,
                &Zeroizing::new(user.keys.private_base64()),
            )?;
            crypto::encrypt(text, &key)?
        };

        self.transport.send_text(recipient_id, payload.as_str()).await?;

        tracing::debug!(recipient = recipient_id, "Encrypted message sent");
        Ok(())
    }

    /// Decrypt a payload received from a sender
    pub async fn receive_message(
        &self,
        sender_id: &str,
        payload: &EncryptedPayload,
    ) -> Result<String> {
        let sender = self.store.user_record(sender_id).await?;
        let their_public = sender.public_key.ok_or_else(|| {
            Error::StoreError(format!("record for {} has no publicKey", sender_id))
        })?;

        let active = self.active.read();
        let user = active.as_ref().ok_or(Error::NotSignedIn)?;

        let key = crypto::derive_symmetric_key(
            &their_public,
            &Zeroizing::new(user.keys.private_base64()),
        )?;
        crypto::decrypt(payload, &key)
    }

    /// Create a named channel through the transport
    pub async fn create_channel(&self, name: &str) -> Result<()> {
        if !self.is_signed_in() {
            return Err(Error::NotSignedIn);
        }
        self.transport.create_channel(name).await
    }

    /// Disconnect and drop all key material
    pub async fn sign_out(&self) -> Result<()> {
        self.transport.disconnect().await?;
        *self.active.write() = None;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Whether a user is signed in with an unlocked key
    pub fn is_signed_in(&self) -> bool {
        self.active.read().is_some()
    }

    /// The signed-in user id, if any
    pub fn current_user(&self) -> Option<String> {
        self.active.read().as_ref().map(|u| u.user_id.clone())
    }

    /// The signed-in username, if any
    pub fn current_username(&self) -> Option<String> {
        self.active.read().as_ref().map(|u| u.username.clone())
    }
}

// ============================================================================
// TESTS
// ============================================================================

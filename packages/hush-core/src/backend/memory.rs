//! In-memory collaborator implementations
//!
//! Back the [`super`] traits with `RwLock<HashMap>` state, the same way
//! the production implementations would back them with a real identity
//! provider, document database, and chat SDK. Used by the session tests
//! and local development; nothing here persists.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{ChatTransport, DocumentStore, IdentityProvider, TokenSource, UserRecord};
use crate::error::{Error, Result};

/// In-memory email/password accounts
#[derive(Default)]
pub struct MemoryIdentityProvider {
    /// email → (password, user id)
    accounts: RwLock<HashMap<String, (String, String)>>,
    next_id: AtomicU64,
}

impl MemoryIdentityProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(&self, email: &str, password: &str) -> Result<String> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(email) {
            return Err(Error::AuthRejected("email already registered".into()));
        }

        let user_id = format!("user-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        accounts.insert(email.to_string(), (password.to_string(), user_id.clone()));
        Ok(user_id)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<String> {
        let accounts = self.accounts.read();
        match accounts.get(email) {
            Some((stored, user_id)) if stored == password => Ok(user_id.clone()),
            _ => Err(Error::AuthRejected("invalid credentials".into())),
        }
    }
}

/// In-memory per-user document store with merge-on-write semantics
#[derive(Default)]
pub struct MemoryDocumentStore {
    records: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn merge_user_record(&self, user_id: &str, update: UserRecord) -> Result<()> {
        let mut records = self.records.write();
        records
            .entry(user_id.to_string())
            .or_default()
            .merge_from(update);
        Ok(())
    }

    async fn user_record(&self, user_id: &str) -> Result<UserRecord> {
        let records = self.records.read();
        records
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::RecordNotFound(user_id.to_string()))
    }
}

/// A text body handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Destination channel (recipient user id for direct messages)
    pub channel: String,
    /// The literal message body (an encrypted payload, though the
    /// transport does not know that)
    pub body: String,
}

/// In-memory chat transport that records what it is asked to deliver
#[derive(Default)]
pub struct MemoryChatTransport {
    connected: RwLock<Option<String>>,
    sent: RwLock<Vec<SentMessage>>,
    channels: RwLock<Vec<String>>,
}

impl MemoryChatTransport {
    /// Create a disconnected transport
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently connected user id, if any
    pub fn connected_user(&self) -> Option<String> {
        self.connected.read().clone()
    }

    /// Everything sent so far, in order
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.read().clone()
    }

    /// Channels created so far
    pub fn channels(&self) -> Vec<String> {
        self.channels.read().clone()
    }
}

#[async_trait]
impl ChatTransport for MemoryChatTransport {
    async fn connect_user(&self, user_id: &str, _username: &str, token: &str) -> Result<()> {
        if token.is_empty() {
            return Err(Error::TransportError("empty token".into()));
        }
        *self.connected.write() = Some(user_id.to_string());
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        *self.connected.write() = None;
        Ok(())
    }

    async fn send_text(&self, channel: &str, body: &str) -> Result<()> {
        if self.connected.read().is_none() {
            return Err(Error::TransportError("not connected".into()));
        }
        self.sent.write().push(SentMessage {
            channel: channel.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn create_channel(&self, name: &str) -> Result<()> {
        if self.connected.read().is_none() {
            return Err(Error::TransportError("not connected".into()));
        }
        self.channels.write().push(name.to_string());
        Ok(())
    }
}

/// In-memory token source issuing predictable tokens
#[derive(Default)]
pub struct MemoryTokenSource;

impl MemoryTokenSource {
    /// Create a token source
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TokenSource for MemoryTokenSource {
    async fn issue_token(&self, user_id: &str) -> Result<String> {
        Ok(format!("token-{}", user_id))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_account_lifecycle() {
        let provider = MemoryIdentityProvider::new();

        let id = provider
            .create_account("ada@example.com", "pw")
            .await
            .unwrap();
        assert_eq!(provider.authenticate("ada@example.com", "pw").await.unwrap(), id);

        // Duplicate email rejected
        let err = provider
            .create_account("ada@example.com", "other")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AuthRejected(_)));

        // Wrong password rejected
        let err = provider
            .authenticate("ada@example.com", "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AuthRejected(_)));
    }

    #[tokio::test]
    async fn test_store_merges_across_writes() {
        let store = MemoryDocumentStore::new();

        store
            .merge_user_record(
                "u1",
                UserRecord {
                    username: Some("ada".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .merge_user_record(
                "u1",
                UserRecord {
                    public_key: Some("pk".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let record = store.user_record("u1").await.unwrap();
        assert_eq!(record.username.as_deref(), Some("ada"));
        assert_eq!(record.public_key.as_deref(), Some("pk"));
    }

    #[tokio::test]
    async fn test_store_missing_record() {
        let store = MemoryDocumentStore::new();
        let err = store.user_record("nobody").await.unwrap_err();
        assert!(matches!(err, Error::RecordNotFound(_)));
    }

    #[tokio::test]
    async fn test_transport_requires_connection() {
        let transport = MemoryChatTransport::new();

        let err = transport.send_text("u2", "hi").await.unwrap_err();
        assert!(matches!(err, Error::TransportError(_)));

        transport.connect_user("u1", "ada", "tok").await.unwrap();
        transport.send_text("u2", "hi").await.unwrap();
        assert_eq!(transport.sent_messages().len(), 1);

        transport.disconnect().await.unwrap();
        assert!(transport.connected_user().is_none());
    }
}

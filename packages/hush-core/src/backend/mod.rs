//! # Backend Collaborators
//!
//! Narrow async interfaces to the systems the session orchestrates:
//! the identity provider (accounts), the document store (per-user
//! records), the chat transport (delivery), and the token-issuance
//! endpoint. The crypto core never talks to any of these directly.
//!
//! Each call completes exactly once with success or failure. No retry
//! or backoff is applied here or by the session: the first failure
//! surfaces immediately to the caller.
//!
//! [`memory`] provides in-memory implementations used by tests and
//! local development.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The per-user document stored under the user's id
///
/// Four independently-writable fields. Updates are merged, not
/// overwritten: a write carrying only `public_key` must not clear the
/// other three fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    /// Display / sign-in name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Account email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// X25519 public key, base64
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Vault blob, base64 (see [`crate::crypto::EncryptedPrivateKeyRecord`])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_private_key: Option<String>,
}

impl UserRecord {
    /// Merge another record into this one
    ///
    /// Fields present in `update` replace the current values; absent
    /// fields are left untouched.
    pub fn merge_from(&mut self, update: UserRecord) {
        if let Some(v) = update.username {
            self.username = Some(v);
        }
        if let Some(v) = update.email {
            self.email = Some(v);
        }
        if let Some(v) = update.public_key {
            self.public_key = Some(v);
        }
        if let Some(v) = update.encrypted_private_key {
            self.encrypted_private_key = Some(v);
        }
    }
}

/// Email/password account provider (external)
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account; returns the new user id.
    async fn create_account(&self, email: &str, password: &str) -> Result<String>;

    /// Authenticate existing credentials; returns the user id.
    async fn authenticate(&self, email: &str, password: &str) -> Result<String>;
}

/// Per-user key-value document store (external)
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Merge `update` into the record stored under `user_id`,
    /// creating the record if absent.
    async fn merge_user_record(&self, user_id: &str, update: UserRecord) -> Result<()>;

    /// Fetch the record for `user_id`; `RecordNotFound` if absent.
    async fn user_record(&self, user_id: &str) -> Result<UserRecord>;
}

/// Chat transport (external)
///
/// The transport delivers opaque text bodies. It is unaware that the
/// bodies it carries are encrypted payloads.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Connect the current user with a service token.
    async fn connect_user(&self, user_id: &str, username: &str, token: &str) -> Result<()>;

    /// Disconnect the current user.
    async fn disconnect(&self) -> Result<()>;

    /// Send a text body to a channel (a recipient user id for direct
    /// messages).
    async fn send_text(&self, channel: &str, body: &str) -> Result<()>;

    /// Create a named channel.
    async fn create_channel(&self, name: &str) -> Result<()>;
}

/// Chat-service token issuer (external; see the `hush-token` service)
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Obtain a signed chat-service token for `user_id`.
    async fn issue_token(&self, user_id: &str) -> Result<String>;
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_preserves_absent_fields() {
        let mut record = UserRecord {
            username: Some("ada".into()),
            email: Some("ada@example.com".into()),
            public_key: None,
            encrypted_private_key: Some("blob".into()),
        };

        record.merge_from(UserRecord {
            public_key: Some("pk".into()),
            ..Default::default()
        });

        assert_eq!(record.username.as_deref(), Some("ada"));
        assert_eq!(record.email.as_deref(), Some("ada@example.com"));
        assert_eq!(record.public_key.as_deref(), Some("pk"));
        assert_eq!(record.encrypted_private_key.as_deref(), Some("blob"));
    }

    #[test]
    fn test_record_json_field_names() {
        let record = UserRecord {
            username: Some("ada".into()),
            email: Some("ada@example.com".into()),
            public_key: Some("pk".into()),
            encrypted_private_key: Some("blob".into()),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["username"], "ada");
        assert_eq!(json["publicKey"], "pk");
        assert_eq!(json["encryptedPrivateKey"], "blob");
    }

    #[test]
    fn test_record_json_absent_fields_omitted() {
        let record = UserRecord {
            public_key: Some("pk".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("username").is_none());
        assert!(json.get("encryptedPrivateKey").is_none());
    }
}

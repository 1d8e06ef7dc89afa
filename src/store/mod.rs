//! Date-keyed JSON document store.
//!
//! Documents live in nested collections addressed by slash-separated paths
//! (`users/{uid}/dailyHealthLogs`), each document a JSON object under a
//! string key. Writes are atomic per document and last-write-wins; there is
//! no multi-document transaction. Collections support live subscriptions
//! delivering a fresh ordered snapshot after every write.

pub mod sqlite;
pub mod subscription;

pub use sqlite::SqliteStore;
pub use subscription::Subscription;

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Document not found: {collection}/{key}")]
    NotFound { collection: String, key: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Invalid collection path: {0}")]
    InvalidPath(String),

    #[error("Stored value is not a JSON object: {collection}/{key}")]
    NotAnObject { collection: String, key: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal lock error")]
    LockPoisoned,
}

/// A document as read from a collection listing: its key and value.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: String,
    pub value: Value,
}

/// Callback invoked with the full ordered snapshot of a collection.
pub type SnapshotCallback = Box<dyn Fn(&[Document]) + Send>;

/// The persistence contract every service module writes through.
pub trait DocumentStore {
    /// Read one document, `None` if absent.
    fn get_document(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write one document. With `merge`, fields of `value` are shallow-merged
    /// into the existing object; without, the document is replaced.
    fn set_document(
        &self,
        collection: &str,
        key: &str,
        value: &Value,
        merge: bool,
    ) -> Result<(), StoreError>;

    /// Shallow-merge `partial` into an existing document.
    /// Fails with `NotFound` if the document does not exist.
    fn update_document(
        &self,
        collection: &str,
        key: &str,
        partial: &Value,
    ) -> Result<(), StoreError>;

    /// Append a document under a generated key; returns the key.
    fn add_document(&self, collection: &str, value: &Value) -> Result<String, StoreError>;

    /// All documents of a collection, ordered ascending by the JSON field
    /// named `order_key`.
    fn list_collection(&self, collection: &str, order_key: &str)
        -> Result<Vec<Document>, StoreError>;

    /// Subscribe to a collection. The callback fires immediately with the
    /// current snapshot and again after every write to the collection, each
    /// time with a complete re-read ordered snapshot. Dropping the returned
    /// handle (or calling `unsubscribe`) stops delivery.
    fn stream_collection(
        &self,
        collection: &str,
        order_key: &str,
        callback: SnapshotCallback,
    ) -> Result<Subscription, StoreError>;
}

/// Document paths used by the application, kept bit-compatible with the
/// deployed store layout.
pub mod paths {
    /// Profile document: collection + key.
    pub fn user_profile(uid: &str) -> (String, String) {
        ("users".to_string(), uid.to_string())
    }

    pub fn daily_health_logs(uid: &str) -> String {
        format!("users/{uid}/dailyHealthLogs")
    }

    pub fn health_predictions(uid: &str) -> String {
        format!("users/{uid}/healthPredictions")
    }

    pub fn daily_todo_lists(uid: &str) -> String {
        format!("users/{uid}/dailyToDoLists")
    }

    pub fn chat_history(uid: &str) -> String {
        format!("users/{uid}/chatHistory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_match_deployed_layout() {
        assert_eq!(paths::user_profile("u1"), ("users".to_string(), "u1".to_string()));
        assert_eq!(paths::daily_health_logs("u1"), "users/u1/dailyHealthLogs");
        assert_eq!(paths::health_predictions("u1"), "users/u1/healthPredictions");
        assert_eq!(paths::daily_todo_lists("u1"), "users/u1/dailyToDoLists");
        assert_eq!(paths::chat_history("u1"), "users/u1/chatHistory");
    }
}

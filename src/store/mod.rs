//! Document store abstraction.
//!
//! Every collection holds schemaless JSON documents keyed by a string id.
//! Services receive the store by reference; nothing in the crate keeps a
//! global client.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

pub type Fields = Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document {collection}/{id} not found")]
    NotFound { collection: String, id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Fields) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection, in insertion order.
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Insert under a freshly generated id and return that id.
    async fn add(&self, collection: &str, data: Fields) -> StoreResult<String>;

    /// Create or replace the document at `id`.
    async fn set(&self, collection: &str, id: &str, data: Fields) -> StoreResult<()>;

    /// Merge top-level fields into an existing document.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Returns whether a document was removed.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;
}

/// Drops keys with no value. Every write path runs its payload through here
/// so an absent field is never persisted as `null`.
pub fn sanitize(mut data: Fields) -> Fields {
    data.retain(|_, v| !v.is_null());
    data
}

pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_drops_null_keys_only() {
        let data = json!({
            "a": null,
            "b": "",
            "c": 0,
            "d": { "inner": null },
        });
        let Value::Object(map) = data else {
            unreachable!()
        };

        let clean = sanitize(map);
        assert!(!clean.contains_key("a"));
        assert_eq!(clean["b"], json!(""));
        assert_eq!(clean["c"], json!(0));
        assert_eq!(clean["d"], json!({ "inner": null }));
    }
}

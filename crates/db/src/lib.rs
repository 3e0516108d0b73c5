//! Document store client for bookstack.
//!
//! Records are schema-flexible JSON objects grouped into named collections and
//! addressed by a store-generated identifier. Handlers only ever see the
//! [`DocumentStore`] trait, so a test double or another backend can be swapped
//! in without touching request handling.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod memory;

pub use memory::MemoryStore;

/// Field map of a stored document, without its identifier.
pub type Fields = Map<String, Value>;

/// Handle shared by every in-flight request.
pub type SharedStore = Arc<dyn DocumentStore>;

/// A persisted document: the generated identifier plus its current fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

/// Failures raised by a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cast to ObjectId failed for value \"{value}\" at path \"id\" for collection \"{collection}\"")]
    InvalidId { value: String, collection: String },

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations against a named collection.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store a new document and return it with its generated identifier.
    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<Document>;

    /// All documents of a collection, oldest first.
    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>>;

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Merge `patch` into the matching document and return its new state.
    /// The identifier itself is never rewritten.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> StoreResult<Option<Document>>;

    /// Remove the matching document and return its prior state.
    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;
}

/// Open the document store named by `url`.
///
/// Called once at startup; the outcome is logged and failures are returned
/// to the caller without retrying.
pub async fn connect(url: &str) -> anyhow::Result<SharedStore> {
    let (scheme, location) = url
        .split_once("://")
        .ok_or_else(|| anyhow::anyhow!("invalid document store url '{}'", url))?;

    let store: SharedStore = match scheme {
        "memory" => Arc::new(MemoryStore::new()),
        other => {
            tracing::error!(target: "bookstack-db", scheme = other, "document store connection failed");
            anyhow::bail!("unsupported document store scheme '{}'", other);
        }
    };

    tracing::info!(target: "bookstack-db", scheme, database = location, "connected to document store");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn connect_accepts_memory_scheme() {
        let store = connect("memory://books").await.unwrap();
        assert!(store.find_all("book").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn connect_rejects_unknown_scheme() {
        let err = connect("mongodb://localhost:27017/books").await.err().unwrap();
        assert!(err.to_string().contains("unsupported document store scheme"));
    }

    #[tokio::test]
    async fn connect_rejects_url_without_scheme() {
        assert!(connect("books").await.is_err());
    }

    #[test]
    fn document_serializes_id_alongside_fields() {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), json!("Dune"));
        let doc = Document {
            id: "abc".to_string(),
            fields,
        };

        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"id": "abc", "name": "Dune"})
        );
    }
}

//! In-process document store backing the `memory://` scheme.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{Document, DocumentStore, Fields, StoreError, StoreResult};

const ID_FIELD: &str = "id";

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    fields: Fields,
}

#[derive(Debug, Default)]
struct Collection {
    next_seq: u64,
    entries: HashMap<Uuid, Entry>,
}

/// Document store kept entirely in memory. Last write wins.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_id(collection: &str, id: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| StoreError::InvalidId {
        value: id.to_string(),
        collection: collection.to_string(),
    })
}

fn to_document(id: &Uuid, entry: &Entry) -> Document {
    Document {
        id: id.to_string(),
        fields: entry.fields.clone(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, mut fields: Fields) -> StoreResult<Document> {
        fields.remove(ID_FIELD);

        let mut collections = self.collections.write().await;
        let coll = collections.entry(collection.to_string()).or_default();

        let id = Uuid::now_v7();
        let entry = Entry {
            seq: coll.next_seq,
            fields,
        };
        coll.next_seq += 1;

        let doc = to_document(&id, &entry);
        coll.entries.insert(id, entry);

        tracing::debug!(target: "bookstack-db", collection, id = %id, "document inserted");
        Ok(doc)
    }

    async fn find_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let Some(coll) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<_> = coll.entries.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.seq);

        Ok(entries
            .into_iter()
            .map(|(id, entry)| to_document(id, entry))
            .collect())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let key = parse_id(collection, id)?;
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .and_then(|coll| coll.entries.get(&key))
            .map(|entry| to_document(&key, entry)))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> StoreResult<Option<Document>> {
        let key = parse_id(collection, id)?;
        let mut collections = self.collections.write().await;

        let Some(entry) = collections
            .get_mut(collection)
            .and_then(|coll| coll.entries.get_mut(&key))
        else {
            return Ok(None);
        };

        for (field, value) in patch {
            if field != ID_FIELD {
                entry.fields.insert(field, value);
            }
        }

        tracing::debug!(target: "bookstack-db", collection, id = %key, "document updated");
        Ok(Some(to_document(&key, entry)))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let key = parse_id(collection, id)?;
        let mut collections = self.collections.write().await;

        let removed = collections
            .get_mut(collection)
            .and_then(|coll| coll.entries.remove(&key))
            .map(|entry| to_document(&key, &entry));

        if removed.is_some() {
            tracing::debug!(target: "bookstack-db", collection, id = %key, "document deleted");
        }
        Ok(removed)
    }
}

use std::sync::Arc;

use bookstack_db::{SharedStore, StoreResult};

use super::models::{Book, BookPatch, NewBook};

/// Book persistence over the shared document store.
#[derive(Clone)]
pub struct BookRepository {
    store: SharedStore,
    collection: Arc<str>,
}

impl BookRepository {
    pub fn new(store: SharedStore, collection: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub async fn create(&self, book: NewBook) -> StoreResult<Book> {
        let doc = self.store.insert(&self.collection, book.into_fields()).await?;
        Ok(doc.into())
    }

    pub async fn list(&self) -> StoreResult<Vec<Book>> {
        let docs = self.store.find_all(&self.collection).await?;
        Ok(docs.into_iter().map(Book::from).collect())
    }

    pub async fn get(&self, id: &str) -> StoreResult<Option<Book>> {
        let doc = self.store.find_by_id(&self.collection, id).await?;
        Ok(doc.map(Book::from))
    }

    pub async fn update(&self, id: &str, patch: BookPatch) -> StoreResult<Option<Book>> {
        let doc = self.store.update_by_id(&self.collection, id, patch.0).await?;
        Ok(doc.map(Book::from))
    }

    pub async fn delete(&self, id: &str) -> StoreResult<Option<Book>> {
        let doc = self.store.delete_by_id(&self.collection, id).await?;
        Ok(doc.map(Book::from))
    }
}

// Storage abstraction for the book catalog
// This defines the interface every book store backend implements

//! # Storage Abstraction Layer
//!
//! The catalog talks to its book store through the [`BookStorage`] trait.
//! A backend only has to support the five primitive document operations:
//! find-all, find-by-id, insert, update-by-id and delete-by-id, with the
//! backend generating unique identifiers on insert.
//!
//! ## Backends
//!
//! - [`InMemoryStorage`]: default for development and tests
//! - [`NatsBookStorage`](crate::engine::nats_storage::NatsBookStorage):
//!   NATS JetStream key-value bucket holding JSON documents
//!
//! ## Thread Safety
//!
//! A single backend instance is shared by every request for the lifetime of
//! the process, so implementations must be `Send + Sync`.
//!
//! ## Rust Learning Notes:
//!
//! ### Async Traits
//! The `async-trait` crate lets trait methods be `async` and still be used
//! behind `Arc<dyn BookStorage>`.
//!
//! ### `Result<Option<T>>`
//! - `Ok(Some(doc))`: found
//! - `Ok(None)`: no document with that id (not an error)
//! - `Err(error)`: the store failed

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::models::{BookDocument, BookDraft, BookId};
use crate::Result;

/// Storage trait for book document persistence
#[async_trait::async_trait]
pub trait BookStorage: Send + Sync {
    /// Insert a new document; the backend assigns the id
    async fn insert_book(&self, draft: BookDraft) -> Result<BookDocument>;

    /// Find a document by id
    async fn find_book(&self, id: &BookId) -> Result<Option<BookDocument>>;

    /// All documents, in creation order
    async fn list_books(&self) -> Result<Vec<BookDocument>>;

    /// Replace the data fields of an existing document
    ///
    /// Returns the document as stored after the update, or `None` when no
    /// document has that id. Nothing is written in the `None` case.
    async fn update_book(&self, id: &BookId, draft: BookDraft) -> Result<Option<BookDocument>>;

    /// Hard-delete a document, returning its last stored values
    async fn delete_book(&self, id: &BookId) -> Result<Option<BookDocument>>;

    /// Delete every document, returning how many were removed
    async fn purge_books(&self) -> Result<usize>;

    /// Short name of the backend, used in logs
    fn backend_name(&self) -> &'static str;
}

#[derive(Default)]
struct Collection {
    documents: HashMap<BookId, BookDocument>,
    // insertion order; deleted ids are removed
    order: Vec<BookId>,
}

/// In-memory storage implementation for development and testing
///
/// ## Limitations
///
/// - **Not persistent**: Data is lost when process restarts
/// - **Not distributed**: Cannot share data across multiple processes
///
/// ## Rust Learning Notes:
///
/// ### Interior Mutability Pattern
/// The collection sits behind an `RwLock`, so `&self` methods can still
/// modify it. Many readers may hold the lock at once, writers are exclusive.
#[derive(Default)]
pub struct InMemoryStorage {
    collection: RwLock<Collection>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collection>> {
        self.collection
            .read()
            .map_err(|_| anyhow::anyhow!("in-memory book collection lock poisoned").into())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collection>> {
        self.collection
            .write()
            .map_err(|_| anyhow::anyhow!("in-memory book collection lock poisoned").into())
    }
}

#[async_trait::async_trait]
impl BookStorage for InMemoryStorage {
    async fn insert_book(&self, draft: BookDraft) -> Result<BookDocument> {
        let mut collection = self.write()?;

        // v4 collisions are not expected, but an id must never be reused
        let mut document = BookDocument::new(draft.clone());
        while collection.documents.contains_key(&document.id) {
            document = BookDocument::new(draft.clone());
        }

        collection.order.push(document.id);
        collection.documents.insert(document.id, document.clone());
        debug!("Inserted book {} into memory", document.id);
        Ok(document)
    }

    async fn find_book(&self, id: &BookId) -> Result<Option<BookDocument>> {
        let collection = self.read()?;
        Ok(collection.documents.get(id).cloned())
    }

    async fn list_books(&self) -> Result<Vec<BookDocument>> {
        let collection = self.read()?;
        Ok(collection
            .order
            .iter()
            .filter_map(|id| collection.documents.get(id).cloned())
            .collect())
    }

    async fn update_book(&self, id: &BookId, draft: BookDraft) -> Result<Option<BookDocument>> {
        let mut collection = self.write()?;
        match collection.documents.get_mut(id) {
            Some(document) => {
                document.apply(draft);
                Ok(Some(document.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_book(&self, id: &BookId) -> Result<Option<BookDocument>> {
        let mut collection = self.write()?;
        let removed = collection.documents.remove(id);
        if removed.is_some() {
            collection.order.retain(|existing| existing != id);
        }
        Ok(removed)
    }

    async fn purge_books(&self) -> Result<usize> {
        let mut collection = self.write()?;
        let count = collection.documents.len();
        collection.documents.clear();
        collection.order.clear();
        Ok(count)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// A store that is always down; every call fails with a storage error
/// mentioning an internal address
#[cfg(test)]
pub(crate) struct UnavailableStorage;

#[cfg(test)]
impl UnavailableStorage {
    pub(crate) const DETAIL: &'static str = "connection refused: 10.1.2.3:4222";

    fn failure<T>() -> Result<T> {
        Err(anyhow::anyhow!(Self::DETAIL).into())
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl BookStorage for UnavailableStorage {
    async fn insert_book(&self, _draft: BookDraft) -> Result<BookDocument> {
        Self::failure()
    }

    async fn find_book(&self, _id: &BookId) -> Result<Option<BookDocument>> {
        Self::failure()
    }

    async fn list_books(&self) -> Result<Vec<BookDocument>> {
        Self::failure()
    }

    async fn update_book(&self, _id: &BookId, _draft: BookDraft) -> Result<Option<BookDocument>> {
        Self::failure()
    }

    async fn delete_book(&self, _id: &BookId) -> Result<Option<BookDocument>> {
        Self::failure()
    }

    async fn purge_books(&self) -> Result<usize> {
        Self::failure()
    }

    fn backend_name(&self) -> &'static str {
        "unavailable"
    }
}

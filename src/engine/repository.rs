// Book repository facade
// The single boundary between the protocol handlers and the book store

//! # Book Repository Facade
//!
//! [`BookRepository`] owns the shared storage handle and is the only place
//! where store documents become public [`Book`]s. The REST handlers and the
//! GraphQL resolvers both go through it, so they always see the same shape.
//!
//! ## Lookup Results
//!
//! Operations addressed by id return a [`BookOutcome`]:
//!
//! ```text
//! Found(Book)   -> 200 / Book
//! NotFound      -> 404 / null
//! Failed(error) -> 4xx-5xx / GraphQL error
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::engine::storage::{BookStorage, InMemoryStorage};
use crate::models::{Book, BookDocument, BookDraft, BookId};
use crate::{BookCatalogError, Result};

/// Result of an operation that targets one book by id
#[derive(Debug)]
pub enum BookOutcome {
    Found(Book),
    NotFound,
    Failed(BookCatalogError),
}

impl BookOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, BookOutcome::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BookOutcome::NotFound)
    }

    /// The book, if one was found
    pub fn found(self) -> Option<Book> {
        match self {
            BookOutcome::Found(book) => Some(book),
            _ => None,
        }
    }

    /// Fold back into the `Result<Option<_>>` form
    pub fn into_result(self) -> Result<Option<Book>> {
        match self {
            BookOutcome::Found(book) => Ok(Some(book)),
            BookOutcome::NotFound => Ok(None),
            BookOutcome::Failed(error) => Err(error),
        }
    }
}

impl From<Result<Option<Book>>> for BookOutcome {
    fn from(result: Result<Option<Book>>) -> Self {
        match result {
            Ok(Some(book)) => BookOutcome::Found(book),
            Ok(None) => BookOutcome::NotFound,
            Err(error) => BookOutcome::Failed(error),
        }
    }
}

impl From<&BookDocument> for Book {
    fn from(document: &BookDocument) -> Self {
        Book {
            id: document.id.to_string(),
            title: document.title.clone(),
            author: document.author.clone(),
            year: document.year,
        }
    }
}

impl From<BookDocument> for Book {
    fn from(document: BookDocument) -> Self {
        Book {
            id: document.id.to_string(),
            title: document.title,
            author: document.author,
            year: document.year,
        }
    }
}

/// Repository facade over a shared [`BookStorage`] backend
///
/// Cloning is cheap: every clone shares the same storage handle.
#[derive(Clone)]
pub struct BookRepository {
    storage: Arc<dyn BookStorage>,
}

impl BookRepository {
    pub fn new(storage: Arc<dyn BookStorage>) -> Self {
        Self { storage }
    }

    /// Repository backed by a fresh [`InMemoryStorage`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStorage::new()))
    }

    pub fn backend_name(&self) -> &'static str {
        self.storage.backend_name()
    }

    /// All books in store order; empty when there are none
    pub async fn list(&self) -> Result<Vec<Book>> {
        let documents = self.storage.list_books().await?;
        debug!("Listing {} books", documents.len());
        Ok(documents.into_iter().map(Book::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> BookOutcome {
        let id = match BookId::parse(id) {
            Ok(id) => id,
            Err(error) => return BookOutcome::Failed(error),
        };

        self.storage
            .find_book(&id)
            .await
            .map(|found| found.map(Book::from))
            .into()
    }

    /// Persist a new book; each call creates a distinct record
    pub async fn create(&self, draft: BookDraft) -> Result<Book> {
        let document = self.storage.insert_book(draft).await?;
        info!("Created book {} ({})", document.id, document.title);
        Ok(document.into())
    }

    /// Replace title, author and year of an existing book
    pub async fn update(&self, id: &str, draft: BookDraft) -> BookOutcome {
        let id = match BookId::parse(id) {
            Ok(id) => id,
            Err(error) => return BookOutcome::Failed(error),
        };

        let outcome: BookOutcome = self
            .storage
            .update_book(&id, draft)
            .await
            .map(|updated| updated.map(Book::from))
            .into();

        if outcome.is_found() {
            info!("Updated book {}", id);
        }
        outcome
    }

    /// Hard-delete a book, returning its last-known values
    pub async fn delete(&self, id: &str) -> BookOutcome {
        let id = match BookId::parse(id) {
            Ok(id) => id,
            Err(error) => return BookOutcome::Failed(error),
        };

        let outcome: BookOutcome = self
            .storage
            .delete_book(&id)
            .await
            .map(|removed| removed.map(Book::from))
            .into();

        if outcome.is_found() {
            info!("Deleted book {}", id);
        }
        outcome
    }

    /// Remove every book from the store
    pub async fn purge(&self) -> Result<usize> {
        let removed = self.storage.purge_books().await?;
        info!("Purged {} books from {} storage", removed, self.backend_name());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> BookDraft {
        BookDraft::new("Dune", "Herbert", 1965).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_fields() {
        let repository = BookRepository::in_memory();
        let samples = [
            ("Dune", "Herbert", 1965),
            ("The Left Hand of Darkness", "Le Guin", 1969),
            ("Kindred", "Butler", 1979),
            ("Ancient Text", "Unknown", -300),
        ];

        for (title, author, year) in samples {
            let created = repository
                .create(BookDraft::new(title, author, year).unwrap())
                .await
                .unwrap();

            let fetched = repository.get_by_id(&created.id).await.found().unwrap();
            assert_eq!(fetched, created);
            assert_eq!(fetched.title, title);
            assert_eq!(fetched.author, author);
            assert_eq!(fetched.year, year);
        }
    }

    #[tokio::test]
    async fn test_create_is_not_idempotent() {
        let repository = BookRepository::in_memory();
        let first = repository.create(dune()).await.unwrap();
        let second = repository.create(dune()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(repository.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_absent_ids_yield_not_found() {
        let repository = BookRepository::in_memory();
        repository.create(dune()).await.unwrap();

        for _ in 0..5 {
            let absent = BookId::generate().to_string();
            assert!(repository.get_by_id(&absent).await.is_not_found());
            assert!(repository.delete(&absent).await.is_not_found());
        }
    }

    #[tokio::test]
    async fn test_update_missing_book_changes_nothing() {
        let repository = BookRepository::in_memory();
        let existing = repository.create(dune()).await.unwrap();

        let absent = BookId::generate().to_string();
        let outcome = repository
            .update(&absent, BookDraft::new("Ghost", "Nobody", 2000).unwrap())
            .await;

        assert!(outcome.is_not_found());
        assert_eq!(repository.list().await.unwrap(), vec![existing]);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let repository = BookRepository::in_memory();
        let created = repository.create(dune()).await.unwrap();

        let updated = repository
            .update(&created.id, BookDraft::new("Dune Messiah", "Frank Herbert", 1969).unwrap())
            .await
            .found()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.author, "Frank Herbert");
        assert_eq!(updated.year, 1969);
        assert_eq!(repository.get_by_id(&created.id).await.found(), Some(updated));
    }

    #[tokio::test]
    async fn test_delete_then_get_yields_not_found() {
        let repository = BookRepository::in_memory();
        let created = repository.create(dune()).await.unwrap();

        let removed = repository.delete(&created.id).await.found().unwrap();
        assert_eq!(removed, created);

        assert!(repository.get_by_id(&created.id).await.is_not_found());
        // retrying the delete is not an error
        assert!(repository.delete(&created.id).await.is_not_found());
    }

    #[tokio::test]
    async fn test_list_counts_after_creates_and_deletes() {
        for (created, deleted) in [(0, 0), (3, 0), (5, 2), (4, 4)] {
            let repository = BookRepository::in_memory();
            let mut ids = Vec::new();
            for year in 0..created {
                let book = repository
                    .create(BookDraft::new("Title", "Author", 2000 + year).unwrap())
                    .await
                    .unwrap();
                ids.push(book.id);
            }
            for id in ids.iter().take(deleted) {
                assert!(repository.delete(id).await.is_found());
            }

            let listed = repository.list().await.unwrap();
            assert_eq!(listed.len(), (created as usize) - deleted);
        }
    }

    #[tokio::test]
    async fn test_malformed_id_fails() {
        let repository = BookRepository::in_memory();

        for outcome in [
            repository.get_by_id("not-a-book-id").await,
            repository.update("not-a-book-id", dune()).await,
            repository.delete("not-a-book-id").await,
        ] {
            match outcome {
                BookOutcome::Failed(BookCatalogError::InvalidId(raw)) => {
                    assert_eq!(raw, "not-a-book-id")
                }
                other => panic!("expected InvalidId failure, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_outcome_conversions() {
        let book = Book {
            id: BookId::generate().to_string(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            year: 1965,
        };

        let found = BookOutcome::from(Ok(Some(book.clone())));
        assert_eq!(found.into_result().unwrap(), Some(book));

        let missing = BookOutcome::from(Ok(None));
        assert!(missing.is_not_found());

        let failed = BookOutcome::from(Err(BookCatalogError::Storage(anyhow::anyhow!("down"))));
        assert!(failed.into_result().is_err());
    }

    #[tokio::test]
    async fn test_purge() {
        let repository = BookRepository::in_memory();
        repository.create(dune()).await.unwrap();
        repository.create(dune()).await.unwrap();

        assert_eq!(repository.purge().await.unwrap(), 2);
        assert!(repository.list().await.unwrap().is_empty());
        assert_eq!(repository.backend_name(), "memory");
    }
}

// Book Catalog - Rust Edition
// A small book catalog served over REST and GraphQL from one shared facade

//! # Book Catalog Library
//!
//! This is the library crate behind the `server` and `admin` binaries. It
//! exposes one entity, the [`Book`], through two protocol adapters that sit
//! on top of a single repository facade.
//!
//! ## Core Components
//!
//! ### Domain Models
//! - [`Book`]: The public shape returned to every client (`id`, `title`, `author`, `year`)
//! - [`BookDraft`]: A validated `(title, author, year)` triple used by all write paths
//! - [`BookDocument`]: The store-native document, identified by `_id`
//! - [`BookId`]: Store-assigned identifier, immutable once created
//!
//! ### Repository Facade
//!
//! [`BookRepository`] is the only component that talks to a [`BookStorage`]
//! backend. Lookups by id return a [`BookOutcome`], which both the REST
//! handlers and the GraphQL resolvers consume the same way:
//!
//! ```rust
//! use book_catalog::{BookDraft, BookOutcome, BookRepository};
//!
//! # tokio_test::block_on(async {
//! let repository = BookRepository::in_memory();
//! let draft = BookDraft::new("Dune", "Herbert", 1965).unwrap();
//! let created = repository.create(draft).await.unwrap();
//!
//! match repository.get_by_id(created.id.as_str()).await {
//!     BookOutcome::Found(book) => assert_eq!(book.title, "Dune"),
//!     BookOutcome::NotFound => unreachable!(),
//!     BookOutcome::Failed(error) => panic!("{}", error),
//! }
//! # });
//! ```
//!
//! ### Storage Layer
//! - [`InMemoryStorage`]: Default backend for development and tests
//! - [`NatsBookStorage`]: NATS JetStream key-value bucket used as a document store
//!
//! ### Protocol Adapters
//! - REST handlers in [`api`], mounted at `/books`
//! - GraphQL schema in [`engine::graphql`], served at `/graphql`
//!
//! ## Rust Learning Notes:
//!
//! ### Re-exports
//! `pub use` statements create shortcuts so users don't need to know the internal
//! module structure. Instead of `use book_catalog::models::book::Book`,
//! users can write `use book_catalog::Book`.

// Core domain models
pub mod models;

// Storage backends, repository facade and GraphQL schema
pub mod engine;

// REST handlers for the `/books` resource
pub mod api;

// HTTP server composing the REST router and the GraphQL endpoint
pub mod server;

// Layered configuration (defaults, file, environment)
pub mod settings;

// Re-export core domain types for easy access
pub use models::{Book, BookDocument, BookDraft, BookId};

// Re-export engine types for convenience
pub use engine::{
    graphql::{create_schema, BookCatalogSchema, BookGQL, BookInput},
    nats_storage::{NatsBookStorage, NatsStorageConfig},
    open_storage,
    repository::{BookOutcome, BookRepository},
    storage::{BookStorage, InMemoryStorage},
};

// Re-export server types for convenience
pub use server::{CatalogServer, CatalogServerBuilder, CatalogServerConfig};

pub use settings::{CatalogConfig, StorageBackend, StorageConfig};

use thiserror::Error;

/// Error types for Book Catalog operations
///
/// A missing book is not an error here; it travels as
/// [`BookOutcome::NotFound`].
///
/// ## Rust Learning Notes:
///
/// ### The `thiserror` Crate
/// - `#[derive(Error)]` implements the `std::error::Error` trait
/// - `#[error("...")]` provides human-readable error messages
/// - `#[from]` enables automatic conversion from other error types
#[derive(Error, Debug)]
pub enum BookCatalogError {
    /// A required field is missing, empty or of the wrong type
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The store cannot address this identifier
    ///
    /// Reported like any other store-level failure (`STORE_ERROR`); only
    /// the text differs, since it echoes the caller's own input.
    #[error("Invalid book id: {0}")]
    InvalidId(String),

    /// The book store is unreachable or rejected the operation
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Startup configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP listener failed to bind or serve
    #[error("Server error: {0}")]
    Server(String),
}

impl From<config::ConfigError> for BookCatalogError {
    fn from(err: config::ConfigError) -> Self {
        BookCatalogError::Config(err.to_string())
    }
}

impl From<std::io::Error> for BookCatalogError {
    fn from(err: std::io::Error) -> Self {
        BookCatalogError::Storage(anyhow::Error::new(err))
    }
}

/// Stable, enumerated error codes handed to clients
///
/// The human-readable text of store failures never leaves the process;
/// clients get one of these codes instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    StoreError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::StoreError => "STORE_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message used for every store-level failure shown to a client
pub const STORE_ERROR_MESSAGE: &str = "Book store error";

/// Message used for every "not found" response
pub const NOT_FOUND_MESSAGE: &str = "Book not found";

impl BookCatalogError {
    /// The stable code clients can match on
    pub fn code(&self) -> ErrorCode {
        match self {
            BookCatalogError::Validation(_) => ErrorCode::ValidationError,
            BookCatalogError::InvalidId(_)
            | BookCatalogError::Storage(_)
            | BookCatalogError::Serialization(_)
            | BookCatalogError::Config(_)
            | BookCatalogError::Server(_) => ErrorCode::StoreError,
        }
    }

    /// Text that is safe to show to clients
    ///
    /// Validation and id errors describe the caller's own input, so they are
    /// returned as-is. Anything coming from the store is replaced by
    /// [`STORE_ERROR_MESSAGE`].
    pub fn public_message(&self) -> String {
        match self {
            BookCatalogError::Validation(_) | BookCatalogError::InvalidId(_) => self.to_string(),
            _ => STORE_ERROR_MESSAGE.to_string(),
        }
    }

    /// Whether the caller's input, rather than the store, caused the failure
    ///
    /// Decides the log level only; the response status follows [`Self::code`].
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BookCatalogError::Validation(_) | BookCatalogError::InvalidId(_)
        )
    }
}

/// Type alias for Results that use our custom error type
pub type Result<T> = std::result::Result<T, BookCatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let validation = BookCatalogError::Validation("year is required".to_string());
        let invalid_id = BookCatalogError::InvalidId("abc".to_string());
        let storage = BookCatalogError::Storage(anyhow::anyhow!("connection refused"));

        assert_eq!(validation.code(), ErrorCode::ValidationError);
        assert_eq!(invalid_id.code(), ErrorCode::StoreError);
        assert_eq!(invalid_id.public_message(), "Invalid book id: abc");
        assert_eq!(storage.code(), ErrorCode::StoreError);
        assert_eq!(storage.code().to_string(), "STORE_ERROR");
        assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
    }

    #[test]
    fn test_public_message_hides_store_details() {
        let storage = BookCatalogError::Storage(anyhow::anyhow!("nats: connection refused on 10.0.0.7"));
        assert_eq!(storage.public_message(), STORE_ERROR_MESSAGE);
        assert!(!storage.is_client_error());

        let validation = BookCatalogError::Validation("year is required".to_string());
        assert_eq!(validation.public_message(), "Validation failed: year is required");
        assert!(validation.is_client_error());
    }

    #[test]
    fn test_config_error_conversion() {
        let err: BookCatalogError = config::ConfigError::Message("bad port".to_string()).into();
        assert!(matches!(err, BookCatalogError::Config(_)));
        assert_eq!(err.public_message(), STORE_ERROR_MESSAGE);
    }
}

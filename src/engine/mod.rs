// Book Catalog Engine
// Storage backends, the repository facade and the GraphQL schema

//! # Book Catalog Engine Module
//!
//! This module sits between the domain models and the protocol layers.
//!
//! ## Engine Components
//!
//! ### Storage (`storage`, `nats_storage` modules)
//! - [`BookStorage`] trait: the five primitive document operations
//! - [`InMemoryStorage`]: development/testing backend
//! - [`NatsBookStorage`]: NATS JetStream key-value backend
//!
//! ### Repository Facade (`repository` module)
//! - [`BookRepository`]: the only consumer of [`BookStorage`]
//! - Converts store documents into public `Book`s
//! - Returns [`BookOutcome`] for id-addressed operations
//!
//! ### GraphQL Engine (`graphql` module)
//! - Schema and resolvers for the `Book` type
//! - Resolvers delegate to the repository facade
//!
//! ## Rust Learning Notes:
//!
//! ### Trait Objects
//! The backend is chosen at startup from configuration, so the facade holds
//! it as `Arc<dyn BookStorage>` rather than as a generic parameter.

pub mod graphql;
pub mod nats_storage;
pub mod repository;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

pub use nats_storage::{NatsBookStorage, NatsStorageConfig};
pub use repository::{BookOutcome, BookRepository};
pub use storage::{BookStorage, InMemoryStorage};

use crate::settings::{StorageBackend, StorageConfig};
use crate::Result;

/// Open the storage backend named by the configuration
///
/// Called once at startup; the returned handle is shared by every request.
pub async fn open_storage(config: &StorageConfig) -> Result<Arc<dyn BookStorage>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("📋 Using in-memory book storage");
            Ok(Arc::new(InMemoryStorage::new()))
        }
        StorageBackend::Nats => {
            info!("📡 Using NATS book storage at {}", config.nats_url);
            let nats_config = NatsStorageConfig {
                url: config.nats_url.clone(),
                bucket: config.bucket.clone(),
                connection_timeout: Duration::from_secs(config.connection_timeout_secs),
                ..Default::default()
            };
            Ok(Arc::new(NatsBookStorage::new(nats_config).await?))
        }
    }
}

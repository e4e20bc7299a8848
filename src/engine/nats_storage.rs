// NATS storage implementation for the book catalog
// Books are kept as JSON documents in a NATS JetStream key-value bucket

//! # NATS Storage Implementation
//!
//! This module provides a NATS JetStream-based implementation of the
//! [`BookStorage`] trait. The key-value bucket plays the role of the document
//! collection:
//!
//! - **Key**: the book id (`BookId`, hyphenated UUID)
//! - **Value**: the JSON-encoded [`BookDocument`]
//!
//! Deletes purge the key, so a deleted book leaves no history behind and a
//! later read of the same key finds nothing.

use std::time::Duration;

use async_nats::jetstream::{self, kv};
use async_nats::Client;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::storage::BookStorage;
use crate::models::{BookDocument, BookDraft, BookId};
use crate::{BookCatalogError, Result};

// Revision-checked writes retried this many times under contention
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Configuration for NATS storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsStorageConfig {
    /// NATS server URL
    pub url: String,

    /// Key-value bucket holding the book documents
    pub bucket: String,

    pub connection_timeout: Duration,
    pub client_name: Option<String>,
    pub replicas: usize,
}

impl Default for NatsStorageConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            bucket: "books".to_string(),
            connection_timeout: Duration::from_secs(10),
            client_name: Some("book-catalog".to_string()),
            replicas: 1, // Single replica for development
        }
    }
}

/// NATS JetStream key-value storage for books
pub struct NatsBookStorage {
    // Kept so the connection lives as long as the storage handle
    _client: Client,
    books: kv::Store,
    config: NatsStorageConfig,
}

impl NatsBookStorage {
    /// Connect to NATS and open (or create) the books bucket
    pub async fn new(config: NatsStorageConfig) -> Result<Self> {
        info!("Connecting to NATS server at {}", config.url);

        let mut options = async_nats::ConnectOptions::new()
            .connection_timeout(config.connection_timeout);
        if let Some(name) = &config.client_name {
            options = options.name(name);
        }

        let client = options
            .connect(&config.url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to NATS: {}", e))?;

        let js = jetstream::new(client.clone());
        let books = Self::ensure_kv_bucket(&js, &config).await?;

        info!("NATS book storage ready (bucket '{}')", config.bucket);
        Ok(Self {
            _client: client,
            books,
            config,
        })
    }

    /// Create with default configuration
    pub async fn with_default_config() -> Result<Self> {
        Self::new(NatsStorageConfig::default()).await
    }

    pub fn config(&self) -> &NatsStorageConfig {
        &self.config
    }

    async fn ensure_kv_bucket(
        js: &jetstream::Context,
        config: &NatsStorageConfig,
    ) -> Result<kv::Store> {
        match js.get_key_value(&config.bucket).await {
            Ok(store) => {
                debug!("Using existing KV bucket: {}", config.bucket);
                Ok(store)
            }
            Err(_) => {
                info!("Creating new KV bucket: {}", config.bucket);
                let kv_config = kv::Config {
                    bucket: config.bucket.clone(),
                    history: 1,
                    storage: jetstream::stream::StorageType::File,
                    num_replicas: config.replicas,
                    description: "Book Catalog documents".to_string(),
                    ..Default::default()
                };

                js.create_key_value(kv_config).await.map_err(|e| {
                    BookCatalogError::Storage(anyhow::anyhow!(
                        "Failed to create KV bucket {}: {}",
                        config.bucket,
                        e
                    ))
                })
            }
        }
    }

    fn key(id: &BookId) -> String {
        id.to_string()
    }

    fn encode(document: &BookDocument) -> Result<bytes::Bytes> {
        Ok(serde_json::to_vec(document)?.into())
    }

    fn decode(raw: &[u8]) -> Result<BookDocument> {
        Ok(serde_json::from_slice(raw)?)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let keys = self
            .books
            .keys()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list KV keys: {}", e))?;

        let keys: Vec<String> = keys
            .try_collect()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read KV keys: {}", e))?;
        Ok(keys)
    }

    /// The current entry for `key`, or `None` once it has been deleted
    async fn live_entry(&self, key: &str) -> Result<Option<kv::Entry>> {
        let entry = self
            .books
            .entry(key)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get book {}: {}", key, e))?;

        Ok(entry.filter(|entry| entry.operation == kv::Operation::Put))
    }

    /// After a failed revision-checked write: `Ok` when the key moved on
    /// (another writer got there first), the original error otherwise
    async fn check_conflict<E: std::fmt::Display>(
        &self,
        key: &str,
        revision: u64,
        operation: &str,
        error: E,
    ) -> Result<()> {
        let current = self.books.entry(key).await.ok().flatten();
        match current {
            Some(entry) if entry.revision == revision => Err(BookCatalogError::Storage(
                anyhow::anyhow!("Failed to {} book {}: {}", operation, key, error),
            )),
            _ => Ok(()),
        }
    }

    fn contended(key: &str, operation: &str) -> BookCatalogError {
        BookCatalogError::Storage(anyhow::anyhow!(
            "Gave up on {} of book {} after {} concurrent changes",
            operation,
            key,
            MAX_WRITE_ATTEMPTS
        ))
    }
}

#[async_trait::async_trait]
impl BookStorage for NatsBookStorage {
    async fn insert_book(&self, draft: BookDraft) -> Result<BookDocument> {
        let document = BookDocument::new(draft);
        let key = Self::key(&document.id);

        // `create` refuses to overwrite an existing key
        self.books
            .create(&key, Self::encode(&document)?)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to insert book {}: {}", key, e))?;

        debug!("Stored book {} in bucket {}", key, self.config.bucket);
        Ok(document)
    }

    async fn find_book(&self, id: &BookId) -> Result<Option<BookDocument>> {
        match self.live_entry(&Self::key(id)).await? {
            Some(entry) => Ok(Some(Self::decode(&entry.value)?)),
            None => Ok(None),
        }
    }

    async fn list_books(&self) -> Result<Vec<BookDocument>> {
        let mut documents = Vec::new();

        for key in self.keys().await? {
            let raw = self
                .books
                .get(&key)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to get book {}: {}", key, e))?;

            match raw.map(|raw| Self::decode(&raw)) {
                Some(Ok(document)) => documents.push(document),
                Some(Err(e)) => warn!("Skipping undecodable book document {}: {}", key, e),
                // deleted between listing keys and reading them
                None => continue,
            }
        }

        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        debug!("Listed {} books", documents.len());
        Ok(documents)
    }

    async fn update_book(&self, id: &BookId, draft: BookDraft) -> Result<Option<BookDocument>> {
        let key = Self::key(id);

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let entry = match self.live_entry(&key).await? {
                Some(entry) => entry,
                None => return Ok(None),
            };

            let mut document = Self::decode(&entry.value)?;
            document.apply(draft.clone());

            // only lands if nobody wrote or deleted the key since we read it
            match self
                .books
                .update(&key, Self::encode(&document)?, entry.revision)
                .await
            {
                Ok(_) => return Ok(Some(document)),
                Err(e) => {
                    self.check_conflict(&key, entry.revision, "update", e).await?;
                    debug!("Book {} changed during update (attempt {})", key, attempt);
                }
            }
        }

        Err(Self::contended(&key, "update"))
    }

    async fn delete_book(&self, id: &BookId) -> Result<Option<BookDocument>> {
        let key = Self::key(id);

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let entry = match self.live_entry(&key).await? {
                Some(entry) => entry,
                None => return Ok(None),
            };
            let document = Self::decode(&entry.value)?;

            match self
                .books
                .purge_expect_revision(&key, Some(entry.revision))
                .await
            {
                Ok(()) => return Ok(Some(document)),
                Err(e) => {
                    self.check_conflict(&key, entry.revision, "delete", e).await?;
                    debug!("Book {} changed during delete (attempt {})", key, attempt);
                }
            }
        }

        Err(Self::contended(&key, "delete"))
    }

    async fn purge_books(&self) -> Result<usize> {
        let keys = self.keys().await?;
        for key in &keys {
            self.books
                .purge(key)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to purge book {}: {}", key, e))?;
        }
        info!("Purged {} books from bucket {}", keys.len(), self.config.bucket);
        Ok(keys.len())
    }

    fn backend_name(&self) -> &'static str {
        "nats"
    }
}

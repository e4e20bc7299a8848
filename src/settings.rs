// Layered configuration for the book catalog
// Defaults, then an optional config file, then BOOK_CATALOG_* environment variables

//! # Configuration
//!
//! [`CatalogConfig`] is assembled with the `config` crate in three layers,
//! later layers overriding earlier ones:
//!
//! 1. Built-in defaults ([`CatalogConfig::default`])
//! 2. An optional file (TOML, YAML or JSON, chosen by extension)
//! 3. Environment variables prefixed with `BOOK_CATALOG_`; nested keys use
//!    a double underscore, e.g. `BOOK_CATALOG_STORAGE__BACKEND=nats`
//!
//! The binaries apply their command-line flags on top of the result.

use serde::{Deserialize, Serialize};

use crate::Result;

const ENV_PREFIX: &str = "BOOK_CATALOG";

/// Which book store backend to open at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Nats,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "nats" => Ok(StorageBackend::Nats),
            other => Err(format!("unknown storage backend '{}' (expected memory or nats)", other)),
        }
    }
}

/// Book store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub nats_url: String,
    pub bucket: String,
    pub connection_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            nats_url: "nats://localhost:4222".to_string(),
            bucket: "books".to_string(),
            connection_timeout_secs: 10,
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
    /// Path prefix for the REST router; empty mounts it at the root
    pub rest_prefix: String,
    /// Fallback log filter when `RUST_LOG` is not set
    pub log_level: String,
    pub storage: StorageConfig,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_enabled: true,
            rest_prefix: String::new(),
            log_level: "info".to_string(),
            storage: StorageConfig::default(),
        }
    }
}

impl CatalogConfig {
    /// Load defaults, the optional file at `path` and the environment
    ///
    /// `~` in `path` is expanded to the home directory. A path that is given
    /// but does not exist is an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Self::defaults_builder()?;

        if let Some(path) = path {
            let expanded = shellexpand::tilde(path);
            builder = builder.add_source(config::File::with_name(expanded.as_ref()).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse a TOML document layered over the defaults (no environment)
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = Self::defaults_builder()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    fn defaults_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder().add_source(config::Config::try_from(&CatalogConfig::default())?))
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The REST prefix normalized to `/segment` form, or `None` for the root
    pub fn normalized_rest_prefix(&self) -> Option<String> {
        normalize_prefix(&self.rest_prefix)
    }
}

pub(crate) fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}

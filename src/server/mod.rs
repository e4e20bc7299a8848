// Book Catalog Server
// Exposes the repository facade over HTTP

//! # Book Catalog Server Module
//!
//! The server layer sits on top of the engine layer and serves both protocol
//! adapters from a single listener:
//! ```text
//! Client
//!        ↓ HTTP (REST /books, POST /graphql)
//! Server Layer (this module) ← routing, CORS, tracing, graceful shutdown
//!        ↓ Function calls
//! BookRepository ← the only component that talks to storage
//!        ↓
//! BookStorage (memory or NATS)
//! ```
//!
//! ## Endpoints
//! - `/books`, `/books/:id`: REST resource, optionally under a path prefix
//! - `POST /graphql`: GraphQL endpoint
//! - `GET /graphql`, `GET /playground`: GraphiQL explorer
//! - `GET /health`: liveness probe
//!
//! ## Rust Learning Notes:
//!
//! Both routers carry their own state (`BookRepository` for REST, the schema
//! for GraphQL), so after `with_state` they are plain `Router`s that merge
//! without their state types having to agree.

pub mod http;

pub use http::{CatalogServer, CatalogServerBuilder, CatalogServerConfig};

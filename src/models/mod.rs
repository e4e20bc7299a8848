// Core domain models for the Book Catalog

//! # Domain Models Module
//!
//! The catalog has a single entity, the book. See [`book`] for the three
//! shapes it takes on its way between a client and the store.
//!
//! ## Rust Learning Notes:
//!
//! ### Re-exports for Clean APIs
//! The `pub use` statement at the bottom creates a flat API.
//! Users can import `use book_catalog::models::Book` instead of
//! `use book_catalog::models::book::Book`.

// Contains Book, BookDraft, BookDocument and BookId
pub mod book;

pub use book::{Book, BookDocument, BookDraft, BookId};

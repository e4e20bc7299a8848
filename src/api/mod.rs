// REST API module
// This module exposes the book catalog as a JSON resource at /books

pub mod handlers;
pub mod types;

use axum::{routing::get, Router};

use crate::engine::repository::BookRepository;
use handlers::{create_book, delete_book, get_book, list_books, update_book};

/// Build the REST router for the `/books` resource
///
/// The returned router already carries its state, so it can be merged or
/// nested into any other router.
pub fn create_router(repository: BookRepository) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(repository)
}

#[cfg(test)]
mod handlers_tests;

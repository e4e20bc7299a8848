// REST handlers for the /books resource
// Each handler is a thin adapter over one repository operation

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::debug;

use super::types::{ApiError, BookPayload};
use crate::engine::repository::{BookOutcome, BookRepository};
use crate::models::Book;
use crate::BookCatalogError;

fn respond(outcome: BookOutcome) -> Result<Json<Book>, ApiError> {
    match outcome {
        BookOutcome::Found(book) => Ok(Json(book)),
        BookOutcome::NotFound => Err(ApiError::not_found()),
        BookOutcome::Failed(err) => Err(err.into()),
    }
}

/// List all books - GET /books
pub async fn list_books(
    State(repository): State<BookRepository>,
) -> Result<Json<Vec<Book>>, ApiError> {
    debug!("GET /books");
    Ok(Json(repository.list().await?))
}

/// Get one book - GET /books/:id
pub async fn get_book(
    State(repository): State<BookRepository>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    debug!("GET /books/{}", id);
    respond(repository.get_by_id(&id).await)
}

/// Create a book - POST /books
pub async fn create_book(
    State(repository): State<BookRepository>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let draft = payload.into_draft()?;
    debug!("POST /books ({})", draft.title());

    let book = repository.create(draft).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book's fields - PUT /books/:id
pub async fn update_book(
    State(repository): State<BookRepository>,
    Path(id): Path<String>,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Book>, ApiError> {
    let Json(payload) = payload?;
    let draft = payload.into_draft()?;
    debug!("PUT /books/{}", id);

    match repository.update(&id, draft).await {
        BookOutcome::Failed(err @ BookCatalogError::InvalidId(_)) => Err(ApiError::rejected_write(err)),
        outcome => respond(outcome),
    }
}

/// Delete a book - DELETE /books/:id
pub async fn delete_book(
    State(repository): State<BookRepository>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    debug!("DELETE /books/{}", id);
    respond(repository.delete(&id).await)
}

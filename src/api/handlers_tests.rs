// Integration tests for the /books REST handlers
use crate::{
    api::{create_router, types::ErrorResponse},
    engine::{storage::UnavailableStorage, BookRepository},
    models::{BookDraft, BookId},
    Book,
};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use hyper::body::to_bytes;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// Test helpers
fn create_test_app() -> (Router, BookRepository) {
    let repository = BookRepository::in_memory();
    (create_router(repository.clone()), repository)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// Extract JSON body from response
async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seed(repository: &BookRepository, title: &str, author: &str, year: i32) -> Book {
    repository
        .create(BookDraft::new(title, author, year).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_book_returns_201_with_generated_id() {
    let (app, repository) = create_test_app();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/books",
            json!({"title": "Dune", "author": "Herbert", "year": 1965}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let id = body["id"].as_str().unwrap().to_string();
    assert!(BookId::parse(&id).is_ok());
    assert_eq!(
        body,
        json!({"id": id, "title": "Dune", "author": "Herbert", "year": 1965})
    );
    assert!(repository.get_by_id(&id).await.is_found());
}

#[tokio::test]
async fn test_create_book_missing_year_returns_400() {
    let (app, repository) = create_test_app();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/books",
            json!({"title": "Dune", "author": "Herbert"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Validation failed: year is required"})
    );
    assert!(repository.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_book_rejects_malformed_bodies() {
    let (app, _) = create_test_app();

    let not_json = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{title: Dune"))
        .unwrap();
    let wrong_type = json_request(
        Method::POST,
        "/books",
        json!({"title": ["Dune"], "author": "Herbert", "year": 1965}),
    );
    let blank_author = json_request(
        Method::POST,
        "/books",
        json!({"title": "Dune", "author": "", "year": 1965}),
    );

    for request in [not_json, wrong_type, blank_author] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = serde_json::from_value(json_body(response).await).unwrap();
        assert!(body.error.starts_with("Validation failed"), "{}", body.error);
    }
}

#[tokio::test]
async fn test_create_book_accepts_numeric_string_year() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/books",
            json!({"title": "Dune", "author": "Herbert", "year": "1965"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await["year"], 1965);
}

#[tokio::test]
async fn test_list_books() {
    let (app, repository) = create_test_app();

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/books"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));

    let dune = seed(&repository, "Dune", "Herbert", 1965).await;
    let kindred = seed(&repository, "Kindred", "Butler", 1979).await;

    let response = app.oneshot(empty_request(Method::GET, "/books")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let books: Vec<Book> = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(books, vec![dune, kindred]);
}

#[tokio::test]
async fn test_get_book() {
    let (app, repository) = create_test_app();
    let dune = seed(&repository, "Dune", "Herbert", 1965).await;

    let response = app
        .oneshot(empty_request(Method::GET, &format!("/books/{}", dune.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let book: Book = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(book, dune);
}

#[tokio::test]
async fn test_get_unknown_book_returns_404() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/books/{}", BookId::generate()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"error": "Book not found"}));
}

#[tokio::test]
async fn test_malformed_id_is_a_store_failure_on_read_and_delete() {
    let (app, _) = create_test_app();

    for method in [Method::GET, Method::DELETE] {
        let response = app
            .clone()
            .oneshot(empty_request(method.clone(), "/books/bogus-id"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", method);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Invalid book id: bogus-id"})
        );
    }
}

#[tokio::test]
async fn test_malformed_id_on_update_returns_400() {
    let (app, repository) = create_test_app();
    seed(&repository, "Dune", "Herbert", 1965).await;

    let response = app
        .oneshot(json_request(
            Method::PUT,
            "/books/bogus-id",
            json!({"title": "Ghost", "author": "Nobody", "year": 2000}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Invalid book id: bogus-id"})
    );
    assert_eq!(repository.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_book() {
    let (app, repository) = create_test_app();
    let dune = seed(&repository, "Dune", "Herbert", 1965).await;

    let response = app
        .oneshot(json_request(
            Method::PUT,
            &format!("/books/{}", dune.id),
            json!({"title": "Dune Messiah", "author": "Frank Herbert", "year": 1969}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"id": dune.id, "title": "Dune Messiah", "author": "Frank Herbert", "year": 1969})
    );
}

#[tokio::test]
async fn test_update_unknown_book_returns_404_without_creating() {
    let (app, repository) = create_test_app();

    let response = app
        .oneshot(json_request(
            Method::PUT,
            &format!("/books/{}", BookId::generate()),
            json!({"title": "Ghost", "author": "Nobody", "year": 2000}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"error": "Book not found"}));
    assert!(repository.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_with_invalid_body_returns_400() {
    let (app, repository) = create_test_app();
    let dune = seed(&repository, "Dune", "Herbert", 1965).await;

    let response = app
        .oneshot(json_request(
            Method::PUT,
            &format!("/books/{}", dune.id),
            json!({"title": "Dune"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Validation failed: author is required; year is required"})
    );
    assert_eq!(repository.get_by_id(&dune.id).await.found(), Some(dune));
}

#[tokio::test]
async fn test_delete_book_then_get_returns_404() {
    let (app, repository) = create_test_app();
    let dune = seed(&repository, "Dune", "Herbert", 1965).await;
    let uri = format!("/books/{}", dune.id);

    let response = app
        .clone()
        .oneshot(empty_request(Method::DELETE, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let removed: Book = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(removed, dune);

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(empty_request(Method::DELETE, &uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({"error": "Book not found"}));
}

#[tokio::test]
async fn test_store_failures_return_500_without_leaking_detail() {
    let app = create_router(BookRepository::new(Arc::new(UnavailableStorage)));
    let id = BookId::generate();
    let body = json!({"title": "Dune", "author": "Herbert", "year": 1965});

    let requests = vec![
        empty_request(Method::GET, "/books"),
        empty_request(Method::GET, &format!("/books/{}", id)),
        json_request(Method::POST, "/books", body.clone()),
        json_request(Method::PUT, &format!("/books/{}", id), body),
        empty_request(Method::DELETE, &format!("/books/{}", id)),
    ];

    for request in requests {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body, json!({"error": "Book store error"}));
        assert!(!body.to_string().contains(UnavailableStorage::DETAIL));
    }
}

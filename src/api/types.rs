// REST request and response types for the /books resource

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};

use crate::models::BookDraft;
use crate::{BookCatalogError, ErrorCode, NOT_FOUND_MESSAGE};

/// Body of `POST /books` and `PUT /books/:id`
///
/// Every field is optional at the JSON level so that a missing field turns
/// into a validation message instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPayload {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<Value>,
}

impl BookPayload {
    /// Validate the payload into a [`BookDraft`]
    ///
    /// `year` accepts a JSON integer or a string holding one (`"1965"`).
    pub fn into_draft(self) -> crate::Result<BookDraft> {
        let year = match self.year {
            None | Some(Value::Null) => Ok(None),
            Some(value) => parse_year(&value)
                .map(Some)
                .ok_or_else(|| format!("year must be an integer, got {}", value)),
        };

        BookDraft::from_raw_parts(self.title, self.author, year)
    }
}

fn parse_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(number) => number.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// Single-field error envelope: `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A REST failure: status code plus the error envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
            },
        }
    }

    pub fn not_found() -> Self {
        Self::new(Self::status_for(ErrorCode::NotFound), NOT_FOUND_MESSAGE)
    }

    /// A write whose target id the store cannot address: 400, like any
    /// other rejected write body
    pub fn rejected_write(err: BookCatalogError) -> Self {
        warn!("Rejected write: {}", err);
        Self::new(StatusCode::BAD_REQUEST, err.public_message())
    }

    pub fn status_for(code: ErrorCode) -> StatusCode {
        match code {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::StoreError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BookCatalogError> for ApiError {
    fn from(err: BookCatalogError) -> Self {
        if err.is_client_error() {
            warn!("Rejected request: {}", err);
        } else {
            // full detail stays in the log
            error!("Book store failure: {:?}", err);
        }
        Self::new(Self::status_for(err.code()), err.public_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        Self::new(
            StatusCode::BAD_REQUEST,
            format!("Validation failed: {}", rejection.body_text()),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

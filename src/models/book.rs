// Book domain model
// The public Book shape, the validated draft used by writes, and the store-native document

//! # Book Model
//!
//! Three shapes of the same entity live here:
//!
//! - [`BookDraft`]: what a client submits. Constructing one validates it, so a
//!   draft in hand always has a non-empty title and author.
//! - [`BookDocument`]: what the store keeps. The identifier field is `_id`
//!   and the store tracks creation/update timestamps alongside the data.
//! - [`Book`]: what clients see. Exactly `id`, `title`, `author`, `year`.
//!
//! The repository facade is the only place that converts a document into a
//! [`Book`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::{BookCatalogError, Result};

/// **Book Identifier** - assigned by the store when a book is created
///
/// Serialized as the hyphenated UUID string. Once assigned it never changes
/// and it is never handed out again after the book is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub Uuid);

impl BookId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        BookId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse a client-supplied identifier
    ///
    /// ```rust
    /// # use book_catalog::BookId;
    /// assert!(BookId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").is_ok());
    /// assert!(BookId::parse("not-an-id").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        Uuid::parse_str(raw.trim())
            .map(BookId)
            .map_err(|_| BookCatalogError::InvalidId(raw.to_string()))
    }
}

impl FromStr for BookId {
    type Err = BookCatalogError;

    fn from_str(s: &str) -> Result<Self> {
        BookId::parse(s)
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// **Book** - the externally visible shape
///
/// Both the REST handlers and the GraphQL resolvers return exactly this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub year: i32,
}

/// **Book Draft** - a validated `(title, author, year)` triple
///
/// Creates and updates both go through a draft. Updates replace all three
/// fields at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    title: String,
    author: String,
    year: i32,
}

impl BookDraft {
    /// Build a draft, rejecting empty `title` or `author`
    ///
    /// Every problem is reported at once, separated by `; `.
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32) -> Result<Self> {
        Self::from_parts(Some(title.into()), Some(author.into()), Some(year))
    }

    /// Build a draft from optional parts, as received from a client
    pub fn from_parts(
        title: Option<String>,
        author: Option<String>,
        year: Option<i32>,
    ) -> Result<Self> {
        Self::from_raw_parts(title, author, Ok(year))
    }

    /// Like [`BookDraft::from_parts`], for a `year` that may already have
    /// failed to parse; that problem is reported alongside the others
    pub fn from_raw_parts(
        title: Option<String>,
        author: Option<String>,
        year: std::result::Result<Option<i32>, String>,
    ) -> Result<Self> {
        let mut problems = Vec::new();

        let title = required_text("title", title, &mut problems);
        let author = required_text("author", author, &mut problems);
        let year = match year {
            Ok(Some(year)) => Some(year),
            Ok(None) => {
                problems.push("year is required".to_string());
                None
            }
            Err(problem) => {
                problems.push(problem);
                None
            }
        };

        match (title, author, year) {
            (Some(title), Some(author), Some(year)) if problems.is_empty() => Ok(Self {
                title,
                author,
                year,
            }),
            _ => Err(BookCatalogError::Validation(problems.join("; "))),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

fn required_text(field: &str, value: Option<String>, problems: &mut Vec<String>) -> Option<String> {
    match value {
        None => {
            problems.push(format!("{} is required", field));
            None
        }
        Some(text) if text.trim().is_empty() => {
            problems.push(format!("{} must not be empty", field));
            None
        }
        Some(text) => Some(text),
    }
}

/// **Book Document** - the store-native record
///
/// The identifier is stored under `_id`. Timestamps are bookkeeping for the
/// store and never reach clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDocument {
    #[serde(rename = "_id")]
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookDocument {
    /// Create a new document with a freshly generated id
    pub fn new(draft: BookDraft) -> Self {
        Self::with_id(BookId::generate(), draft)
    }

    pub fn with_id(id: BookId, draft: BookDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: draft.title,
            author: draft.author,
            year: draft.year,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace all three data fields; `_id` and `created_at` are kept
    pub fn apply(&mut self, draft: BookDraft) {
        self.title = draft.title;
        self.author = draft.author;
        self.year = draft.year;
        self.updated_at = Utc::now();
    }
}

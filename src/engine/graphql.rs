// GraphQL API for the book catalog
// Two queries and three mutations, all delegating to the repository facade

use async_graphql::{
    Context, EmptySubscription, ErrorExtensions, InputObject, Object, Schema, SimpleObject, ID,
};
use tracing::{debug, error, warn};

use crate::engine::repository::{BookOutcome, BookRepository};
use crate::models::{Book, BookDraft};
use crate::BookCatalogError;

// GraphQL types - these are the API representations of our domain models

#[derive(SimpleObject, Debug, Clone, PartialEq)]
#[graphql(name = "Book")]
pub struct BookGQL {
    pub id: ID,
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl From<Book> for BookGQL {
    fn from(book: Book) -> Self {
        Self {
            id: ID(book.id),
            title: book.title,
            author: book.author,
            year: book.year,
        }
    }
}

/// Input for `createBook` and `updateBook`; all three fields are required
#[derive(InputObject, Debug)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub year: i32,
}

impl TryFrom<BookInput> for BookDraft {
    type Error = BookCatalogError;

    fn try_from(input: BookInput) -> crate::Result<Self> {
        BookDraft::new(input.title, input.author, input.year)
    }
}

/// Convert a catalog error into a GraphQL error with a stable `code` extension
///
/// Store failures are logged in full here and replaced by a generic message.
fn graphql_error(operation: &str, err: BookCatalogError) -> async_graphql::Error {
    if err.is_client_error() {
        warn!("{} rejected: {}", operation, err);
    } else {
        error!("{} failed: {:?}", operation, err);
    }

    let code = err.code();
    async_graphql::Error::new(err.public_message())
        .extend_with(|_, extensions| extensions.set("code", code.as_str().to_string()))
}

fn resolve(operation: &str, outcome: BookOutcome) -> async_graphql::Result<Option<BookGQL>> {
    match outcome {
        BookOutcome::Found(book) => Ok(Some(book.into())),
        BookOutcome::NotFound => {
            debug!("{}: book not found", operation);
            Ok(None)
        }
        BookOutcome::Failed(err) => Err(graphql_error(operation, err)),
    }
}

// GraphQL Query root
pub struct Query;

#[Object]
impl Query {
    /// List every book in the catalog
    async fn books(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Vec<Option<BookGQL>>>> {
        let repository = ctx.data::<BookRepository>()?;
        match repository.list().await {
            Ok(books) => Ok(Some(books.into_iter().map(|b| Some(b.into())).collect())),
            Err(e) => Err(graphql_error("books", e)),
        }
    }

    /// Get a book by ID; `null` when no such book exists
    async fn book(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<BookGQL>> {
        let repository = ctx.data::<BookRepository>()?;
        resolve("book", repository.get_by_id(&id).await)
    }
}

// GraphQL Mutation root
pub struct Mutation;

#[Object]
impl Mutation {
    /// Create a new book
    async fn create_book(
        &self,
        ctx: &Context<'_>,
        input: BookInput,
    ) -> async_graphql::Result<Option<BookGQL>> {
        let repository = ctx.data::<BookRepository>()?;
        let draft = BookDraft::try_from(input).map_err(|e| graphql_error("createBook", e))?;

        match repository.create(draft).await {
            Ok(book) => Ok(Some(book.into())),
            Err(e) => Err(graphql_error("createBook", e)),
        }
    }

    /// Replace title, author and year of an existing book
    async fn update_book(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: BookInput,
    ) -> async_graphql::Result<Option<BookGQL>> {
        let repository = ctx.data::<BookRepository>()?;
        let draft = BookDraft::try_from(input).map_err(|e| graphql_error("updateBook", e))?;
        resolve("updateBook", repository.update(&id, draft).await)
    }

    /// Delete a book, returning its last values
    async fn delete_book(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<BookGQL>> {
        let repository = ctx.data::<BookRepository>()?;
        resolve("deleteBook", repository.delete(&id).await)
    }
}

pub type BookCatalogSchema = Schema<Query, Mutation, EmptySubscription>;

/// Create the schema with the repository attached as context data
pub fn create_schema(repository: BookRepository) -> BookCatalogSchema {
    Schema::build(Query, Mutation, EmptySubscription)
        .data(repository)
        .finish()
}

//! HTTP handlers of the books module.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use booklib_http::{
    error::{AppError, BAD_REQUEST_MSG},
    extract::JsonBody,
};
use serde::Serialize;

use super::models::{Book, EmptyField, ListQuery, PartialBook};
use super::query::{MatchMode, PatchSet, Predicate};
use super::store::BookStore;

pub const HOMEPAGE_MSG: &str = "Welcome To Book Library!";
pub const ADD_SUCCESS_MSG: &str = "Data successfully added.";
pub const UPDATE_SUCCESS_MSG: &str = "Data successfully updated.";
pub const DELETE_SUCCESS_MSG: &str = "Data successfully deleted.";
pub const NO_DATA_UPDATE_MSG: &str = "no data update";
pub const NO_QUERY_DATA_MSG: &str =
    "no data to pass in query. All string fields were empty and/or book_id is 0";

/// Routes relative to the server base path
pub fn router(store: BookStore) -> Router {
    Router::new()
        .route("/", get(home))
        .route(
            "/books",
            get(list_books)
                .post(insert_books)
                .put(update_book)
                .patch(patch_book),
        )
        .route("/books/search", post(search_books))
        .route("/books/get", post(get_books))
        .route("/books/{id}", delete(delete_book))
        .with_state(store)
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

/// Result of search/get: the matches, or a notice that nothing was asked for
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Books(Vec<Book>),
    NoQuery(Message),
}

/// Body of every successful write
#[derive(Debug, Serialize)]
pub struct WriteOutcome {
    pub message: &'static str,
    pub rows_affected: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl WriteOutcome {
    /// `success` when rows changed, `no data update` otherwise
    fn new(rows_affected: u64, success: &'static str) -> Self {
        Self {
            message: if rows_affected == 0 {
                NO_DATA_UPDATE_MSG
            } else {
                success
            },
            rows_affected,
            warning: None,
        }
    }
}

impl From<EmptyField> for AppError {
    fn from(EmptyField(field): EmptyField) -> Self {
        AppError::empty_field(field)
    }
}

async fn home() -> Json<Message> {
    Json(Message {
        message: HOMEPAGE_MSG,
    })
}

async fn list_books(
    State(store): State<BookStore>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(query) = query?;
    let page = query.page().ok_or_else(|| {
        tracing::debug!(?query, "list query out of range");
        AppError::bad_request(BAD_REQUEST_MSG)
    })?;

    let books = store.list(page.order_by, page.limit, page.offset).await?;
    Ok(Json(books))
}

async fn search_books(
    State(store): State<BookStore>,
    JsonBody(book): JsonBody<Book>,
) -> Result<Json<QueryResult>, AppError> {
    run_query(&store, &book, MatchMode::Contains).await
}

async fn get_books(
    State(store): State<BookStore>,
    JsonBody(book): JsonBody<Book>,
) -> Result<Json<QueryResult>, AppError> {
    run_query(&store, &book, MatchMode::Exact).await
}

async fn run_query(
    store: &BookStore,
    book: &Book,
    mode: MatchMode,
) -> Result<Json<QueryResult>, AppError> {
    let Some(predicate) = Predicate::from_book(book, mode) else {
        tracing::warn!(?mode, "{}", NO_QUERY_DATA_MSG);
        return Ok(Json(QueryResult::NoQuery(Message {
            message: NO_QUERY_DATA_MSG,
        })));
    };

    let books = store.filter(&predicate).await?;
    Ok(Json(QueryResult::Books(books)))
}

async fn insert_books(
    State(store): State<BookStore>,
    JsonBody(books): JsonBody<Vec<Book>>,
) -> Result<Json<WriteOutcome>, AppError> {
    for book in &books {
        book.require_text_fields()?;
    }

    let rows_affected = store.insert(&books).await?;
    Ok(Json(WriteOutcome::new(rows_affected, ADD_SUCCESS_MSG)))
}

async fn update_book(
    State(store): State<BookStore>,
    JsonBody(book): JsonBody<Book>,
) -> Result<Json<WriteOutcome>, AppError> {
    book.require_all_fields()?;

    let rows_affected = store.update(&book).await?;
    Ok(Json(WriteOutcome::new(rows_affected, UPDATE_SUCCESS_MSG)))
}

async fn patch_book(
    State(store): State<BookStore>,
    JsonBody(book): JsonBody<PartialBook>,
) -> Result<Json<WriteOutcome>, AppError> {
    let set = PatchSet::from_partial(&book)?;

    let rows_affected = store.patch(&set).await?;
    let warning = set.warning();
    if let Some(warning) = &warning {
        tracing::warn!(book_id = set.book_id(), "{}", warning);
    }

    Ok(Json(WriteOutcome {
        warning,
        ..WriteOutcome::new(rows_affected, UPDATE_SUCCESS_MSG)
    }))
}

async fn delete_book(
    State(store): State<BookStore>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<WriteOutcome>, AppError> {
    let Path(id) = id?;

    let rows_affected = store.delete(id).await?;
    Ok(Json(WriteOutcome::new(rows_affected, DELETE_SUCCESS_MSG)))
}

//! Storage engine for the `book` table.
//!
//! Every method is a single statement in its own implicit transaction,
//! except [`BookStore::insert`] which wraps the whole batch in one.

use booklib_db::{Database, DbError};
use sqlx::{QueryBuilder, Sqlite};

use super::models::Book;
use super::query::{Column, PatchSet, Predicate};

const SELECT_BOOKS: &str = "SELECT book_id, isbn, title, author_name, author_surname, \
     published, publisher FROM book";

#[derive(Debug, Clone)]
pub struct BookStore {
    db: Database,
}

impl BookStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// One page of books in ascending `order` order.
    pub async fn list(&self, order: Column, limit: i64, offset: i64) -> Result<Vec<Book>, DbError> {
        let sql = format!("{} ORDER BY {} LIMIT ? OFFSET ?", SELECT_BOOKS, order.as_str());
        tracing::debug!(%sql, limit, offset, "list books");

        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db.pool())
            .await?;

        tracing::debug!(count = books.len(), "books listed");
        Ok(books)
    }

    /// Books matching `predicate`; an empty Vec when nothing matches.
    pub async fn filter(&self, predicate: &Predicate) -> Result<Vec<Book>, DbError> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_BOOKS);
        builder.push(" WHERE ");
        predicate.push_to(&mut builder);
        tracing::debug!(sql = %builder.sql(), mode = ?predicate.mode(), "filter books");

        let books = builder
            .build_query_as::<Book>()
            .fetch_all(self.db.pool())
            .await?;

        tracing::debug!(count = books.len(), "books filtered");
        Ok(books)
    }

    /// Insert all of `books` or none of them. `book_id` is ignored.
    pub async fn insert(&self, books: &[Book]) -> Result<u64, DbError> {
        if books.is_empty() {
            return Ok(0);
        }

        let mut tx = self.db.pool().begin().await?;
        let mut rows_affected = 0;
        for book in books {
            rows_affected += sqlx::query(
                "INSERT INTO book (isbn, title, author_name, author_surname, published, publisher) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(&book.author_name)
            .bind(&book.author_surname)
            .bind(&book.published)
            .bind(&book.publisher)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }
        // Dropping `tx` on an early return rolls the batch back.
        tx.commit().await?;

        tracing::debug!(rows_affected, "books inserted");
        Ok(rows_affected)
    }

    /// Replace every mutable field of the row with `book.book_id`.
    pub async fn update(&self, book: &Book) -> Result<u64, DbError> {
        let rows_affected = sqlx::query(
            "UPDATE book SET isbn = ?, title = ?, author_name = ?, author_surname = ?, \
             published = ?, publisher = ? WHERE book_id = ?",
        )
        .bind(&book.isbn)
        .bind(&book.title)
        .bind(&book.author_name)
        .bind(&book.author_surname)
        .bind(&book.published)
        .bind(&book.publisher)
        .bind(book.book_id)
        .execute(self.db.pool())
        .await?
        .rows_affected();

        tracing::debug!(book_id = book.book_id, rows_affected, "book updated");
        Ok(rows_affected)
    }

    /// Apply a partial update. An empty set changes nothing and returns 0.
    pub async fn patch(&self, set: &PatchSet) -> Result<u64, DbError> {
        if set.is_empty() {
            tracing::debug!(book_id = set.book_id(), "empty patch, nothing to update");
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE book SET ");
        set.push_to(&mut builder);
        tracing::debug!(sql = %builder.sql(), "patch book");

        let rows_affected = builder
            .build()
            .execute(self.db.pool())
            .await?
            .rows_affected();

        tracing::debug!(book_id = set.book_id(), rows_affected, "book patched");
        Ok(rows_affected)
    }

    pub async fn delete(&self, book_id: i64) -> Result<u64, DbError> {
        let rows_affected = sqlx::query("DELETE FROM book WHERE book_id = ?")
            .bind(book_id)
            .execute(self.db.pool())
            .await?
            .rows_affected();

        tracing::debug!(book_id, rows_affected, "book deleted");
        Ok(rows_affected)
    }
}

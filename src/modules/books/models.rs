use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::query::Column;

/// A catalog entry. Every field defaults to its zero value when absent from
/// the request body, so the same type carries full records and search input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(default)]
pub struct Book {
    /// Autogenerated identifier; ignored on insert
    pub book_id: i64,
    /// Unique per table constraint
    pub isbn: String,
    pub title: String,
    pub author_name: String,
    pub author_surname: String,
    /// Free-form publication date
    pub published: String,
    pub publisher: String,
}

/// Value of one column-backed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Int(i64),
    Text(&'a str),
}

impl FieldValue<'_> {
    /// `0` and `""` count as "not supplied".
    pub fn is_zero(&self) -> bool {
        match self {
            FieldValue::Int(value) => *value == 0,
            FieldValue::Text(value) => value.is_empty(),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(value) => write!(f, "{}", value),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

/// A required field was empty (or zero for `book_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} field is empty")]
pub struct EmptyField(pub &'static str);

impl Book {
    /// Column-backed fields in table order.
    pub fn fields(&self) -> [(Column, FieldValue<'_>); 7] {
        [
            (Column::BookId, FieldValue::Int(self.book_id)),
            (Column::Isbn, FieldValue::Text(&self.isbn)),
            (Column::Title, FieldValue::Text(&self.title)),
            (Column::AuthorName, FieldValue::Text(&self.author_name)),
            (Column::AuthorSurname, FieldValue::Text(&self.author_surname)),
            (Column::Published, FieldValue::Text(&self.published)),
            (Column::Publisher, FieldValue::Text(&self.publisher)),
        ]
    }

    /// Check a record for insert: every string field must be non-empty.
    pub fn require_text_fields(&self) -> Result<(), EmptyField> {
        self.first_empty(|column| column != Column::BookId)
    }

    /// Check a record for a full update: every field, `book_id` included.
    pub fn require_all_fields(&self) -> Result<(), EmptyField> {
        self.first_empty(|_| true)
    }

    fn first_empty(&self, checked: impl Fn(Column) -> bool) -> Result<(), EmptyField> {
        match self
            .fields()
            .into_iter()
            .find(|(column, value)| checked(*column) && value.is_zero())
        {
            Some((column, _)) => Err(EmptyField(column.as_str())),
            None => Ok(()),
        }
    }
}

/// Body of a PATCH: `book_id` selects the row, absent or empty strings are
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialBook {
    #[serde(default)]
    pub book_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl PartialBook {
    /// Updatable string fields in table order; `None` when absent or empty.
    pub fn text_fields(&self) -> [(Column, Option<&str>); 6] {
        fn supplied(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.is_empty())
        }

        [
            (Column::Isbn, supplied(&self.isbn)),
            (Column::Title, supplied(&self.title)),
            (Column::AuthorName, supplied(&self.author_name)),
            (Column::AuthorSurname, supplied(&self.author_surname)),
            (Column::Published, supplied(&self.published)),
            (Column::Publisher, supplied(&self.publisher)),
        ]
    }
}

pub const MIN_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Query string of `GET /books`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListQuery {
    #[serde(default = "ListQuery::default_order_by")]
    pub order_by: String,
    #[serde(default = "ListQuery::default_page_id")]
    pub page_id: i64,
    #[serde(default = "ListQuery::default_page_size")]
    pub page_size: i64,
}

/// A validated `ListQuery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub order_by: Column,
    pub limit: i64,
    pub offset: i64,
}

impl ListQuery {
    fn default_order_by() -> String {
        Column::BookId.as_str().to_string()
    }

    fn default_page_id() -> i64 {
        1
    }

    fn default_page_size() -> i64 {
        25
    }

    /// `None` when the order column is unknown, a bound is out of range or
    /// the offset does not fit in an `i64`.
    pub fn page(&self) -> Option<Page> {
        let order_by = Column::parse(&self.order_by)?;
        if self.page_id < 1 || !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return None;
        }

        Some(Page {
            order_by,
            limit: self.page_size,
            offset: (self.page_id - 1).checked_mul(self.page_size)?,
        })
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            order_by: Self::default_order_by(),
            page_id: Self::default_page_id(),
            page_size: Self::default_page_size(),
        }
    }
}

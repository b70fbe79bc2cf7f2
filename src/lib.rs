//! Book library application
//!
//! Application modules mounted by the HTTP server. The only module today is
//! `books`, a CRUD API over the `book` table.

pub mod modules;

pub use modules::books::{self, models::Book, store::BookStore};

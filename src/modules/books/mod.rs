pub mod models;
pub mod query;
pub mod routes;
pub mod store;

use async_trait::async_trait;
use axum::Router;
use booklib_db::Database;
use booklib_kernel::{InitCtx, Migration, Module};

use store::BookStore;

/// CRUD API over the `book` table
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(db: Database) -> Self {
        Self {
            store: BookStore::new(db),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            database = %ctx.settings.database.path.display(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn migrations(&self) -> Vec<Migration> {
        // IF NOT EXISTS keeps databases created before migration tracking usable.
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS book (
                    book_id        INTEGER PRIMARY KEY AUTOINCREMENT,
                    isbn           TEXT NOT NULL UNIQUE,
                    title          TEXT NOT NULL,
                    author_name    TEXT NOT NULL,
                    author_surname TEXT NOT NULL,
                    published      TEXT NOT NULL,
                    publisher      TEXT NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(db: Database) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(db))
}

use async_trait::async_trait;
use axum::Router;
use booklib_db::{Database, Migration};

use crate::settings::Settings;

/// Shared resources handed to every module during startup
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
    pub db: &'a Database,
}

/// A feature area of the book library: its routes, schema and lifecycle.
///
/// The binary drives every module through the same sequence:
/// migrations, `init`, `start`, serve, then `stop` on shutdown.
#[async_trait]
pub trait Module: Send + Sync {
    /// Stable identifier, also the key of this module's rows in `_migrations`
    fn name(&self) -> &'static str;

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Handlers nested under `server.base_path`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// Schema changes, applied in ascending `id` order
    fn migrations(&self) -> Vec<Migration> {
        Vec::new()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Release resources; runs after the server stops accepting requests
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

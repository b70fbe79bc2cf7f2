use std::path::PathBuf;

use anyhow::Context;
use booklib_db::Database;
use booklib_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use clap::Parser;

/// Book library HTTP API
#[derive(Debug, Parser)]
#[command(name = "booklib", version, about)]
struct Args {
    /// Listen address as host:port; `:8080` listens on all interfaces
    #[arg(long)]
    addr: Option<String>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Append logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, value_name = "PATH")]
    db_file: Option<PathBuf>,

    /// Configuration environment (local, staging, production)
    #[arg(long)]
    env: Option<String>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) -> anyhow::Result<()> {
        if let Some(addr) = &self.addr {
            settings.server.apply_addr(addr)?;
        }
        if self.debug {
            settings.telemetry.debug = true;
        }
        if let Some(path) = &self.log_file {
            settings.telemetry.log_file = Some(path.clone());
        }
        if let Some(path) = &self.db_file {
            settings.database.path = path.clone();
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.env.as_deref())
        .with_context(|| "failed to load book library settings")?;
    args.apply(&mut settings)?;

    booklib_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.path.display(),
        "booklib starting"
    );

    let db = Database::open(&settings.database.path, settings.database.max_connections)
        .await
        .with_context(|| format!("failed to open {}", settings.database.path.display()))?;

    let mut registry = ModuleRegistry::new();
    booklib_app::modules::register_all(&mut registry, &db);

    let applied = db
        .apply_migrations(&registry.collect_migrations())
        .await
        .with_context(|| "failed to apply migrations")?;
    tracing::info!(applied, "migrations up to date");

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = booklib_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    db.close().await;
    tracing::info!("booklib stopped");

    served
}

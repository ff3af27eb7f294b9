//! Subcommand implementations

mod config;
mod migrate;
mod report;
mod serve;
mod user;

pub use config::{run_config, ConfigCommand};
pub use migrate::{run_migrate, MigrateArgs};
pub use report::{run_report, ReportArgs};
pub use serve::{run_serve, ServeArgs};
pub use user::{run_user, UserCommand};

use anyhow::{Context, Result};
use metaworks_core::AppConfig;
use metaworks_server::db::create_pool_with_options;
use sqlx::PgPool;

/// Load config, let `--database-url` win, and open the pool.
pub(crate) async fn connect(database_url: Option<String>) -> Result<(AppConfig, PgPool)> {
    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(url) = database_url {
        config.database.url = Some(url);
    }

    let url = config.database.url.clone().context(
        "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ~/.metaworks/config.toml",
    )?;

    let pool = create_pool_with_options(&url, config.database.max_connections)
        .await
        .context("Failed to create database pool")?;

    Ok((config, pool))
}

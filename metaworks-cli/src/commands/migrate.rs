use anyhow::{Context, Result};
use clap::Parser;

use metaworks_server::db::migrations;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let (_, pool) = super::connect(args.database_url).await?;
    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;
    println!("Schema is up to date");
    Ok(())
}

//! `metaworks serve`: run the HTTP API

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;

use metaworks_server::db::migrations;
use metaworks_server::http::{run_server, AppState, ServerConfig};

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default from config: 127.0.0.1:5000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Skip schema migrations at startup
    #[arg(long)]
    pub no_migrate: bool,
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let (config, pool) = super::connect(args.database_url).await?;

    if !args.no_migrate {
        migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;
    }

    let mut server = ServerConfig::try_from(&config.server)?;
    if let Some(bind) = args.bind {
        server.bind_addr = bind;
    }
    server.cors_permissive |= args.cors_permissive;

    tracing::info!("Starting metaworks server on {}", server.bind_addr);

    let state = AppState::new(pool, server, config.integrations)?;
    run_server(state).await.context("Server error")?;

    Ok(())
}

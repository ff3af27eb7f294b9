//! Console tracing for the metaworks CLI
//!
//!   metaworks --debug ...               # debug logging
//!   RUST_LOG=metaworks_server=trace ... # fine-grained control

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// RUST_LOG wins; otherwise `debug` under --debug and `info` without it.
pub fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

//! jpaddr - Japanese address normalizer
//!
//! Resolves addresses given as arguments (or stdin lines) and prints one
//! JSON result per address on stdout. Logs go to stderr.

use anyhow::Result;
use clap::Parser;
use jpaddr_cli::{run, Args};
use jpaddr_common::config::ResolvedConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ResolvedConfig::resolve(&args.overrides())?;

    // --log-level beats RUST_LOG, which beats the config file
    let filter = match &args.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    info!(
        "Starting jpaddr v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    run(&args, &config).await
}

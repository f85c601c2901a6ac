//! jpaddr command-line front end
//!
//! Argument parsing and the resolve-and-print loop live here; the binary
//! only installs logging and calls [`run`].

use anyhow::{Context, Result};
use clap::Parser;
use jpaddr_catalog::CachedCatalog;
use jpaddr_common::config::{CliOverrides, ResolvedConfig};
use jpaddr_common::{ReferenceCatalog, ResolutionResult, ResolveLevel};
use jpaddr_core::Normalizer;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// Command-line arguments for jpaddr
#[derive(Parser, Debug)]
#[command(name = "jpaddr")]
#[command(about = "Split Japanese addresses into prefecture, city, town and remainder")]
#[command(version)]
pub struct Args {
    /// Addresses to resolve (one per stdin line when omitted)
    pub addresses: Vec<String>,

    /// Deepest level to resolve: 1 prefecture, 2 city, 3 town
    #[arg(short, long, default_value = "3", value_parser = parse_level)]
    pub level: ResolveLevel,

    /// Catalog source: http(s) base URL, file:// URL or local directory
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Catalog cache time-to-live in seconds
    #[arg(long)]
    pub cache_ttl: Option<u64>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log filter directive, e.g. "debug" or "jpaddr_core=trace"
    #[arg(long)]
    pub log_level: Option<String>,

    /// Indent JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl Args {
    /// Settings that take priority over environment and config file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_path: self.config.clone(),
            endpoint: self.endpoint.clone(),
            cache_ttl_secs: self.cache_ttl,
            log_level: self.log_level.clone(),
        }
    }
}

fn parse_level(raw: &str) -> Result<ResolveLevel, String> {
    let value: u8 = raw
        .trim()
        .parse()
        .map_err(|_| format!("expected 1, 2 or 3, got {:?}", raw))?;
    ResolveLevel::try_from(value).map_err(|e| e.to_string())
}

/// Serialize one result as a JSON line (or an indented block)
pub fn render(result: &ResolutionResult, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
}

/// Resolve one address and write its JSON to `out`
pub async fn write_resolution<C, W>(
    normalizer: &Normalizer<C>,
    address: &str,
    level: ResolveLevel,
    pretty: bool,
    out: &mut W,
) -> Result<ResolutionResult>
where
    C: ReferenceCatalog,
    W: Write,
{
    let result = normalizer.resolve(address, level).await;
    let json = render(&result, pretty).context("Failed to serialize result")?;
    writeln!(out, "{}", json).context("Failed to write result")?;
    out.flush().context("Failed to flush output")?;
    Ok(result)
}

/// Resolve every non-blank line of `reader`, returning how many were resolved
pub async fn resolve_lines<C, R, W>(
    normalizer: &Normalizer<C>,
    reader: R,
    level: ResolveLevel,
    pretty: bool,
    out: &mut W,
) -> Result<usize>
where
    C: ReferenceCatalog,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();
    let mut resolved = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let address = line.trim();
        if address.is_empty() {
            continue;
        }
        write_resolution(normalizer, address, level, pretty, out).await?;
        resolved += 1;
    }

    Ok(resolved)
}

/// Resolve the addresses named in `args` (or stdin) against the configured catalog
pub async fn run(args: &Args, config: &ResolvedConfig) -> Result<()> {
    let catalog = CachedCatalog::from_config(config).context("Invalid catalog endpoint")?;
    info!(
        source = %catalog.source(),
        ttl_secs = config.cache_ttl.as_secs(),
        "Catalog configured"
    );

    let normalizer = Normalizer::new(catalog);
    let mut out = std::io::stdout();

    if args.addresses.is_empty() {
        debug!("No address arguments, reading stdin");
        let stdin = BufReader::new(tokio::io::stdin());
        let resolved = resolve_lines(&normalizer, stdin, args.level, args.pretty, &mut out).await?;
        debug!(resolved, "Finished reading stdin");
    } else {
        for address in &args.addresses {
            write_resolution(&normalizer, address, args.level, args.pretty, &mut out).await?;
        }
    }

    Ok(())
}

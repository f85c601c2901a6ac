//! Configuration loading and catalog source resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing or unreadable TOML file is never fatal: a warning is logged and
//! the compiled defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Public reference dataset (prefecture table at `<endpoint>.json`)
pub const DEFAULT_ENDPOINT: &str = "https://geolonia.github.io/japanese-addresses/api/ja";

/// Default lifetime of cached catalog entries
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

pub const ENDPOINT_ENV_VAR: &str = "JPADDR_ENDPOINT";
pub const CACHE_TTL_ENV_VAR: &str = "JPADDR_CACHE_TTL";

/// Configuration file contents
///
/// Every field is optional in the file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Catalog source locator (URL, `file://` URL or directory path)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Cached catalog entry lifetime in seconds
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,

    /// Per-request timeout for remote catalog fetches
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on total time spent retrying a transient fetch failure
    #[serde(default = "default_max_retry_wait_ms")]
    pub max_retry_wait_ms: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            cache_ttl_secs: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_retry_wait_ms: default_max_retry_wait_ms(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retry_wait_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    // stdout carries results, keep stderr quiet unless asked
    "warn".to_string()
}

/// Overrides supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub cache_ttl_secs: Option<u64>,
    pub log_level: Option<String>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub endpoint: String,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub max_retry_wait: Duration,
    pub log_level: String,
}

impl ResolvedConfig {
    /// Resolve all settings from CLI → ENV → TOML → defaults
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let toml_config = load_toml_config(cli.config_path.as_deref());
        Self::resolve_with(cli, &toml_config)
    }

    /// Resolve against an already loaded TOML configuration
    pub fn resolve_with(cli: &CliOverrides, toml_config: &TomlConfig) -> Result<Self> {
        Ok(Self {
            endpoint: resolve_endpoint(cli.endpoint.as_deref(), toml_config),
            cache_ttl: Duration::from_secs(resolve_cache_ttl(cli.cache_ttl_secs, toml_config)?),
            request_timeout: Duration::from_secs(toml_config.request_timeout_secs),
            max_retry_wait: Duration::from_millis(toml_config.max_retry_wait_ms),
            log_level: cli
                .log_level
                .clone()
                .unwrap_or_else(|| toml_config.logging.level.clone()),
        })
    }
}

/// Catalog source resolution
pub fn resolve_endpoint(cli_arg: Option<&str>, toml_config: &TomlConfig) -> String {
    // Priority 1: Command-line argument
    if let Some(endpoint) = cli_arg {
        return endpoint.to_string();
    }

    // Priority 2: Environment variable
    if let Ok(endpoint) = std::env::var(ENDPOINT_ENV_VAR) {
        if !endpoint.trim().is_empty() {
            return endpoint;
        }
    }

    // Priority 3: TOML config file
    if let Some(endpoint) = &toml_config.endpoint {
        return endpoint.clone();
    }

    // Priority 4: Compiled default
    DEFAULT_ENDPOINT.to_string()
}

/// Cache TTL resolution (seconds)
///
/// A malformed environment value is a configuration error rather than a
/// silent fallback.
pub fn resolve_cache_ttl(cli_arg: Option<u64>, toml_config: &TomlConfig) -> Result<u64> {
    if let Some(secs) = cli_arg {
        return Ok(secs);
    }

    if let Ok(raw) = std::env::var(CACHE_TTL_ENV_VAR) {
        return raw.trim().parse::<u64>().map_err(|e| {
            Error::Config(format!("{} must be a number of seconds ({:?}): {}", CACHE_TTL_ENV_VAR, raw, e))
        });
    }

    Ok(toml_config.cache_ttl_secs.unwrap_or(DEFAULT_CACHE_TTL_SECS))
}

/// Load the TOML configuration, falling back to defaults on any problem
pub fn load_toml_config(explicit_path: Option<&Path>) -> TomlConfig {
    let path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => match config_file_path() {
            Ok(path) => path,
            Err(e) => {
                debug!("No config file: {}", e);
                return TomlConfig::default();
            }
        },
    };

    match read_toml_config(&path) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Read and parse one TOML configuration file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Locate the configuration file for the platform
fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("jpaddr").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/jpaddr/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

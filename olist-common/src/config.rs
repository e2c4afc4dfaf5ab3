//! Configuration loading and database path resolution
//!
//! Resolution priority for both the config file and the database path:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing config file is never fatal: the loader warns and uses defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "OLIST_CONFIG";

/// Environment variable naming the SQLite database file
pub const DATABASE_ENV_VAR: &str = "OLIST_DATABASE";

/// Pipeline configuration as read from `config.toml`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EtlConfig {
    /// SQLite database holding raw and published tables
    pub database_path: Option<PathBuf>,
    /// Directory holding the raw CSV files
    pub raw_data_dir: PathBuf,
    /// Rows per multi-row INSERT statement
    pub insert_batch_size: usize,
    /// SQLite busy timeout in milliseconds
    pub busy_timeout_ms: u64,
    /// Malformed timestamps abort the run instead of becoming NULL
    pub strict_timestamps: bool,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            raw_data_dir: PathBuf::from("./data"),
            insert_batch_size: 500,
            busy_timeout_ms: 5000,
            strict_timestamps: false,
            log_level: "info".to_string(),
        }
    }
}

impl EtlConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EtlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.insert_batch_size == 0 {
            return Err(Error::Config(
                "insert_batch_size must be at least 1".to_string(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(Error::Config("log_level must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load configuration following the priority order above
///
/// `cli_arg` is the `--config` value. An explicitly named file (CLI or
/// environment) must exist; the platform default file is optional.
pub fn load_config(cli_arg: Option<&Path>) -> Result<EtlConfig> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return load_config_file(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(Path::new(&path));
    }

    // Priority 3: Platform config file
    if let Some(path) = default_config_path() {
        if path.exists() {
            return load_config_file(&path);
        }
        warn!("Config file not found at {} - using defaults", path.display());
    }

    // Priority 4: Compiled defaults
    Ok(EtlConfig::default())
}

/// Read and validate one config file
pub fn load_config_file(path: &Path) -> Result<EtlConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;
    info!("Loading config from: {}", path.display());
    EtlConfig::from_toml_str(&content)
}

/// Resolve the database path: CLI argument, environment, config, default
pub fn resolve_database_path(cli_arg: Option<&Path>, config: &EtlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(DATABASE_ENV_VAR) {
        return PathBuf::from(path);
    }

    if let Some(path) = &config.database_path {
        return path.clone();
    }

    default_database_path()
}

/// `<config-dir>/olist/config.toml` for the current platform
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("olist").join("config.toml"))
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("olist").join("olist.db"))
        .unwrap_or_else(|| PathBuf::from("./olist_data/olist.db"))
}

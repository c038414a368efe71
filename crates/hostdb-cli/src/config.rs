//! Configuration loading
//!
//! Settings come from a TOML file when one is found, then `DB_*` environment
//! variables override individual values.

use std::path::{Path, PathBuf};

use hostdb_inventory::DatabaseConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Host database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
        Self::parse(&content).map_err(|e| eyre::eyre!("invalid config {}: {e}", path.display()))
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not a valid configuration
    pub fn parse(content: &str) -> eyre::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from default paths or use defaults
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be loaded
    pub fn load_default() -> eyre::Result<Self> {
        // Check environment variable
        if let Ok(path) = std::env::var("HOSTDB_CONFIG") {
            return Self::load(&PathBuf::from(path));
        }

        // Try common paths
        let mut paths = vec![
            PathBuf::from("hostdb.toml"),
            PathBuf::from("/etc/hostdb/hostdb.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("hostdb/hostdb.toml"));
        }

        for path in paths {
            if path.exists() {
                debug!(path = %path.display(), "loading config file");
                return Self::load(&path);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Config::default())
    }

    /// Resolve the effective configuration
    ///
    /// An explicit path must exist. Environment variables are applied last.
    ///
    /// # Errors
    /// Returns error if a config file cannot be loaded or `DB_PORT` is invalid
    pub fn resolve(explicit: Option<&Path>) -> eyre::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => Self::load_default()?,
        };
        config.database = config.database.with_env()?;
        Ok(config)
    }
}

//! Connection settings for the host database

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;
use crate::query::is_valid_table_name;

/// Connection settings for the PostgreSQL host source
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database server host
    #[serde(default = "default_host")]
    pub host: String,
    /// Login user
    #[serde(default = "default_user")]
    pub user: String,
    /// Login password
    #[serde(default = "default_password")]
    pub password: String,
    /// Database name
    #[serde(default = "default_dbname")]
    pub dbname: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Table holding host rows
    #[serde(default = "default_table")]
    pub table: String,
    /// Seconds to wait for a connection before giving up
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_user() -> String {
    "user".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_dbname() -> String {
    "inventory_db".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_table() -> String {
    "hosts".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            user: default_user(),
            password: default_password(),
            dbname: default_dbname(),
            port: default_port(),
            table: default_table(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("port", &self.port)
            .field("table", &self.table)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Overlay `DB_HOST`, `DB_USER`, `DB_PASS`, `DB_NAME` and `DB_PORT` from the process environment
    ///
    /// # Errors
    /// Returns [`InventoryError::Config`] if `DB_PORT` is not a valid port.
    pub fn with_env(self) -> Result<Self, InventoryError> {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns [`InventoryError::Config`] if `DB_PORT` is not a valid port.
    pub fn with_vars<F>(mut self, lookup: F) -> Result<Self, InventoryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DB_HOST") {
            self.host = host;
        }
        if let Some(user) = lookup("DB_USER") {
            self.user = user;
        }
        if let Some(password) = lookup("DB_PASS") {
            self.password = password;
        }
        if let Some(dbname) = lookup("DB_NAME") {
            self.dbname = dbname;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.port = port.trim().parse().map_err(|_| {
                InventoryError::Config(format!("DB_PORT is not a valid port: '{port}'"))
            })?;
        }
        Ok(self)
    }

    /// Check values that would otherwise fail late or unsafely
    ///
    /// # Errors
    /// Returns [`InventoryError::Config`] for an unusable table name or port.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if !is_valid_table_name(&self.table) {
            return Err(InventoryError::Config(format!(
                "invalid table name: '{}'",
                self.table
            )));
        }
        if self.port == 0 {
            return Err(InventoryError::Config("port must not be 0".to_string()));
        }
        Ok(())
    }

    /// Connection timeout
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

//! PostgreSQL host source

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};

use crate::config::DatabaseConfig;
use crate::error::InventoryError;
use crate::query::active_hosts;
use crate::source::{HostRow, HostSource, collect_records};
use crate::types::HostRecord;

/// Host source backed by a PostgreSQL `hosts` table
///
/// A connection is opened for each fetch and closed afterwards; nothing is
/// kept between calls.
#[derive(Debug, Clone)]
pub struct PostgresHostSource {
    config: DatabaseConfig,
    sql: String,
}

impl PostgresHostSource {
    /// Create a source for the given connection settings
    ///
    /// # Errors
    /// Returns [`InventoryError::Config`] if the settings are unusable.
    pub fn new(config: DatabaseConfig) -> Result<Self, InventoryError> {
        config.validate()?;
        let sql = active_hosts(&config.table).build();
        Ok(Self { config, sql })
    }

    /// SQL issued on every fetch
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .database(&self.config.dbname)
    }

    async fn connect(&self) -> Result<PgPool, InventoryError> {
        PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(self.config.connect_timeout())
            .connect_with(self.connect_options())
            .await
            .map_err(|e| {
                InventoryError::SourceUnavailable(format!(
                    "failed to connect to {}:{}/{}: {e}",
                    self.config.host, self.config.port, self.config.dbname
                ))
            })
    }
}

#[async_trait]
impl HostSource for PostgresHostSource {
    #[instrument(skip(self), fields(host = %self.config.host, dbname = %self.config.dbname))]
    async fn fetch_active_hosts(&self) -> Result<Vec<HostRecord>, InventoryError> {
        let pool = self.connect().await?;
        debug!(sql = %self.sql, "querying active hosts");

        let rows = sqlx::query_as::<_, HostRow>(&self.sql)
            .fetch_all(&pool)
            .await
            .map_err(|e| InventoryError::SourceUnavailable(format!("host query failed: {e}")));
        pool.close().await;

        let rows = rows?;
        info!(rows = rows.len(), "fetched host rows");
        Ok(collect_records(rows))
    }

    fn source_type(&self) -> &'static str {
        "postgres"
    }
}

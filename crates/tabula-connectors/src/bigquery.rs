//! Google BigQuery connector.
//!
//! Wraps an engine obtained from an [`EngineRegistry`] and exposes the
//! [`Connector`] read interface over a single BigQuery table. The BigQuery
//! driver itself is external: production deployments register a factory for
//! the `bigquery://` scheme with the registry they pass in.

use std::any::Any;
use std::fmt;

use arrow::array::RecordBatch;
use async_trait::async_trait;
use tracing::info;

use crate::config::BigQueryConfig;
use crate::engine::{default_registry, EngineRegistry};
use crate::error::ConnectorError;
use crate::sql::SqlCore;
use crate::Connector;

/// Connector for a Google BigQuery table.
#[derive(Debug)]
pub struct GoogleBigQueryConnector {
    config: BigQueryConfig,
    core: SqlCore,
}

impl GoogleBigQueryConnector {
    /// Connect using the built-in engine registry.
    pub async fn connect(config: BigQueryConfig) -> Result<Self, ConnectorError> {
        Self::connect_with(config, &default_registry()).await
    }

    /// Connect using a caller-supplied engine registry. Validates the
    /// config, builds the connection string, creates the engine, and opens
    /// the connection. Any failure aborts construction.
    pub async fn connect_with(
        config: BigQueryConfig,
        registry: &EngineRegistry,
    ) -> Result<Self, ConnectorError> {
        config.validate()?;
        let conn_string = config.connection_string();
        let engine = registry.create_engine(&conn_string)?;
        let core = SqlCore::open(engine, config.table.clone(), String::new()).await?;
        info!(
            "Connected GoogleBigQueryConnector: project='{}', database='{}', table='{}'",
            config.project_id, config.database, config.table
        );
        Ok(Self { config, core })
    }

    pub fn config(&self) -> &BigQueryConfig {
        &self.config
    }

    pub fn cache_interval(&self) -> u64 {
        self.core.cache_interval()
    }

    pub fn set_cache_interval(&mut self, seconds: u64) {
        self.core.set_cache_interval(seconds);
    }

    /// Clear the cached counts, forcing recomputation on next access.
    pub fn reset_cache(&mut self) {
        self.core.reset_cache();
    }
}

#[async_trait]
impl Connector for GoogleBigQueryConnector {
    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn head(&self) -> Result<RecordBatch, ConnectorError> {
        self.core.head().await
    }

    async fn rows_count(&mut self) -> Result<u64, ConnectorError> {
        self.core.rows_count().await
    }

    async fn columns_count(&mut self) -> Result<usize, ConnectorError> {
        self.core.columns_count().await
    }

    async fn column_hash(&self) -> Result<String, ConnectorError> {
        self.core.column_hash().await
    }

    fn fallback_name(&self) -> &str {
        &self.config.table
    }

    fn equals(&self, other: &dyn Connector) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .map_or(false, |o| o.config == self.config)
    }
}

impl fmt::Display for GoogleBigQueryConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<GoogleBigQueryConnector dialect={} projectid= {} database={} >",
            self.config.dialect, self.config.project_id, self.config.database
        )
    }
}

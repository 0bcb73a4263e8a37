//! PostgreSQL connector.
//!
//! Same read/caching/equality contract as the BigQuery connector, over a
//! host/port [`SqlConfig`]. Where-conditions from the config are applied to
//! both preview and count queries.

use std::any::Any;
use std::fmt;

use arrow::array::RecordBatch;
use async_trait::async_trait;
use tracing::info;

use crate::config::SqlConfig;
use crate::engine::{default_registry, EngineRegistry};
use crate::error::ConnectorError;
use crate::filter::build_where_clause;
use crate::sql::SqlCore;
use crate::Connector;

/// Connector for a PostgreSQL table.
#[derive(Debug)]
pub struct PostgresConnector {
    config: SqlConfig,
    core: SqlCore,
}

impl PostgresConnector {
    /// Connect using the built-in engine registry (sqlx-backed).
    pub async fn connect(config: SqlConfig) -> Result<Self, ConnectorError> {
        Self::connect_with(config, &default_registry()).await
    }

    /// Connect using a caller-supplied engine registry.
    pub async fn connect_with(
        config: SqlConfig,
        registry: &EngineRegistry,
    ) -> Result<Self, ConnectorError> {
        config.validate()?;
        let conn_string = config.connection_string();
        let engine = registry.create_engine(&conn_string)?;
        let where_clause = build_where_clause(&config.where_conditions);
        let core = SqlCore::open(engine, config.table.clone(), where_clause).await?;
        info!(
            "Connected PostgresConnector: host='{}', database='{}', table='{}'",
            config.host, config.database, config.table
        );
        Ok(Self { config, core })
    }

    pub fn config(&self) -> &SqlConfig {
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
impl Connector for PostgresConnector {
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

impl fmt::Display for PostgresConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<PostgresConnector dialect={} host={} database={} >",
            self.config.dialect, self.config.host, self.config.database
        )
    }
}

//! Tabula Connectors - Data source adapters
//!
//! This crate provides connectors for remote SQL tables:
//! - Google BigQuery
//! - PostgreSQL
//!
//! A connector validates its configuration, opens an engine + connection
//! through an [`EngineRegistry`], and exposes a uniform read interface:
//! a preview batch, cached row/column counts, a fingerprint of the column
//! set, and value-based equality between connector instances.

pub mod bigquery;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod postgres;
pub mod sql;

pub use bigquery::GoogleBigQueryConnector;
pub use config::{BigQueryConfig, Credentials, SqlConfig};
pub use engine::{
    default_registry, EngineFactory, EngineRegistry, PostgresEngineFactory, SqlConnection,
    SqlEngine,
};
pub use error::ConnectorError;
pub use filter::{build_where_clause, FilterOp, FilterValue, WhereCondition};
pub use postgres::PostgresConnector;
pub use sql::{column_fingerprint, DEFAULT_CACHE_INTERVAL, PREVIEW_ROWS};

use std::any::Any;

use arrow::array::RecordBatch;
use async_trait::async_trait;

/// Uniform read interface over a remote table, independent of backend.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Concrete-type access for identity-aware equality checks.
    fn as_any(&self) -> &dyn Any;

    /// Preview batch of the table contents. Pure passthrough of the
    /// underlying read; reused by column-derived properties.
    async fn head(&self) -> Result<RecordBatch, ConnectorError>;

    /// Total row count, queried once and cached.
    async fn rows_count(&mut self) -> Result<u64, ConnectorError>;

    /// Column count of the preview, computed once and cached.
    async fn columns_count(&mut self) -> Result<usize, ConnectorError>;

    /// Deterministic fingerprint of the ordered column names, independent
    /// of row data.
    async fn column_hash(&self) -> Result<String, ConnectorError>;

    /// Name to display when no friendlier name is configured.
    fn fallback_name(&self) -> &str;

    /// Value-based equality: same concrete connector type and field-equal
    /// configuration. Cross-backend comparisons return `false`.
    fn equals(&self, other: &dyn Connector) -> bool;
}

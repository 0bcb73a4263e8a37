//! Shared connector state: engine/connection handles, preview and count
//! queries, read-through caches for the derived properties, and the
//! column-set fingerprint.

use std::fmt;

use arrow::array::RecordBatch;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::engine::{SqlConnection, SqlEngine};
use crate::error::ConnectorError;

/// Seconds a cached derived value remains valid. Stored at construction;
/// invalidation is driven by the caller via [`SqlCore::reset_cache`].
pub const DEFAULT_CACHE_INTERVAL: u64 = 600;

/// Number of rows returned by preview queries.
pub const PREVIEW_ROWS: usize = 5;

/// Backend-independent connector state. Each connector owns one `SqlCore`
/// with its own engine/connection pair; nothing is shared across instances.
pub struct SqlCore {
    table: String,
    where_clause: String,
    // held for the connector's lifetime; released together with the connection
    _engine: Box<dyn SqlEngine>,
    connection: Box<dyn SqlConnection>,
    rows_count: Option<u64>,
    columns_count: Option<usize>,
    cache_interval: u64,
}

impl fmt::Debug for SqlCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlCore")
            .field("table", &self.table)
            .field("where_clause", &self.where_clause)
            .field("rows_count", &self.rows_count)
            .field("columns_count", &self.columns_count)
            .field("cache_interval", &self.cache_interval)
            .finish()
    }
}

impl SqlCore {
    /// Open a connection from the engine and return the core with empty
    /// caches. A connection failure propagates; no partial core is produced.
    pub async fn open(
        engine: Box<dyn SqlEngine>,
        table: String,
        where_clause: String,
    ) -> Result<Self, ConnectorError> {
        let connection = engine.connect().await?;
        Ok(Self {
            table,
            where_clause,
            _engine: engine,
            connection,
            rows_count: None,
            columns_count: None,
            cache_interval: DEFAULT_CACHE_INTERVAL,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn cache_interval(&self) -> u64 {
        self.cache_interval
    }

    pub fn set_cache_interval(&mut self, seconds: u64) {
        self.cache_interval = seconds;
    }

    /// Clear the cached counts, forcing recomputation on next access.
    pub fn reset_cache(&mut self) {
        self.rows_count = None;
        self.columns_count = None;
    }

    /// Preview query against the table. Pure passthrough of the driver
    /// result; the batch itself is not cached.
    pub async fn head(&self) -> Result<RecordBatch, ConnectorError> {
        let query = format!(
            "SELECT * FROM \"{}\"{} LIMIT {}",
            self.table, self.where_clause, PREVIEW_ROWS
        );
        debug!("head query: {}", query);
        self.connection.read_sql(&query).await
    }

    /// Total row count, queried once and cached.
    pub async fn rows_count(&mut self) -> Result<u64, ConnectorError> {
        if let Some(count) = self.rows_count {
            return Ok(count);
        }
        let query = format!(
            "SELECT COUNT(*) FROM \"{}\"{}",
            self.table, self.where_clause
        );
        debug!("count query: {}", query);
        let raw = self.connection.fetch_scalar(&query).await?;
        let count = u64::try_from(raw).map_err(|_| {
            ConnectorError::QueryFailed(format!("negative row count: {}", raw))
        })?;
        self.rows_count = Some(count);
        Ok(count)
    }

    /// Column count of the preview, computed once and cached.
    pub async fn columns_count(&mut self) -> Result<usize, ConnectorError> {
        if let Some(count) = self.columns_count {
            return Ok(count);
        }
        let count = self.head().await?.num_columns();
        self.columns_count = Some(count);
        Ok(count)
    }

    /// Fingerprint of the ordered column names of the preview result.
    pub async fn column_hash(&self) -> Result<String, ConnectorError> {
        let batch = self.head().await?;
        let schema = batch.schema();
        Ok(column_fingerprint(
            schema.fields().iter().map(|f| f.name().as_str()),
        ))
    }
}

/// SHA-256 over the ordered column names, lowercase hex. Stable across runs
/// for identical column sets, independent of row data.
pub fn column_fingerprint<'a>(columns: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for name in columns {
        hasher.update(name.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use arrow::array::Int64Array;
    use arrow::datatypes::{DataType, Field, Schema};
    use async_trait::async_trait;

    struct CountingState {
        scalar_calls: AtomicUsize,
        read_calls: AtomicUsize,
    }

    struct CountingEngine {
        state: Arc<CountingState>,
    }

    struct CountingConnection {
        state: Arc<CountingState>,
    }

    #[async_trait]
    impl SqlEngine for CountingEngine {
        async fn connect(&self) -> Result<Box<dyn SqlConnection>, ConnectorError> {
            Ok(Box::new(CountingConnection {
                state: Arc::clone(&self.state),
            }))
        }
    }

    #[async_trait]
    impl SqlConnection for CountingConnection {
        async fn read_sql(&self, _query: &str) -> Result<RecordBatch, ConnectorError> {
            self.state.read_calls.fetch_add(1, Ordering::SeqCst);
            let schema = Arc::new(Schema::new(vec![
                Field::new("Column1", DataType::Int64, true),
                Field::new("Column2", DataType::Int64, true),
            ]));
            Ok(RecordBatch::try_new(
                schema,
                vec![
                    Arc::new(Int64Array::from(vec![1, 2, 3])),
                    Arc::new(Int64Array::from(vec![4, 5, 6])),
                ],
            )?)
        }

        async fn fetch_scalar(&self, _query: &str) -> Result<i64, ConnectorError> {
            self.state.scalar_calls.fetch_add(1, Ordering::SeqCst);
            Ok(50)
        }
    }

    async fn counting_core() -> (SqlCore, Arc<CountingState>) {
        let state = Arc::new(CountingState {
            scalar_calls: AtomicUsize::new(0),
            read_calls: AtomicUsize::new(0),
        });
        let engine = Box::new(CountingEngine {
            state: Arc::clone(&state),
        });
        let core = SqlCore::open(engine, "yourtable".to_string(), String::new())
            .await
            .unwrap();
        (core, state)
    }

    #[test]
    fn test_column_fingerprint_literal() {
        let hash = column_fingerprint(["Column1", "Column2"]);
        assert_eq!(
            hash,
            "0d045cff164deef81e24b0ed165b7c9c2789789f013902115316cde9d214fe63"
        );
    }

    #[test]
    fn test_column_fingerprint_is_stable() {
        let a = column_fingerprint(["Column1", "Column2"]);
        let b = column_fingerprint(["Column1", "Column2"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_column_fingerprint_is_order_sensitive() {
        let a = column_fingerprint(["Column1", "Column2"]);
        let b = column_fingerprint(["Column2", "Column1"]);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_rows_count_queries_once() {
        let (mut core, state) = counting_core().await;
        assert_eq!(core.rows_count().await.unwrap(), 50);
        assert_eq!(core.rows_count().await.unwrap(), 50);
        assert_eq!(state.scalar_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reset_cache_forces_requery() {
        let (mut core, state) = counting_core().await;
        core.rows_count().await.unwrap();
        core.columns_count().await.unwrap();
        core.reset_cache();
        assert_eq!(core.rows_count().await.unwrap(), 50);
        assert_eq!(core.columns_count().await.unwrap(), 2);
        assert_eq!(state.scalar_calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.read_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_columns_count_uses_preview_once() {
        let (mut core, state) = counting_core().await;
        assert_eq!(core.columns_count().await.unwrap(), 2);
        assert_eq!(core.columns_count().await.unwrap(), 2);
        assert_eq!(state.read_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_interval_default_and_override() {
        let (mut core, _state) = counting_core().await;
        assert_eq!(core.cache_interval(), DEFAULT_CACHE_INTERVAL);
        core.set_cache_interval(30);
        assert_eq!(core.cache_interval(), 30);
    }
}

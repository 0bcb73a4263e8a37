//! Typed errors for the connectors crate.

use std::fmt;

/// Errors that can occur in data source connectors.
#[derive(Debug)]
pub enum ConnectorError {
    /// Invalid or missing configuration; surfaced before any connection attempt.
    ConfigError(String),
    /// No engine factory can handle the connection string.
    UnsupportedUri(String),
    /// Failed to establish a connection to the data source.
    ConnectionFailed(String),
    /// A query against the data source failed.
    QueryFailed(String),
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorError::ConfigError(msg) => write!(f, "config error: {}", msg),
            ConnectorError::UnsupportedUri(msg) => write!(f, "unsupported URI: {}", msg),
            ConnectorError::ConnectionFailed(msg) => write!(f, "connection failed: {}", msg),
            ConnectorError::QueryFailed(msg) => write!(f, "query failed: {}", msg),
        }
    }
}

impl std::error::Error for ConnectorError {}

impl From<sqlx::Error> for ConnectorError {
    fn from(e: sqlx::Error) -> Self {
        ConnectorError::ConnectionFailed(e.to_string())
    }
}

impl From<arrow::error::ArrowError> for ConnectorError {
    fn from(e: arrow::error::ArrowError) -> Self {
        ConnectorError::QueryFailed(e.to_string())
    }
}

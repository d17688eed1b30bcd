use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
}

/// Failures while writing an event row. The connection is released on every
/// one of these paths before the error reaches the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connect(#[source] tokio_postgres::Error),
    #[error("event insert failed: {0}")]
    Insert(#[source] tokio_postgres::Error),
    #[error("transaction commit failed: {0}")]
    Commit(#[source] tokio_postgres::Error),
    #[error("database unavailable: {0}")]
    Unavailable(String),
}

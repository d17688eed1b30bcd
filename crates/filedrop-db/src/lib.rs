pub mod config;
pub use config::AppConfig;

pub mod error;
pub use error::{ConfigError, StoreError};

pub mod store;
pub use store::{EventRecord, EventStore, PostgresEventStore};

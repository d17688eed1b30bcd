use crate::config::AppConfig;
use crate::error::StoreError;
use async_trait::async_trait;
use tokio_postgres::NoTls;

/// The row written downstream for each recorded upload. Created once per
/// successful invocation, never updated or deleted by this service.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub bucket_name: String,
    pub file_name: String,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Durably writes one event row. The password is resolved by the caller
    /// immediately before this call, so a rotated credential is picked up
    /// without a restart.
    async fn insert_event(&self, password: &str, record: &EventRecord) -> Result<(), StoreError>;
}

/// Writes events to Cloud SQL over its private address. Every invocation gets
/// its own connection; nothing is pooled or shared between invocations.
pub struct PostgresEventStore {
    user: String,
    host: String,
    dbname: String,
}

impl PostgresEventStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            user: config.db_user.clone(),
            host: config.db_host.clone(),
            dbname: config.db_name.clone(),
        }
    }

    fn connection_config(&self, password: &str) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .user(&self.user)
            .password(password)
            .host(&self.host)
            .dbname(&self.dbname);
        config
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert_event(&self, password: &str, record: &EventRecord) -> Result<(), StoreError> {
        let (mut client, connection) = self
            .connection_config(password)
            .connect(NoTls)
            .await
            .map_err(StoreError::Connect)?;

        // The connection runs on its own task and terminates when the client
        // is dropped, so the socket is released on the error paths below too.
        let io = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!("database connection error: {}", e);
            }
        });

        let result = async {
            let tx = client.transaction().await.map_err(StoreError::Connect)?;
            tx.execute(
                "INSERT INTO events (bucket_name, file_name) VALUES ($1, $2)",
                &[&record.bucket_name, &record.file_name],
            )
            .await
            .map_err(StoreError::Insert)?;
            tx.commit().await.map_err(StoreError::Commit)?;
            Ok(())
        }
        .await;

        drop(client);
        let _ = io.await;
        result
    }
}

use crate::envelope::{ParseError, PubsubMessage};
use crate::secrets::{SecretError, SecretStore};
use filedrop_db::{AppConfig, EventRecord, EventStore, StoreError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("could not parse notification: {0}")]
    Parse(#[from] ParseError),
    #[error("could not resolve database credential: {0}")]
    SecretAccess(#[from] SecretError),
    #[error("could not record event: {0}")]
    Persistence(#[from] StoreError),
}

/// Records one storage notification per delivered message:
/// decode → fetch credential → insert → commit.
///
/// No retries and no deduplication happen here; a failed invocation is
/// reported to the platform, and a redelivered message produces a second row.
pub struct EventRecorder<S, E> {
    config: AppConfig,
    secrets: S,
    store: E,
}

impl<S: SecretStore, E: EventStore> EventRecorder<S, E> {
    pub fn new(config: AppConfig, secrets: S, store: E) -> Self {
        Self {
            config,
            secrets,
            store,
        }
    }

    pub async fn handle(&self, message: &PubsubMessage) -> Result<(), RecorderError> {
        let notification = message.decode_notification()?;
        info!(
            "Processing file '{}' from bucket '{}'",
            notification.file, notification.bucket
        );

        // Fetched fresh on every invocation so a rotated password takes
        // effect immediately.
        let password = self
            .secrets
            .fetch(&self.config.secret_version_path())
            .await?;

        let record = EventRecord {
            bucket_name: notification.bucket,
            file_name: notification.file,
        };
        self.store.insert_event(&password, &record).await?;

        info!("Successfully recorded event for file: {}", record.file_name);
        Ok(())
    }
}

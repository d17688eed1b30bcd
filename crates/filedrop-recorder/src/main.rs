use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use filedrop_db::{AppConfig, PostgresEventStore};
use filedrop_recorder::envelope::PushEnvelope;
use filedrop_recorder::handler::{EventRecorder, RecorderError};
use filedrop_recorder::secrets::SecretManagerClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

type Recorder = EventRecorder<SecretManagerClient, PostgresEventStore>;

/// Pub/Sub push endpoint. A 2xx acknowledges the message; anything else lets
/// the subscription's redelivery/dead-letter policy take over.
async fn push(
    State(recorder): State<Arc<Recorder>>,
    Json(envelope): Json<PushEnvelope>,
) -> StatusCode {
    match recorder.handle(&envelope.message).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e @ RecorderError::Parse(_)) => {
            // A malformed message can never succeed on redelivery.
            error!("rejecting message {}: {}", envelope.message.message_id, e);
            StatusCode::BAD_REQUEST
        }
        Err(e) => {
            error!(
                "failed to process message {}: {}",
                envelope.message.message_id, e
            );
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        // Cloud Logging stamps ingestion time on every line.
        .without_time()
        .init();

    // Fail before accepting any message if the environment is incomplete.
    let config = AppConfig::from_env().context("invalid configuration")?;
    let store = PostgresEventStore::new(&config);
    let secrets = SecretManagerClient::new();
    let recorder = Arc::new(EventRecorder::new(config, secrets, store));

    let app = Router::new()
        .route("/", post(push))
        .route("/healthz", get(healthz))
        .with_state(recorder);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listen address")?;
    axum::serve(listener, app).await?;
    Ok(())
}

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to reach secret store: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("secret store returned {status} for {path}")]
    Status {
        status: reqwest::StatusCode,
        path: String,
    },
    #[error("secret payload is not valid base64: {0}")]
    Payload(#[from] base64::DecodeError),
    #[error("secret payload is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Access to a versioned secret by fully-qualified path, e.g.
/// `projects/{project}/secrets/{secret}/versions/latest`. Injected into the
/// handler so tests can substitute a stub.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn fetch(&self, version_path: &str) -> Result<String, SecretError>;
}

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const SECRET_MANAGER_BASE: &str = "https://secretmanager.googleapis.com/v1";

/// Secret Manager REST client authenticated through the instance metadata
/// server. Constructed once at startup and shared across invocations; it is a
/// stateless request/response client, so no coordination is needed.
pub struct SecretManagerClient {
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct AccessResponse {
    payload: SecretPayload,
}

#[derive(Deserialize)]
struct SecretPayload {
    data: String,
}

impl SecretManagerClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    async fn access_token(&self) -> Result<String, SecretError> {
        let resp = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SecretError::Status {
                status: resp.status(),
                path: METADATA_TOKEN_URL.to_string(),
            });
        }
        let token: TokenResponse = resp.json().await?;
        Ok(token.access_token)
    }
}

impl Default for SecretManagerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretStore for SecretManagerClient {
    async fn fetch(&self, version_path: &str) -> Result<String, SecretError> {
        let token = self.access_token().await?;
        let url = format!("{}/{}:access", SECRET_MANAGER_BASE, version_path);

        let resp = self.http.get(&url).bearer_auth(token).send().await?;
        if !resp.status().is_success() {
            return Err(SecretError::Status {
                status: resp.status(),
                path: version_path.to_string(),
            });
        }

        // The API returns the secret bytes base64-encoded; the password is
        // UTF-8 text.
        let body: AccessResponse = resp.json().await?;
        let bytes = STANDARD.decode(body.payload.data)?;
        Ok(String::from_utf8(bytes)?)
    }
}

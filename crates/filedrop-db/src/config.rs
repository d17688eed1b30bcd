use crate::error::ConfigError;
use std::env;

/// Runtime configuration, resolved from the environment once at startup and
/// handed to the handler as a value. Nothing reads the environment inline, so
/// a missing variable fails the process before any message is accepted.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gcp_project: String,
    pub db_password_secret: String,
    pub db_user: String,
    pub db_name: String,
    pub db_host: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary lookup. Tests use a map
    /// here instead of mutating process-wide environment state.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| match get(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingVar(name)),
        };

        Ok(Self {
            gcp_project: require("GCP_PROJECT")?,
            db_password_secret: require("DB_PASSWORD_SECRET")?,
            db_user: require("DB_USER")?,
            db_name: require("DB_NAME")?,
            db_host: require("DB_HOST")?,
        })
    }

    /// Fully-qualified Secret Manager path for the current database password.
    /// Always points at `latest` so a rotated credential takes effect on the
    /// next invocation.
    pub fn secret_version_path(&self) -> String {
        format!(
            "projects/{}/secrets/{}/versions/latest",
            self.gcp_project, self.db_password_secret
        )
    }
}

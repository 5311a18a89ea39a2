//! Service configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::driver::{DriverConfig, DEFAULT_OPERATION_TIMEOUT};
use crate::stripe::StripeDriver;

/// Places a Stripe secrets file is looked for, in order.
const STRIPE_SECRET_PATHS: [&str; 3] = [
    ".secrets/stripe.json",
    "tender/.secrets/stripe.json",
    "../.secrets/stripe.json",
];

/// Service configuration loaded from environment variables.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// `PostgreSQL` connection string.
    pub database_url: String,

    /// Maximum pooled database connections.
    pub database_max_connections: u32,

    /// Name of the payment driver to open (default: "stripe").
    pub payment_driver: String,

    /// Stripe access token (optional; the driver refuses to open without it).
    pub stripe_access_token: Option<String>,

    /// Stripe API root override.
    pub stripe_api_base: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Deadline for a single payment operation, in seconds.
    pub operation_timeout_seconds: u64,
}

/// Stripe secrets file structure.
#[derive(Debug, Deserialize)]
struct StripeSecrets {
    #[serde(alias = "api_key")]
    access_token: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),
            payment_driver: std::env::var("PAYMENT_DRIVER").unwrap_or(defaults.payment_driver),
            stripe_access_token: load_stripe_access_token(&STRIPE_SECRET_PATHS),
            stripe_api_base: std::env::var("STRIPE_API_BASE").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| parse_origins(&s))
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
            operation_timeout_seconds: env_parse("OPERATION_TIMEOUT_SECONDS")
                .unwrap_or(defaults.operation_timeout_seconds),
        }
    }

    /// Settings for opening the configured driver.
    #[must_use]
    pub fn driver_config(&self) -> DriverConfig {
        let (credential, api_base) = if self.payment_driver == StripeDriver::NAME {
            (
                self.stripe_access_token.clone(),
                self.stripe_api_base.clone(),
            )
        } else {
            (None, None)
        };

        DriverConfig {
            credential,
            api_base,
            operation_timeout: Duration::from_secs(self.operation_timeout_seconds),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            database_url: "postgres://localhost/tender".into(),
            database_max_connections: 10,
            payment_driver: StripeDriver::NAME.into(),
            stripe_access_token: None,
            stripe_api_base: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
            operation_timeout_seconds: DEFAULT_OPERATION_TIMEOUT.as_secs(),
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("listen_addr", &self.listen_addr)
            .field("database_max_connections", &self.database_max_connections)
            .field("payment_driver", &self.payment_driver)
            .field(
                "stripe_access_token",
                &self.stripe_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("stripe_api_base", &self.stripe_api_base)
            .field("cors_origins", &self.cors_origins)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("operation_timeout_seconds", &self.operation_timeout_seconds)
            .finish_non_exhaustive()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Load the Stripe access token from the environment or a secrets file.
///
/// `STRIPE_ACCESS_TOKEN` wins, then `STRIPE_API_KEY`, then the first readable
/// secrets file.
fn load_stripe_access_token(secret_paths: &[&str]) -> Option<String> {
    if let Some(token) = ["STRIPE_ACCESS_TOKEN", "STRIPE_API_KEY"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
    {
        return Some(token);
    }

    for path in secret_paths {
        match load_secrets_file::<StripeSecrets>(Path::new(path)) {
            Ok(secrets) => {
                tracing::info!(path = %path, "Loaded Stripe secrets from file");
                return Some(secrets.access_token);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path, error = %e, "Ignoring unreadable secrets file"),
        }
    }

    tracing::debug!("No Stripe access token configured");
    None
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, std::io::Error> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn secrets_file_accepts_both_key_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"api_key":"sk_test_file"}}"#).unwrap();

        let secrets: StripeSecrets = load_secrets_file(file.path()).unwrap();
        assert_eq!(secrets.access_token, "sk_test_file");
    }

    #[test]
    fn malformed_secrets_file_is_invalid_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_secrets_file::<StripeSecrets>(file.path()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_secrets_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_secrets_file::<StripeSecrets>(&dir.path().join("stripe.json")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn origins_are_trimmed() {
        assert_eq!(
            parse_origins("https://a.example, https://b.example ,"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn driver_config_carries_stripe_settings() {
        let config = ServiceConfig {
            stripe_access_token: Some("sk_test_xxx".into()),
            stripe_api_base: Some("http://127.0.0.1:1/v1".into()),
            operation_timeout_seconds: 5,
            ..ServiceConfig::default()
        };

        let driver = config.driver_config();
        assert_eq!(driver.credential.as_deref(), Some("sk_test_xxx"));
        assert_eq!(driver.api_base.as_deref(), Some("http://127.0.0.1:1/v1"));
        assert_eq!(driver.operation_timeout, Duration::from_secs(5));
    }

    #[test]
    fn debug_redacts_access_token() {
        let config = ServiceConfig {
            stripe_access_token: Some("sk_live_secret".into()),
            ..ServiceConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk_live_secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}

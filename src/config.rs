//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_TOKEN_STORE_PATH: &str = ".inventory-client/session.json";
const DEFAULT_OAUTH_AUTHORIZE_URL: &str = "http://localhost:8000/o/authorize/";
const DEFAULT_OAUTH_REDIRECT_URI: &str = "http://localhost:5173/auth/google/callback";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// REST backend root; endpoint paths are appended to it
    pub api_base_url: String,
    /// File holding the persisted credentials
    pub token_store_path: PathBuf,
    /// Per-request transport timeout
    pub request_timeout: Duration,

    // --- OAuth redirect flow ---
    /// Provider authorization endpoint
    pub oauth_authorize_url: String,
    /// OAuth client ID (required only to start the redirect flow)
    pub oauth_client_id: Option<String>,
    /// Callback view the provider redirects back to
    pub oauth_redirect_uri: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_store_path: PathBuf::from(DEFAULT_TOKEN_STORE_PATH),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            oauth_authorize_url: DEFAULT_OAUTH_AUTHORIZE_URL.to_string(),
            oauth_client_id: Some("test_client_id".to_string()),
            oauth_redirect_uri: DEFAULT_OAUTH_REDIRECT_URI.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = env::var("API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        validate_url("API_BASE_URL", &api_base_url)?;

        let oauth_authorize_url = env::var("OAUTH_AUTHORIZE_URL")
            .unwrap_or_else(|_| DEFAULT_OAUTH_AUTHORIZE_URL.to_string());
        validate_url("OAUTH_AUTHORIZE_URL", &oauth_authorize_url)?;

        let oauth_redirect_uri = env::var("OAUTH_REDIRECT_URI")
            .unwrap_or_else(|_| DEFAULT_OAUTH_REDIRECT_URI.to_string());
        validate_url("OAUTH_REDIRECT_URI", &oauth_redirect_uri)?;

        Ok(Self {
            api_base_url,
            token_store_path: env::var("TOKEN_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_STORE_PATH)),
            request_timeout: Duration::from_secs(
                env::var("REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            oauth_authorize_url,
            oauth_client_id: env::var("OAUTH_CLIENT_ID")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            oauth_redirect_uri,
        })
    }

    /// OAuth client ID, required to start the redirect flow.
    pub fn require_oauth_client_id(&self) -> Result<&str, ConfigError> {
        self.oauth_client_id
            .as_deref()
            .ok_or(ConfigError::Missing("OAUTH_CLIENT_ID"))
    }
}

fn validate_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    reqwest::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid(name, e.to_string()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set env vars for test
        env::set_var("API_BASE_URL", "http://backend.test/api/");
        env::set_var("REQUEST_TIMEOUT_SECS", "not-a-number");
        env::set_var("OAUTH_CLIENT_ID", "  client-123 ");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "http://backend.test/api");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.require_oauth_client_id().unwrap(), "client-123");
    }

    #[test]
    fn test_missing_client_id() {
        let config = Config {
            oauth_client_id: None,
            ..Config::default()
        };
        assert!(matches!(
            config.require_oauth_client_id(),
            Err(ConfigError::Missing("OAUTH_CLIENT_ID"))
        ));
    }
}

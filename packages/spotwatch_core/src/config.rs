//! Runtime configuration for the upstream API connection.
//!
//! The credential is required: the original deployment shipped a
//! hard-coded fallback key, which is a misconfiguration, not a default.
//! A missing or empty key fails closed at startup.

use std::env;

use thiserror::Error;

/// Default base URL of the iotebe REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.iotebe.com/v2";

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "SPOTWATCH_API_KEY";

/// Environment variable overriding the API base URL.
pub const BASE_URL_VAR: &str = "SPOTWATCH_BASE_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing API key: set SPOTWATCH_API_KEY")]
    MissingApiKey,

    #[error("API key must not be empty")]
    EmptyApiKey,
}

/// Connection settings for the upstream API.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ApiConfig {
    /// Build a config with the default base URL.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
        })
    }

    /// Read configuration from the environment. The key has no
    /// fallback; the base URL may be overridden for testing against a
    /// different deployment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var(API_KEY_VAR).map_err(|_| ConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key)?;
        if let Ok(base_url) = env::var(BASE_URL_VAR) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url.trim_end_matches('/').to_string();
            }
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_fails_closed() {
        assert!(matches!(ApiConfig::new(""), Err(ConfigError::EmptyApiKey)));
        assert!(matches!(ApiConfig::new("   "), Err(ConfigError::EmptyApiKey)));
    }

    #[test]
    fn test_new_uses_default_base_url() {
        let config = ApiConfig::new("key-123").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_key, "key-123");
    }

    #[test]
    fn test_base_url_override_strips_trailing_slash() {
        let config = ApiConfig::new("key-123")
            .unwrap()
            .with_base_url("http://localhost:9000/");
        assert_eq!(config.base_url, "http://localhost:9000");
    }
}

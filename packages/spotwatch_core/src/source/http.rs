//! HTTP source backed by the iotebe REST API.
//!
//! One authenticated GET per operation; the credential travels as a
//! default `x-api-key` header on every request and is marked sensitive
//! so it never appears in debug output.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use super::{SourceError, SpotSource};
use crate::config::ApiConfig;
use crate::types::{Reading, Spot};

/// Header carrying the API credential.
const API_KEY_HEADER: &str = "x-api-key";

/// Upper bound on any single request; the poll cadence is 10 s, so a
/// response slower than this is treated as a failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpSource {
    client: reqwest::Client,
    config: ApiConfig,
}

impl HttpSource {
    pub fn new(config: ApiConfig) -> Result<Self, SourceError> {
        let mut key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| SourceError::Network(format!("invalid API key header: {e}")))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn spots_url(&self) -> String {
        format!("{}/spot", self.config.base_url)
    }

    fn data_url(&self, spot_id: &str) -> String {
        format!(
            "{}/spot/{}/ng1vt/global_data/data",
            self.config.base_url, spot_id
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SpotSource for HttpSource {
    async fn spots(&self) -> Result<Vec<Spot>, SourceError> {
        self.get_json(&self.spots_url()).await
    }

    async fn latest_reading(&self, spot_id: &str) -> Result<Option<Reading>, SourceError> {
        // The endpoint returns readings newest-first; only the head is
        // consumed. An empty array means no data yet.
        let readings: Vec<Reading> = self.get_json(&self.data_url(spot_id)).await?;
        Ok(readings.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_source() -> HttpSource {
        HttpSource::new(ApiConfig::new("test-key").unwrap()).unwrap()
    }

    #[test]
    fn test_spots_url() {
        let source = make_source();
        assert_eq!(source.spots_url(), "https://api.iotebe.com/v2/spot");
    }

    #[test]
    fn test_data_url_is_parameterized_by_spot_id() {
        let source = make_source();
        assert_eq!(
            source.data_url("abc-123"),
            "https://api.iotebe.com/v2/spot/abc-123/ng1vt/global_data/data"
        );
    }

    #[test]
    fn test_base_url_override_flows_into_urls() {
        let config = ApiConfig::new("test-key")
            .unwrap()
            .with_base_url("http://localhost:9000");
        let source = HttpSource::new(config).unwrap();
        assert_eq!(source.spots_url(), "http://localhost:9000/spot");
    }

    #[test]
    fn test_rejects_non_ascii_api_key() {
        let config = ApiConfig::new("chave\ncom-quebra").unwrap();
        assert!(HttpSource::new(config).is_err());
    }
}

//! Upstream data sources
//!
//! Defines the abstract source interface consumed by the directory
//! loader and the reading poller, the HTTP implementation against the
//! iotebe REST API, and an in-process simulated source for testing.

pub mod http;
pub mod simulated;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Reading, Spot};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Network(String),

    #[error("Upstream returned status {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    Decode(String),
}

/// A provider of the spot directory and per-spot readings.
///
/// Implementations include:
/// - HttpSource against the real API
/// - SimSource for in-process testing
#[async_trait]
pub trait SpotSource: Send + Sync {
    /// Fetch the directory of available spots.
    async fn spots(&self) -> Result<Vec<Spot>, SourceError>;

    /// Fetch the most recent reading for a spot. `Ok(None)` means the
    /// spot currently has no data, which is not an error.
    async fn latest_reading(&self, spot_id: &str) -> Result<Option<Reading>, SourceError>;
}

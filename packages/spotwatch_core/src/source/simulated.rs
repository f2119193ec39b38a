//! In-process simulated source
//!
//! Serves scripted directory and reading responses entirely in-process.
//! Used for integration testing the loader and poller without the real
//! API: latency, outages and reading sequences are all controllable
//! from the test.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SourceError, SpotSource};
use crate::types::{Reading, Spot};

pub struct SimSource {
    spots: RwLock<Vec<Spot>>,
    /// Per-spot reading queues, newest-first like the real endpoint.
    readings: RwLock<HashMap<String, Vec<Reading>>>,
    /// Simulated response latency applied to each call.
    /// Uses tokio virtual time, so paused clocks advance instantly in tests.
    latency: RwLock<Duration>,
    fail_spots: AtomicBool,
    fail_readings: AtomicBool,
    reading_fetches: AtomicU32,
}

impl SimSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            spots: RwLock::new(Vec::new()),
            readings: RwLock::new(HashMap::new()),
            latency: RwLock::new(Duration::ZERO),
            fail_spots: AtomicBool::new(false),
            fail_readings: AtomicBool::new(false),
            reading_fetches: AtomicU32::new(0),
        })
    }

    pub async fn set_spots(&self, spots: Vec<Spot>) {
        *self.spots.write().await = spots;
    }

    /// Replace the reading served for a spot. The newest reading goes
    /// to the head of the queue, as upstream does.
    pub async fn set_reading(&self, spot_id: &str, reading: Reading) {
        let mut readings = self.readings.write().await;
        let queue = readings.entry(spot_id.to_string()).or_default();
        queue.insert(0, reading);
    }

    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    pub fn set_fail_spots(&self, fail: bool) {
        self.fail_spots.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_readings(&self, fail: bool) {
        self.fail_readings.store(fail, Ordering::SeqCst);
    }

    /// Number of reading fetches issued so far, failures included.
    pub fn reading_fetches(&self) -> u32 {
        self.reading_fetches.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.read().await;
        if latency > Duration::ZERO {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl SpotSource for SimSource {
    async fn spots(&self) -> Result<Vec<Spot>, SourceError> {
        self.simulate_latency().await;
        if self.fail_spots.load(Ordering::SeqCst) {
            return Err(SourceError::Network("simulated outage".to_string()));
        }
        Ok(self.spots.read().await.clone())
    }

    async fn latest_reading(&self, spot_id: &str) -> Result<Option<Reading>, SourceError> {
        self.reading_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if self.fail_readings.load(Ordering::SeqCst) {
            return Err(SourceError::Network("simulated outage".to_string()));
        }
        let readings = self.readings.read().await;
        Ok(readings
            .get(spot_id)
            .and_then(|queue| queue.first())
            .cloned())
    }
}

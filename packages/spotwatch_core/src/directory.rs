//! Spot directory loading
//!
//! One-shot fetch of the list of available spots, performed once per
//! process lifetime. A failure leaves the directory empty and surfaces
//! a user-facing message; there is no retry and no polling. Consumers
//! observe the load through a watch channel.

use std::sync::Arc;

use tokio::sync::watch;

use crate::source::{SourceError, SpotSource};
use crate::types::Spot;

/// User-facing message when the directory cannot be loaded.
const LOAD_FAILED_MESSAGE: &str = "Failed to load collection spots. Try again.";

/// Observable state of the directory load.
#[derive(Clone, Debug, Default)]
pub struct DirectoryState {
    /// True while the load is in flight.
    pub loading: bool,
    /// Available spots; empty until the load succeeds.
    pub spots: Vec<Spot>,
    /// User-facing message for a failed load.
    pub error: Option<String>,
}

impl DirectoryState {
    /// Spot selection is only meaningful once the directory has loaded
    /// something to select from.
    pub fn selection_enabled(&self) -> bool {
        !self.loading && !self.spots.is_empty()
    }
}

pub struct SpotDirectory {
    source: Arc<dyn SpotSource>,
    state_tx: watch::Sender<DirectoryState>,
}

impl SpotDirectory {
    pub fn new(source: Arc<dyn SpotSource>) -> Self {
        let (state_tx, _) = watch::channel(DirectoryState::default());
        Self { source, state_tx }
    }

    /// Subscribe to directory state changes.
    pub fn subscribe(&self) -> watch::Receiver<DirectoryState> {
        self.state_tx.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> DirectoryState {
        self.state_tx.borrow().clone()
    }

    /// Load the directory. Intended to be called once at startup; a
    /// failure does not block the rest of the application, it just
    /// keeps selection disabled.
    pub async fn load(&self) -> Result<Vec<Spot>, SourceError> {
        self.state_tx.send_replace(DirectoryState {
            loading: true,
            ..Default::default()
        });

        match self.source.spots().await {
            Ok(spots) => {
                self.state_tx.send_replace(DirectoryState {
                    loading: false,
                    spots: spots.clone(),
                    error: None,
                });
                Ok(spots)
            }
            Err(e) => {
                log::warn!("Spot directory load failed: {}", e);
                self.state_tx.send_replace(DirectoryState {
                    loading: false,
                    spots: Vec::new(),
                    error: Some(LOAD_FAILED_MESSAGE.to_string()),
                });
                Err(e)
            }
        }
    }
}

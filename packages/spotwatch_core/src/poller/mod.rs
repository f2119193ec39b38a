//! Spot reading poller
//!
//! Recurring fetch of the most recent reading for the selected spot.
//! Exactly one polling cycle is active per selection; changing the
//! selection tears the previous cycle down before the next one starts.
//! The delay timer is rearmed only after each fetch settles, so a slow
//! response can never overlap the next fetch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, RwLock};
use uuid::Uuid;

use crate::source::SpotSource;
use crate::types::Reading;

/// User-facing message when a reading fetch fails.
const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data for the selected spot.";

/// Polling cadence configuration.
#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Delay between a fetch settling and the next fetch being issued.
    pub poll_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
        }
    }
}

/// Observable state of the active polling cycle.
#[derive(Clone, Debug, Default)]
pub struct PollState {
    /// Currently selected spot, if any.
    pub selected: Option<String>,
    /// Most recent reading fetched for the selection.
    pub latest: Option<Reading>,
    /// True while a fetch is in flight.
    pub loading: bool,
    /// User-facing message for the last fetch failure.
    pub error: Option<String>,
}

/// One active polling cycle. Holds the shutdown handle created when the
/// cycle started; teardown signals this handle and never a later
/// cycle's.
struct Cycle {
    id: Uuid,
    spot_id: String,
    shutdown_tx: broadcast::Sender<()>,
}

pub struct SpotPoller {
    source: Arc<dyn SpotSource>,
    config: PollConfig,
    state_tx: watch::Sender<PollState>,
    /// The cycle currently allowed to mutate state. Fetch results
    /// carry the id of the cycle that issued them; results from any
    /// other cycle are discarded.
    cycle: RwLock<Option<Cycle>>,
}

impl SpotPoller {
    /// Create a new poller in the idle state.
    ///
    /// Returns `Arc<Self>` because `select` spawns cycle tasks that
    /// hold a reference.
    pub fn new(source: Arc<dyn SpotSource>, config: PollConfig) -> Arc<Self> {
        let (state_tx, _) = watch::channel(PollState::default());
        Arc::new(Self {
            source,
            config,
            state_tx,
            cycle: RwLock::new(None),
        })
    }

    /// Subscribe to poll state changes.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state_tx.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> PollState {
        self.state_tx.borrow().clone()
    }

    /// Change the selection.
    ///
    /// Tears down the active cycle (if any), clears the stored reading
    /// and error before the new cycle's first fetch resolves, and
    /// starts a new cycle with an immediate fetch when a spot id is
    /// given. Re-selecting the already-selected spot is a no-op; the
    /// live cycle keeps running.
    pub async fn select(self: &Arc<Self>, spot_id: Option<String>) {
        if let Some(id) = &spot_id {
            let cycle = self.cycle.read().await;
            if cycle.as_ref().map_or(false, |c| c.spot_id == *id) {
                return;
            }
        }

        self.stop_cycle().await;

        match spot_id {
            None => {
                self.state_tx.send_replace(PollState::default());
            }
            Some(id) => {
                let cycle_id = Uuid::new_v4();
                self.state_tx.send_replace(PollState {
                    selected: Some(id.clone()),
                    latest: None,
                    loading: true,
                    error: None,
                });

                let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
                *self.cycle.write().await = Some(Cycle {
                    id: cycle_id,
                    spot_id: id.clone(),
                    shutdown_tx,
                });
                tokio::spawn(run_cycle(Arc::clone(self), cycle_id, id, shutdown_rx));
            }
        }
    }

    /// View teardown: cancel the pending reschedule timer and issue no
    /// further fetches. State is left as-is.
    pub async fn shutdown(&self) {
        self.stop_cycle().await;
    }

    async fn stop_cycle(&self) {
        let cycle = self.cycle.write().await.take();
        if let Some(cycle) = cycle {
            // Signals the handle captured at cycle creation. An
            // in-flight fetch is not recalled; its result dies at the
            // cycle-id guard instead.
            let _ = cycle.shutdown_tx.send(());
        }
    }

    /// Apply a state mutation only if `cycle_id` is still the active
    /// cycle. Returns false when the result is stale.
    async fn update_if_current(&self, cycle_id: Uuid, f: impl FnOnce(&mut PollState)) -> bool {
        let cycle = self.cycle.read().await;
        match cycle.as_ref() {
            Some(active) if active.id == cycle_id => {
                self.state_tx.send_modify(f);
                true
            }
            _ => false,
        }
    }
}

/// One polling cycle: fetch, commit (unless stale), wait, repeat.
async fn run_cycle(
    poller: Arc<SpotPoller>,
    cycle_id: Uuid,
    spot_id: String,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        if !poller.update_if_current(cycle_id, |s| s.loading = true).await {
            return;
        }

        let fetched = poller.source.latest_reading(&spot_id).await;

        let committed = match fetched {
            Ok(reading) => {
                poller
                    .update_if_current(cycle_id, |s| {
                        s.latest = reading;
                        s.error = None;
                        s.loading = false;
                    })
                    .await
            }
            Err(e) => {
                log::warn!("Reading fetch for spot {} failed: {}", spot_id, e);
                poller
                    .update_if_current(cycle_id, |s| {
                        s.error = Some(FETCH_FAILED_MESSAGE.to_string());
                        s.loading = false;
                    })
                    .await
            }
        };
        if !committed {
            // Selection moved on while the fetch was in flight.
            return;
        }

        // Settle-then-reschedule: the next fetch is issued only after
        // this one settled and the full interval elapsed. A failed
        // fetch rearms the timer the same way, so a single failure
        // never terminates the loop.
        tokio::select! {
            _ = tokio::time::sleep(poller.config.poll_interval) => {}
            _ = shutdown.recv() => return,
        }
    }
}

//! End-to-end dashboard flow over the simulated source: load the
//! directory, select a spot, poll its readings, normalize the
//! timestamp for display, switch spots, tear down.
//!
//! Run with:
//!   cargo test --test spot_dashboard

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;

use spotwatch::directory::SpotDirectory;
use spotwatch::poller::{PollConfig, SpotPoller};
use spotwatch::source::simulated::SimSource;
use spotwatch::timestamp;
use spotwatch::types::{Reading, Spot};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_spot(id: &str, name: &str) -> Spot {
    Spot {
        spot_id: id.to_string(),
        spot_name: name.to_string(),
    }
}

fn make_reading(timestamp: serde_json::Value, temperature: f64) -> Reading {
    Reading {
        timestamp,
        temperature: Some(temperature),
        ..Default::default()
    }
}

async fn make_populated_source() -> Arc<SimSource> {
    let source = SimSource::new();
    source
        .set_spots(vec![
            make_spot("spot-1", "Pump house"),
            make_spot("spot-2", "Compressor"),
        ])
        .await;
    // spot-1 sends epoch seconds, spot-2 an unmarked ISO string; both
    // must normalize.
    source
        .set_reading("spot-1", make_reading(json!(1_700_000_000), 20.5))
        .await;
    source
        .set_reading("spot-2", make_reading(json!("2023-11-14T19:00:00"), 30.5))
        .await;
    source
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_full_dashboard_flow() {
    let source = make_populated_source().await;

    // Startup: one directory load.
    let directory = SpotDirectory::new(source.clone());
    let spots = directory.load().await.unwrap();
    assert_eq!(spots.len(), 2);
    assert!(directory.state().selection_enabled());

    // Select the first spot and let its first fetch settle.
    let poller = SpotPoller::new(source.clone(), PollConfig::default());
    poller.select(Some(spots[0].spot_id.clone())).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let state = poller.state();
    let reading = state.latest.as_ref().expect("first fetch must land");
    assert_eq!(reading.temperature, Some(20.5));

    // The raw seconds epoch renders as a calendar instant at UTC-3.
    let now = Utc.with_ymd_and_hms(2023, 11, 14, 22, 30, 0).unwrap();
    let headline = timestamp::normalize_at(&reading.timestamp, now);
    assert_eq!(headline, "14/11/2023 19:13:20");

    // Auto-refresh keeps fetching on the 10 s cadence.
    tokio::time::sleep(Duration::from_secs(25)).await;
    assert!(source.reading_fetches() >= 3);

    // Switch to the second spot; its ISO timestamp normalizes too.
    poller.select(Some(spots[1].spot_id.clone())).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    let state = poller.state();
    assert_eq!(state.selected.as_deref(), Some("spot-2"));
    let reading = state.latest.as_ref().expect("second spot fetch must land");
    assert_eq!(reading.temperature, Some(30.5));
    let headline = timestamp::normalize_at(&reading.timestamp, now);
    assert!(headline.starts_with("14/11/2023"), "got {headline}");

    // Teardown: no further fetches.
    poller.shutdown().await;
    let fetches = source.reading_fetches();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.reading_fetches(), fetches);
}

#[tokio::test(start_paused = true)]
async fn test_directory_outage_disables_selection_but_not_the_rest() {
    let source = make_populated_source().await;
    source.set_fail_spots(true);

    let directory = SpotDirectory::new(source.clone());
    assert!(directory.load().await.is_err());

    let state = directory.state();
    assert!(state.spots.is_empty());
    assert!(!state.selection_enabled());
    assert!(state.error.is_some());

    // The poller still works if a selection arrives by other means.
    let poller = SpotPoller::new(source.clone(), PollConfig::default());
    poller.select(Some("spot-1".into())).await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(poller.state().latest.is_some());
}

//! spotwatch: terminal view over the spot monitoring core.
//!
//! Thin view binding: renders loader/poller state and forwards the
//! user's selection. All acquisition and normalization logic lives in
//! the `spotwatch` library.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use spotwatch::config::ApiConfig;
use spotwatch::directory::SpotDirectory;
use spotwatch::poller::{PollConfig, PollState, SpotPoller};
use spotwatch::source::http::HttpSource;
use spotwatch::timestamp;
use spotwatch::types::Reading;

#[derive(Parser)]
#[command(name = "spotwatch", about = "Dashboard for iotebe collection spots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available collection spots.
    Spots,
    /// Poll a spot and render its latest reading until Ctrl-C.
    Watch {
        /// Spot id, as listed by `spots`.
        spot_id: String,
        /// Seconds between a fetch settling and the next fetch.
        #[arg(long, default_value_t = 10)]
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = ApiConfig::from_env().context("reading configuration")?;
    let source = Arc::new(HttpSource::new(config)?);

    match cli.command {
        Command::Spots => list_spots(source).await,
        Command::Watch {
            spot_id,
            interval_secs,
        } => watch_spot(source, spot_id, interval_secs).await,
    }
}

async fn list_spots(source: Arc<HttpSource>) -> anyhow::Result<()> {
    let directory = SpotDirectory::new(source);
    let Ok(spots) = directory.load().await else {
        let message = directory
            .state()
            .error
            .unwrap_or_else(|| "Failed to load collection spots.".to_string());
        anyhow::bail!(message);
    };

    if spots.is_empty() {
        println!("No collection spots available.");
        return Ok(());
    }
    for spot in spots {
        println!("{}  {}", spot.spot_id, spot.spot_name);
    }
    Ok(())
}

async fn watch_spot(
    source: Arc<HttpSource>,
    spot_id: String,
    interval_secs: u64,
) -> anyhow::Result<()> {
    let config = PollConfig {
        poll_interval: Duration::from_secs(interval_secs),
    };
    let poller = SpotPoller::new(source, config);
    let mut states = poller.subscribe();

    log::info!("watching spot {} every {}s", spot_id, interval_secs);
    poller.select(Some(spot_id)).await;

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                render(&state);
            }
            _ = tokio::signal::ctrl_c() => {
                poller.shutdown().await;
                break;
            }
        }
    }
    Ok(())
}

/// Render a settled poll state. In-flight states are skipped so the
/// display only ever shows whole readings.
fn render(state: &PollState) {
    if state.loading {
        return;
    }
    if let Some(message) = &state.error {
        println!("{message}");
        return;
    }
    match &state.latest {
        None => println!("No data for this spot yet."),
        Some(reading) => print_reading(reading),
    }
}

fn print_reading(reading: &Reading) {
    println!("Reading at {}", timestamp::normalize(&reading.timestamp));
    print_row("Temperature (°C)", reading.temperature);
    print_row("Acceleration axial", reading.acceleration_axial);
    print_row("Acceleration horizontal", reading.acceleration_horizontal);
    print_row("Acceleration vertical", reading.acceleration_vertical);
    print_row("Velocity axial", reading.velocity_axial);
    print_row("Velocity horizontal", reading.velocity_horizontal);
    print_row("Velocity vertical", reading.velocity_vertical);
    println!();
}

fn print_row(label: &str, value: Option<f64>) {
    let rendered = value
        .map(|v| v.to_string())
        .unwrap_or_else(|| timestamp::PLACEHOLDER.to_string());
    println!("  {label:<24} {rendered}");
}

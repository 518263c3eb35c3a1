//! NavSession - live navigation session runner
//!
//! CLI entry point for driving a navigation session from the terminal.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;

use navsession::cli::{Cli, Command, get_log_path};
use navsession::config::Config;
use navsession::routing::{CannedRouteClient, DEMO_SHAPE, RouteClient, ValhallaClient};
use navsession::session::{NavigationSession, SessionHandle};
use navsession::{Coordinate, SessionSnapshot, SimulatedPositionSource};

fn setup_logging(verbose: bool) -> Result<()> {
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Write to the log file, not stdout: stdout belongs to the session output
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        "NavSession loaded config: backend={}, costing={}",
        config.routing.base_url, config.routing.costing
    );

    match cli.command {
        Command::Run { start, dest } => {
            let router: Arc<dyn RouteClient> =
                Arc::new(ValhallaClient::from_config(&config.routing).context("Failed to create routing client")?);
            cmd_session(&config, router, start, dest).await
        }
        Command::Simulate { start, dest } => {
            let router: Arc<dyn RouteClient> = Arc::new(CannedRouteClient::demo());
            cmd_session(&config, router, start, dest).await
        }
        Command::Decode { path } => cmd_decode(path.as_deref()),
    }
}

/// Run one session to its terminal state, printing every transition
async fn cmd_session(config: &Config, router: Arc<dyn RouteClient>, start: Coordinate, dest: Coordinate) -> Result<()> {
    println!("Navigating from {},{} to {},{}", start.lat, start.lon, dest.lat, dest.lon);
    println!();

    let source = SimulatedPositionSource::new(start, dest, config.simulation.clone());
    let handle = NavigationSession::start(dest, &source, router, config.session.clone());

    tokio::select! {
        result = drive_session(&handle) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nInterrupted, cancelling session...");
            handle.cancel().await;
            println!("Session cancelled");
            Ok(())
        }
    }
}

/// Print snapshot transitions until the session ends
async fn drive_session(handle: &SessionHandle) -> Result<()> {
    let mut rx = handle.subscribe();
    let mut shown_route = false;

    loop {
        let snapshot = rx.borrow_and_update().clone();

        match &snapshot {
            SessionSnapshot::Idle => {}
            SessionSnapshot::Loading => {
                println!("Fetching route...");
            }
            SessionSnapshot::Active(route) => {
                if shown_route {
                    println!("Rerouted: {} points from fix #{}", route.path.len(), route.anchor.seq);
                } else {
                    shown_route = true;
                    println!("Route active: {} points", route.path.len());
                    for instruction in &route.instructions {
                        println!("  - {}", instruction);
                    }
                }
            }
            SessionSnapshot::Error { fault } => {
                println!("\n✗ Session failed: {}", fault);
                std::process::exit(1);
            }
            SessionSnapshot::Finished => {
                println!("\n✓ You have arrived");
                return Ok(());
            }
        }

        if rx.changed().await.is_err() {
            // Controller gone without a terminal snapshot; nothing to show
            return Ok(());
        }
    }
}

/// Decode an encoded path string and print the coordinates
fn cmd_decode(path: Option<&str>) -> Result<()> {
    let encoded = path.unwrap_or(DEMO_SHAPE);
    let points = pathcodec::decode(encoded).context("Failed to decode path")?;

    println!("{} points:", points.len());
    for point in &points {
        println!("  {:.5}, {:.5}", point.lat, point.lon);
    }

    Ok(())
}

//! Monitor Relay Server
//!
//! Reads the serial sensor and pushes every line to connected browsers.
//!
//! Run with: cargo run --bin monitor -- --serial-path /dev/ttyACM0
//!
//! # Configuration
//!
//! Settings come from the config file (see `monitor-cli config`), then
//! `MONITOR_*` environment variables, then the flags below.

use clap::Parser;
use monitor::api::{serve_with_shutdown, shutdown_signal, AppState};
use monitor::config::Config;
use monitor::relay::{Relay, RelayStats};
use monitor::serial::LineReader;
use monitor::websocket::{CloseReason, ConnectionHub};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;

#[derive(Parser)]
#[command(name = "monitor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Relay a serial temperature sensor to live browser charts")]
struct Args {
    /// Config file (default: search standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device path
    #[arg(long)]
    serial_path: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    baud_rate: Option<u32>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory served to non-WebSocket requests
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;

    monitor::logging::init(&config.logging);

    tracing::info!("Starting monitor relay v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        serial = %config.serial.path,
        baud_rate = config.serial.baud_rate,
        static_dir = ?config.server.static_dir,
        "Configuration loaded"
    );

    let hub = Arc::new(ConnectionHub::new(config.hub.clone()));
    let stats = Arc::new(RelayStats::default());

    // Open the device before accepting clients; failure is fatal
    let reader = LineReader::open(&config.serial)?;

    let relay = Relay::new(Arc::clone(&hub), Arc::clone(&stats));
    let (relay_done_tx, relay_done_rx) = oneshot::channel::<()>();
    let relay_task = tokio::spawn(async move {
        let result = relay.run(reader).await;
        let _ = relay_done_tx.send(());
        result
    });

    let shutdown = {
        let hub = Arc::clone(&hub);
        async move {
            tokio::select! {
                _ = shutdown_signal() => {}
                _ = relay_done_rx => {
                    tracing::warn!("Relay stopped, shutting down server");
                }
            }
            hub.close_all(CloseReason::ServerShutdown).await;
        }
    };

    let state = AppState::new(Arc::clone(&hub), stats, config.server.clone());
    serve_with_shutdown(state, &config.server, shutdown).await?;

    if !relay_task.is_finished() {
        relay_task.abort();
    }
    match relay_task.await {
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Monitor relay stopped with an error");
            return Err(e.into());
        }
        Ok(Ok(())) => {}
        Err(e) if e.is_cancelled() => {}
        Err(e) => return Err(e.into()),
    }

    tracing::info!("Monitor relay stopped");
    Ok(())
}

/// Resolve configuration: file, then environment, then flags
fn load_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    if let Some(path) = &args.serial_path {
        config.serial.path = path.clone();
    }
    if let Some(baud) = args.baud_rate {
        config.serial.baud_rate = baud;
    }
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = &args.static_dir {
        config.server.static_dir = dir.clone();
    }

    Ok(config)
}

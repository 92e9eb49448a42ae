//! Monitor CLI
//!
//! Command-line companion for a running relay:
//! - Follow the live temperature feed
//! - Check relay status
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use monitor::api::dto::HealthResponse;
use monitor::client::{watch, OutputFormat};
use monitor::config::{generate_default_config, LoggingConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "monitor-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Companion tools for the serial temperature monitor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Relay server URL
    #[arg(long, default_value = "http://localhost:3000", global = true)]
    pub server_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Follow the live temperature feed
    Watch,

    /// Show relay status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    monitor::logging::init(&LoggingConfig {
        level: "warn".to_string(),
        ..LoggingConfig::default()
    });

    match cli.command {
        Commands::Watch => {
            let url = websocket_url(&cli.server_url);
            let format = OutputFormat::parse(&cli.format);
            let mut stdout = std::io::stdout();

            let points = watch(&url, format, &mut stdout)
                .await
                .with_context(|| format!("watching {}", url))?;
            eprintln!("Connection closed after {} readings", points);
        }

        Commands::Status => {
            let url = format!("{}/health", cli.server_url.trim_end_matches('/'));
            let health: HealthResponse = reqwest::get(&url)
                .await
                .with_context(|| format!("requesting {}", url))?
                .error_for_status()?
                .json()
                .await
                .context("decoding status response")?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("Status:              {}", health.status);
                println!("Version:             {}", health.version);
                println!("Uptime:              {}s", health.uptime_seconds);
                println!("Connections:         {}", health.connections);
                println!("Records relayed:     {}", health.records_relayed);
                println!("Connections evicted: {}", health.connections_evicted);
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Map an http(s) server URL to its WebSocket counterpart
fn websocket_url(server_url: &str) -> String {
    if let Some(rest) = server_url.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = server_url.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        server_url.to_string()
    }
}

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use shipquote_models::config::ShipquoteConfig;
use shipquote_models::quote::QuoteOutcome;
use shipquote_models::shipment::ShipmentContext;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Quote a shipment across a window of ship dates.
///
/// Prints the outcome as JSON on stdout. Exits with status 2 when no date
/// could be quoted.
#[derive(Parser, Debug)]
#[command(name = "shipquote", version)]
struct Cli {
    #[arg(short, long, default_value = "config/shipquote.toml")]
    config: PathBuf,

    /// ShipmentContext JSON; `-` or absent reads stdin
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Override `engine.look_forward_days`
    #[arg(long)]
    look_forward_days: Option<u32>,

    /// Send to the sandbox gateway regardless of config
    #[arg(long)]
    sandbox: bool,

    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn load_config(&self) -> Result<ShipquoteConfig> {
        let raw = std::fs::read_to_string(&self.config)
            .with_context(|| format!("Failed to read config: {}", self.config.display()))?;
        let mut config: ShipquoteConfig = toml::from_str(&raw)
            .with_context(|| format!("Invalid config: {}", self.config.display()))?;

        if let Some(days) = self.look_forward_days {
            config.engine.look_forward_days = days;
        }
        config.carrier.sandbox_mode |= self.sandbox;
        Ok(config)
    }

    fn load_shipment(&self) -> Result<ShipmentContext> {
        let json = match self.input.as_deref() {
            Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read shipment: {}", path.display()))?,
            _ => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read shipment from stdin")?;
                buf
            }
        };
        serde_json::from_str(&json).context("Invalid ShipmentContext JSON")
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let shipment = cli.load_shipment()?;

    let quoter = shipquote::build_quoter(&config)?;
    let outcome = shipquote::quote(&quoter, &shipment).await?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{json}");

    Ok(match &outcome {
        QuoteOutcome::Quoted { ship_date, .. } => {
            info!(%ship_date, "Quoted");
            ExitCode::SUCCESS
        }
        QuoteOutcome::NoQuote { reason } => {
            info!(?reason, "No quote");
            ExitCode::from(2)
        }
    })
}

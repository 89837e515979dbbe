//! Binary crate for the `weather-energy` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Human-friendly and JSON output formatting

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod render;

fn log_filter_from_verbosity(verbose: u8) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = match verbose {
        0 => "warn",
        1 => "info,weather_energy_core=debug",
        _ => "debug",
    };
    EnvFilter::new(level)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Picks up WEATHER_API_KEY / OPENWEATHER_API_KEY from a local .env.
    dotenv::dotenv().ok();

    let cmd = cli::Cli::parse();

    // Logs go to stderr so `--json` output stays machine-readable.
    tracing_subscriber::registry()
        .with(log_filter_from_verbosity(cmd.verbose))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cmd.run().await
}

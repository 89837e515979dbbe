use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, PasswordDisplayMode};
use tracing::debug;
use weather_energy_core::{
    CityCatalog, Config, Continent, ProviderId, ReportBuilder, ReportError,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weather-energy",
    version,
    about = "Weather-driven heating/cooling demand by continent"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// City catalog TOML replacing the built-in cities.
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Cities fetched at once (default from config, 1 = sequential).
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Forecast samples averaged into the trend (provider default if unset).
    #[arg(long, global = true)]
    pub forecast_window: Option<usize>,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "weatherapi", "openweather" or "mock".
        provider: String,
    },

    /// Weather and energy summary for every continent.
    Summary {
        /// Provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Print JSON instead of tables.
        #[arg(long)]
        json: bool,
    },

    /// City details and efficiency ranking for one continent.
    Continent {
        /// Continent key, e.g. "europe" or "south_america".
        key: String,

        /// Provider to use instead of the configured default.
        #[arg(long)]
        provider: Option<String>,

        /// Print JSON instead of tables.
        #[arg(long)]
        json: bool,
    },

    /// List the cities in the catalog.
    Cities {
        /// Only this continent.
        key: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(n) = self.concurrency {
            config.settings.max_concurrent_fetches = n;
        }
        if let Some(n) = self.forecast_window {
            config.settings.forecast_window = Some(n);
        }

        let catalog = Arc::new(load_catalog(self.catalog.as_deref())?);
        debug!(
            default_provider = ?config.default_provider,
            cities = catalog.city_count(),
            "configuration loaded"
        );

        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Summary { provider, json } => {
                let builder = builder(&config, provider.as_deref(), catalog)?;
                let report = builder.all_continents().await;

                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    render::print_summary(builder.provider_id(), &report);
                }
                Ok(())
            }
            Command::Continent { key, provider, json } => {
                let builder = builder(&config, provider.as_deref(), catalog)?;

                let report = match builder.continent_detail(&key).await {
                    Ok(report) => report,
                    Err(ReportError::UnknownContinent(key)) => {
                        let known: Vec<_> = builder
                            .catalog()
                            .continents()
                            .map(|(c, _)| c.key())
                            .collect();
                        bail!("Continent not found: '{key}'. Known continents: {}", known.join(", "));
                    }
                    Err(err) => return Err(err.into()),
                };

                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    render::print_detail(builder.provider_id(), &report);
                }
                Ok(())
            }
            Command::Cities { key } => {
                let only = key
                    .as_deref()
                    .map(Continent::try_from)
                    .transpose()?;
                render::print_catalog(&catalog, only);
                Ok(())
            }
        }
    }
}

fn load_catalog(path: Option<&std::path::Path>) -> anyhow::Result<CityCatalog> {
    let Some(path) = path else {
        return Ok(CityCatalog::builtin());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read city catalog: {}", path.display()))?;

    CityCatalog::from_toml_str(&contents)
        .with_context(|| format!("Invalid city catalog: {}", path.display()))
}

fn builder(
    config: &Config,
    provider: Option<&str>,
    catalog: Arc<CityCatalog>,
) -> anyhow::Result<ReportBuilder> {
    let provider = provider.map(ProviderId::try_from).transpose()?;
    Ok(ReportBuilder::from_config(config, provider, catalog)?)
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    // Stored config only; environment keys are not persisted.
    let path = Config::config_file_path()?;
    let mut config = if path.exists() {
        Config::load_from(&path)?
    } else {
        Config::default()
    };

    if id.requires_api_key() {
        let api_key = Password::new(&format!("API key for {id}:"))
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?;

        if api_key.trim().is_empty() {
            bail!("API key must not be empty");
        }
        config.upsert_provider_api_key(id, api_key.trim().to_string());
    }

    let is_default = config.default_provider.as_deref() == Some(id.as_str());
    if !is_default {
        let make_default = config.default_provider.is_none()
            || Confirm::new(&format!("Make {id} the default provider?"))
                .with_default(true)
                .prompt()
                .context("Failed to read answer")?;

        if make_default {
            config.set_default_provider(id);
        }
    }

    config.save()?;
    println!("Saved configuration for '{id}' to {}", path.display());

    Ok(())
}

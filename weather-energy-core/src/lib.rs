//! Core library for the `weather-energy` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over weather providers, each normalizing its own schema
//! - The energy-demand heuristic and per-continent aggregation
//! - Report assembly for the all-continents summary and continent details
//!
//! It is used by `weather-energy-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod energy;
pub mod error;
pub mod model;
pub mod provider;
pub mod rate_limit;
pub mod report;
pub mod summary;

#[cfg(test)]
mod fixture;

pub use catalog::CityCatalog;
pub use config::{Config, ProviderConfig, Settings};
pub use error::{CatalogError, ConfigError, FetchFailure, ReportError};
pub use model::{
    AllContinentsReport, City, CityDetail, CityReport, Continent, ContinentDetailReport,
    ContinentSummary, EfficiencyRating, EnergyMetrics, Observation, TempVariability,
    WeatherReading,
};
pub use provider::{ProviderId, WeatherProvider};
pub use rate_limit::RateGate;
pub use report::ReportBuilder;

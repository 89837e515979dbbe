use thiserror::Error;

use crate::provider::ProviderId;

/// Why a single city's observation could not be produced.
///
/// Never fatal to a report: the aggregator logs it and drops the city.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchFailure {
    /// Transport error, timeout, or non-success HTTP status.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The upstream answered successfully but the payload was not usable.
    #[error("malformed data: {0}")]
    MalformedData(String),
}

impl FetchFailure {
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedData(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "No API key configured for provider '{provider}'.\n\
         Hint: run `weather-energy configure {provider}` or set {env_var}."
    )]
    MissingCredential {
        provider: ProviderId,
        env_var: &'static str,
    },

    #[error("Unknown provider '{0}'. Supported providers: openweather, weatherapi, mock.")]
    UnknownProvider(String),

    #[error(
        "No default provider configured.\n\
         Hint: run `weather-energy configure <provider>` (e.g. `weather-energy configure weatherapi`) first."
    )]
    NoDefaultProvider,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown continent '{0}'")]
    UnknownContinent(String),

    #[error("Failed to parse city catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("City '{name}' has invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates { name: String, lat: f64, lon: f64 },
}

/// Whole-request failures surfaced to the report consumer.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Continent not found: '{0}'")]
    UnknownContinent(String),
}

use crate::{
    Config,
    error::{ConfigError, FetchFailure},
    model::{Coordinates, Observation},
    provider::{mock::MockProvider, openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug, time::Duration};
use tracing::debug;

pub mod mock;
pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
    Mock,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
            ProviderId::Mock => "mock",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi, ProviderId::Mock]
    }

    /// Environment variable that can supply this provider's API key.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderId::OpenWeather => Some("OPENWEATHER_API_KEY"),
            ProviderId::WeatherApi => Some("WEATHER_API_KEY"),
            ProviderId::Mock => None,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        self.api_key_env().is_some()
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            "mock" => Ok(ProviderId::Mock),
            _ => Err(ConfigError::UnknownProvider(value.to_string())),
        }
    }
}

/// A source of current conditions, normalized from one upstream schema.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn observe(&self, at: Coordinates) -> Result<Observation, FetchFailure>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> Result<Box<dyn WeatherProvider>, ConfigError> {
    let settings = &config.settings;

    let api_key = || {
        config
            .provider_api_key(id)
            .map(str::to_owned)
            .ok_or(ConfigError::MissingCredential {
                provider: id,
                env_var: id.api_key_env().unwrap_or_default(),
            })
    };

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => {
            let http = http_client(settings.request_timeout())?;
            let mut provider = OpenWeatherProvider::new(api_key()?, http);
            if let Some(url) = &settings.openweather_base_url {
                provider = provider.with_base_url(url);
            }
            if let Some(window) = settings.forecast_window {
                provider = provider.with_forecast_window(window);
            }
            Box::new(provider)
        }
        ProviderId::WeatherApi => {
            let http = http_client(settings.request_timeout())?;
            let mut provider = WeatherApiProvider::new(api_key()?, http);
            if let Some(url) = &settings.weatherapi_base_url {
                provider = provider.with_base_url(url);
            }
            if let Some(window) = settings.forecast_window {
                provider = provider.with_forecast_window(window);
            }
            Box::new(provider)
        }
        ProviderId::Mock => Box::new(MockProvider::new()),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(
    config: &Config,
) -> Result<Box<dyn WeatherProvider>, ConfigError> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

pub fn http_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Send a request and decode a JSON body.
///
/// Transport errors and non-success statuses map to `FetchFailure::Fetch`,
/// undecodable bodies to `FetchFailure::MalformedData`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    what: &str,
) -> Result<T, FetchFailure> {
    let res = request
        .send()
        .await
        .map_err(|e| FetchFailure::fetch(format!("{what}: {}", describe(&e))))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| FetchFailure::fetch(format!("{what}: failed to read body: {}", describe(&e))))?;

    if !status.is_success() {
        return Err(FetchFailure::fetch(format!(
            "{what} request failed with status {}: {}",
            status,
            truncate_body(&body),
        )));
    }

    debug!(what, status = %status, bytes = body.len(), "received upstream response");

    serde_json::from_str(&body)
        .map_err(|e| FetchFailure::malformed(format!("{what}: {e}")))
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out ({err})")
    } else {
        err.to_string()
    }
}

pub(crate) fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::WeatherApi, &cfg).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential { provider: ProviderId::WeatherApi, env_var: "WEATHER_API_KEY" }
        ));
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn mock_provider_needs_no_key() {
        let cfg = Config::default();
        let provider = provider_from_config(ProviderId::Mock, &cfg).expect("mock needs no key");
        assert_eq!(provider.id(), ProviderId::Mock);
    }

    #[test]
    fn default_provider_from_config_errors_when_not_set() {
        let cfg = Config::default();
        let err = default_provider_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No default provider configured"));
        assert!(msg.contains("Hint: run `weather-energy configure"));
    }

    #[test]
    fn default_provider_from_config_works_when_set_and_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "KEY".to_string());

        let provider = default_provider_from_config(&cfg).expect("provider should build");
        assert_eq!(provider.id(), ProviderId::OpenWeather);
    }

    #[test]
    fn truncate_body_limits_long_payloads() {
        let long = "x".repeat(500);
        let short = truncate_body(&long);
        assert_eq!(short.len(), 203);
        assert!(short.ends_with("..."));
        assert_eq!(truncate_body("ok"), "ok");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let short = truncate_body(&long);
        assert_eq!(short.chars().count(), 203);
    }
}

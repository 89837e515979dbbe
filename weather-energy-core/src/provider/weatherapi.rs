use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    error::FetchFailure,
    model::{Coordinates, Observation, WeatherReading, condition_code},
    provider::{ProviderId, get_json, unix_to_utc},
};

use super::WeatherProvider;

/// WeatherAPI.com: current conditions and daily forecast in one response.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
    base_url: String,
    forecast_days: usize,
}

impl WeatherApiProvider {
    pub const DEFAULT_BASE_URL: &'static str = "http://api.weatherapi.com/v1";
    /// Today and tomorrow.
    pub const DEFAULT_FORECAST_WINDOW: usize = 2;
    const MAX_FORECAST_DAYS: usize = 14;

    pub fn new(api_key: String, http: Client) -> Self {
        Self {
            api_key,
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            forecast_days: Self::DEFAULT_FORECAST_WINDOW,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Number of forecast days averaged into the trend.
    pub fn with_forecast_window(mut self, days: usize) -> Self {
        self.forecast_days = days;
        self
    }

    async fn fetch(&self, at: Coordinates) -> Result<WaResponse, FetchFailure> {
        let url = format!("{}/forecast.json", self.base_url);
        let q = format!("{},{}", at.lat, at.lon);
        let days = self.forecast_days.clamp(1, Self::MAX_FORECAST_DAYS).to_string();

        let request = self.http.get(url).query(&[
            ("key", self.api_key.as_str()),
            ("q", q.as_str()),
            ("days", days.as_str()),
            ("aqi", "no"),
            ("alerts", "no"),
        ]);

        get_json(request, "WeatherAPI forecast").await
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    feelslike_c: f64,
    humidity: u8,
    pressure_mb: f64,
    wind_kph: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: f64,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    day: Option<WaDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    #[serde(default)]
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
    forecast: Option<WaForecast>,
}

fn normalize(parsed: WaResponse, forecast_days: usize) -> Observation {
    let current = parsed.current;

    let reading = WeatherReading {
        temperature_c: current.temp_c,
        feels_like_c: current.feelslike_c,
        humidity_pct: current.humidity,
        pressure_hpa: current.pressure_mb,
        wind_speed_mps: current.wind_kph / 3.6,
        condition_code: condition_code(&current.condition.text),
        condition: current.condition.text.to_lowercase(),
        icon: current.condition.icon,
        observed_at: current.last_updated_epoch.and_then(unix_to_utc),
    };

    let forecast_temps = parsed
        .forecast
        .map(|f| {
            f.forecastday
                .iter()
                .take(forecast_days)
                .filter_map(|d| d.day.as_ref().map(|day| day.avgtemp_c))
                .collect()
        })
        .unwrap_or_default();

    Observation {
        reading,
        forecast_temps,
    }
}

/// Normalize a raw `forecast.json` body.
pub fn normalize_body(body: &str, forecast_days: usize) -> Result<Observation, FetchFailure> {
    let parsed: WaResponse = serde_json::from_str(body)
        .map_err(|e| FetchFailure::malformed(format!("WeatherAPI forecast: {e}")))?;
    Ok(normalize(parsed, forecast_days))
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    #[instrument(skip(self), fields(lat = %at.lat, lon = %at.lon))]
    async fn observe(&self, at: Coordinates) -> Result<Observation, FetchFailure> {
        let parsed = self.fetch(at).await?;
        Ok(normalize(parsed, self.forecast_days))
    }
}

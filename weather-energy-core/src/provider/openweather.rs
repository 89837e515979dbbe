use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::{
    error::FetchFailure,
    model::{Coordinates, Observation, WeatherReading, condition_code},
    provider::{ProviderId, get_json, unix_to_utc},
};

use super::WeatherProvider;

/// OpenWeatherMap: current conditions and 3-hourly forecast are separate calls.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    base_url: String,
    forecast_steps: usize,
}

impl OpenWeatherProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openweathermap.org/data/2.5";
    /// Eight 3-hour steps, i.e. the next 24 hours.
    pub const DEFAULT_FORECAST_WINDOW: usize = 8;

    pub fn new(api_key: String, http: Client) -> Self {
        Self {
            api_key,
            http,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            forecast_steps: Self::DEFAULT_FORECAST_WINDOW,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Number of 3-hour forecast samples averaged into the trend.
    pub fn with_forecast_window(mut self, steps: usize) -> Self {
        self.forecast_steps = steps;
        self
    }

    fn request(&self, endpoint: &str, at: Coordinates) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, endpoint);
        let lat = at.lat.to_string();
        let lon = at.lon.to_string();

        self.http.get(url).query(&[
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("appid", self.api_key.as_str()),
            ("units", "metric"),
        ])
    }

    async fn fetch_current(&self, at: Coordinates) -> Result<WeatherReading, FetchFailure> {
        let parsed: OwCurrentResponse =
            get_json(self.request("weather", at), "OpenWeather current").await?;
        normalize_current(parsed)
    }

    async fn fetch_forecast(&self, at: Coordinates) -> Result<Vec<f64>, FetchFailure> {
        let parsed: OwForecastResponse =
            get_json(self.request("forecast", at), "OpenWeather forecast").await?;
        Ok(forecast_temps(&parsed, self.forecast_steps))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    main: OwForecastMain,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

fn normalize_current(parsed: OwCurrentResponse) -> Result<WeatherReading, FetchFailure> {
    let weather = parsed
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| FetchFailure::malformed("OpenWeather current: empty `weather` array"))?;

    Ok(WeatherReading {
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        // units=metric already reports m/s
        wind_speed_mps: parsed.wind.map(|w| w.speed).unwrap_or(0.0),
        condition_code: condition_code(&weather.main),
        condition: weather.description,
        icon: weather.icon,
        observed_at: parsed.dt.and_then(unix_to_utc),
    })
}

fn forecast_temps(parsed: &OwForecastResponse, steps: usize) -> Vec<f64> {
    parsed.list.iter().take(steps).map(|e| e.main.temp).collect()
}

/// Normalize raw `weather` and (optional) `forecast` bodies.
pub fn normalize_bodies(
    current: &str,
    forecast: Option<&str>,
    forecast_steps: usize,
) -> Result<Observation, FetchFailure> {
    let parsed: OwCurrentResponse = serde_json::from_str(current)
        .map_err(|e| FetchFailure::malformed(format!("OpenWeather current: {e}")))?;
    let reading = normalize_current(parsed)?;

    let forecast_temps = match forecast {
        Some(body) => {
            let parsed: OwForecastResponse = serde_json::from_str(body)
                .map_err(|e| FetchFailure::malformed(format!("OpenWeather forecast: {e}")))?;
            forecast_temps(&parsed, forecast_steps)
        }
        None => Vec::new(),
    };

    Ok(Observation {
        reading,
        forecast_temps,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    #[instrument(skip(self), fields(lat = %at.lat, lon = %at.lon))]
    async fn observe(&self, at: Coordinates) -> Result<Observation, FetchFailure> {
        let reading = self.fetch_current(at).await?;

        if self.forecast_steps == 0 {
            return Ok(Observation::current_only(reading));
        }

        // The reading is still usable without a trend.
        let forecast_temps = match self.fetch_forecast(at).await {
            Ok(temps) => temps,
            Err(err) => {
                warn!(error = %err, "forecast unavailable, reporting current conditions only");
                Vec::new()
            }
        };

        Ok(Observation {
            reading,
            forecast_temps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current_body() -> String {
        serde_json::json!({
            "coord": { "lon": -0.1278, "lat": 51.5074 },
            "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
            "main": { "temp": 12.3, "feels_like": 11.1, "temp_min": 10.0, "temp_max": 14.0, "pressure": 1012, "humidity": 81 },
            "wind": { "speed": 4.6, "deg": 250 },
            "dt": 1705320000,
            "name": "London"
        })
        .to_string()
    }

    fn forecast_body(n: usize) -> String {
        let list: Vec<_> = (0..n)
            .map(|i| serde_json::json!({ "dt": 1705320000 + i * 10800, "main": { "temp": i as f64 } }))
            .collect();
        serde_json::json!({ "cod": "200", "list": list, "city": { "name": "London", "country": "GB" } })
            .to_string()
    }

    #[test]
    fn normalizes_current_conditions() {
        let obs = normalize_bodies(&current_body(), None, 8).expect("body should parse");
        let r = &obs.reading;

        assert_eq!(r.temperature_c, 12.3);
        assert_eq!(r.feels_like_c, 11.1);
        assert_eq!(r.humidity_pct, 81);
        assert_eq!(r.pressure_hpa, 1012.0);
        assert_eq!(r.wind_speed_mps, 4.6);
        assert_eq!(r.condition, "broken clouds");
        assert_eq!(r.condition_code, "Clouds");
        assert_eq!(r.icon.as_deref(), Some("04d"));
        assert!(obs.forecast_temps.is_empty());
    }

    #[test]
    fn forecast_takes_window_samples() {
        let obs = normalize_bodies(&current_body(), Some(&forecast_body(40)), 8).unwrap();
        assert_eq!(obs.forecast_temps, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn missing_wind_defaults_to_calm() {
        let body = serde_json::json!({
            "weather": [{ "main": "Clear", "description": "clear sky" }],
            "main": { "temp": 20.0, "feels_like": 20.0, "pressure": 1000, "humidity": 40 }
        })
        .to_string();

        let obs = normalize_bodies(&body, None, 8).unwrap();
        assert_eq!(obs.reading.wind_speed_mps, 0.0);
        assert_eq!(obs.reading.observed_at, None);
    }

    #[test]
    fn empty_weather_array_is_malformed() {
        let body = serde_json::json!({
            "weather": [],
            "main": { "temp": 20.0, "feels_like": 20.0, "pressure": 1000, "humidity": 40 }
        })
        .to_string();

        let err = normalize_bodies(&body, None, 8).unwrap_err();
        assert!(matches!(err, FetchFailure::MalformedData(_)));
    }

    #[test]
    fn error_payload_without_main_is_malformed() {
        let body = r#"{"cod": 401, "message": "Invalid API key"}"#;
        let err = normalize_bodies(body, None, 8).unwrap_err();
        assert!(matches!(err, FetchFailure::MalformedData(_)));
    }
}

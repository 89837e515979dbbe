//! In-memory provider for aggregation and report tests.

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    error::FetchFailure,
    model::{Coordinates, Observation, WeatherReading, condition_code},
    provider::{ProviderId, WeatherProvider},
};

type DelayFn = Box<dyn Fn(f64) -> Duration + Send + Sync>;

/// Answers by latitude; unscripted coordinates fail with a fetch error.
pub struct ScriptedProvider {
    script: Vec<(f64, Result<Observation, FetchFailure>)>,
    delay: Option<DelayFn>,
    calls: AtomicUsize,
}

impl std::fmt::Debug for ScriptedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedProvider")
            .field("script", &self.script)
            .field("calls", &self.calls)
            .finish_non_exhaustive()
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            script: Vec::new(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn ok(self, lat: f64, reading: WeatherReading) -> Self {
        self.answer(lat, Ok(Observation::current_only(reading)))
    }

    pub fn ok_with_forecast(self, lat: f64, reading: WeatherReading, temps: Vec<f64>) -> Self {
        self.answer(
            lat,
            Ok(Observation {
                reading,
                forecast_temps: temps,
            }),
        )
    }

    pub fn fail(self, lat: f64, err: FetchFailure) -> Self {
        self.answer(lat, Err(err))
    }

    pub fn with_delay(mut self, delay: impl Fn(f64) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(mut self, lat: f64, outcome: Result<Observation, FetchFailure>) -> Self {
        self.script.push((lat, outcome));
        self
    }
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Mock
    }

    async fn observe(&self, at: Coordinates) -> Result<Observation, FetchFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(at.lat)).await;
        }

        self.script
            .iter()
            .find(|(lat, _)| *lat == at.lat)
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| Err(FetchFailure::fetch(format!("no script for {}", at.lat))))
    }
}

/// Reading at 50 % humidity, no wind.
pub fn reading(temperature_c: f64, condition: &str) -> WeatherReading {
    WeatherReading {
        temperature_c,
        feels_like_c: temperature_c,
        humidity_pct: 50,
        pressure_hpa: 1013.0,
        wind_speed_mps: 0.0,
        condition: condition.to_lowercase(),
        condition_code: condition_code(condition),
        icon: None,
        observed_at: None,
    }
}

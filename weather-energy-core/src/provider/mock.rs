use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    energy::round_to,
    error::FetchFailure,
    model::{Coordinates, Observation, WeatherReading, condition_code},
    provider::ProviderId,
};

use super::WeatherProvider;

const DRY_CONDITIONS: &[&str] = &["Clear", "Partly Cloudy", "Cloudy"];
const HUMID_CONDITIONS: &[&str] = &["Light Rain", "Cloudy", "Overcast"];

/// Plausible random readings shaped by latitude. Needs no credentials.
#[derive(Debug)]
pub struct MockProvider {
    rng: Mutex<StdRng>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn generate(&self, at: Coordinates) -> WeatherReading {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let base = match at.lat {
            lat if lat > 50.0 => rng.gen_range(5.0..15.0),
            lat if lat > 30.0 => rng.gen_range(15.0..25.0),
            lat if lat > 0.0 => rng.gen_range(25.0..35.0),
            lat if lat > -30.0 => rng.gen_range(15.0..25.0),
            _ => rng.gen_range(5.0..15.0),
        };

        let temp: f64 = base + rng.gen_range(-5.0..5.0);
        let feels_like = temp + rng.gen_range(-2.0..3.0);
        let humidity: u8 = rng.gen_range(40..=85);
        let pressure: u16 = rng.gen_range(990..=1025);
        let wind: f64 = rng.gen_range(0.0..15.0);

        let choices = if humidity > 70 {
            HUMID_CONDITIONS
        } else {
            DRY_CONDITIONS
        };
        let condition = choices.choose(&mut *rng).copied().unwrap_or("Clear");

        WeatherReading {
            temperature_c: round_to(temp, 1),
            feels_like_c: round_to(feels_like, 1),
            humidity_pct: humidity,
            pressure_hpa: f64::from(pressure),
            wind_speed_mps: round_to(wind, 1),
            condition: condition.to_lowercase(),
            condition_code: condition_code(condition),
            icon: Some("01d".to_string()),
            observed_at: Some(Utc::now()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for MockProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Mock
    }

    async fn observe(&self, at: Coordinates) -> Result<Observation, FetchFailure> {
        Ok(Observation::current_only(self.generate(at)))
    }
}

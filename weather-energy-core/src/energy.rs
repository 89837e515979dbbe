//! Heuristic heating/cooling demand derived from a single weather reading.
//!
//! Demand is measured as deviation from an 18 °C comfort baseline, scaled up
//! by humidity and slightly down by wind. It is a proxy for comparing cities,
//! not a physical load model.

use crate::model::{EfficiencyRating, EnergyMetrics, WeatherReading};

pub const BASE_TEMP_C: f64 = 18.0;
const HEATING_MULTIPLIER: f64 = 1.5;
const COOLING_MULTIPLIER: f64 = 1.2;
const MIN_WIND_FACTOR: f64 = 0.8;

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn calculate(temperature_c: f64, humidity_pct: f64, wind_speed_mps: f64) -> EnergyMetrics {
    let (heating_demand, cooling_demand) = if temperature_c < BASE_TEMP_C {
        ((BASE_TEMP_C - temperature_c) * HEATING_MULTIPLIER, 0.0)
    } else {
        (0.0, (temperature_c - BASE_TEMP_C) * COOLING_MULTIPLIER)
    };

    let humidity_factor = 1.0 + (humidity_pct - 50.0) / 100.0;
    let wind_factor = (1.0 - wind_speed_mps / 50.0).max(MIN_WIND_FACTOR);

    let total_energy_index = (heating_demand + cooling_demand) * humidity_factor * wind_factor;

    EnergyMetrics {
        heating_demand: round_to(heating_demand, 2),
        cooling_demand: round_to(cooling_demand, 2),
        total_energy_index: round_to(total_energy_index, 2),
        // Rated on the unrounded index.
        efficiency_rating: EfficiencyRating::from_index(total_energy_index),
    }
}

pub fn for_reading(reading: &WeatherReading) -> EnergyMetrics {
    calculate(
        reading.temperature_c,
        f64::from(reading.humidity_pct),
        reading.wind_speed_mps,
    )
}

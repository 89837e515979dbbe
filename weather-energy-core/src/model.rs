use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// The fixed set of continents reports are grouped by.
///
/// Declaration order is report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Continent {
    NorthAmerica,
    Europe,
    Asia,
    SouthAmerica,
    Africa,
    Oceania,
}

impl Continent {
    pub const fn all() -> &'static [Continent] {
        &[
            Continent::NorthAmerica,
            Continent::Europe,
            Continent::Asia,
            Continent::SouthAmerica,
            Continent::Africa,
            Continent::Oceania,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            Continent::NorthAmerica => "north_america",
            Continent::Europe => "europe",
            Continent::Asia => "asia",
            Continent::SouthAmerica => "south_america",
            Continent::Africa => "africa",
            Continent::Oceania => "oceania",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Continent::NorthAmerica => "North America",
            Continent::Europe => "Europe",
            Continent::Asia => "Asia",
            Continent::SouthAmerica => "South America",
            Continent::Africa => "Africa",
            Continent::Oceania => "Oceania",
        }
    }
}

impl std::fmt::Display for Continent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl TryFrom<&str> for Continent {
    type Error = CatalogError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_lowercase().replace('-', "_");

        Continent::all()
            .iter()
            .copied()
            .find(|c| c.key() == normalized)
            .ok_or_else(|| CatalogError::UnknownContinent(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    pub fn new(name: &str, country: &str, lat: f64, lon: f64) -> Self {
        Self {
            name: name.to_string(),
            country: country.to_string(),
            lat,
            lon,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Provider-independent current conditions for one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    /// Human-readable condition, e.g. "light rain".
    pub condition: String,
    /// Histogram bucket; first token of the provider's condition text.
    pub condition_code: String,
    pub icon: Option<String>,
    pub observed_at: Option<DateTime<Utc>>,
}

/// A reading together with the forecast temperatures inside the configured window.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub reading: WeatherReading,
    pub forecast_temps: Vec<f64>,
}

impl Observation {
    pub fn current_only(reading: WeatherReading) -> Self {
        Self {
            reading,
            forecast_temps: Vec::new(),
        }
    }
}

/// First whitespace-delimited token of a condition text, as provided.
pub fn condition_code(text: &str) -> String {
    text.split_whitespace().next().unwrap_or("Unknown").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EfficiencyRating {
    High,
    Medium,
    Low,
}

impl EfficiencyRating {
    pub fn from_index(total_energy_index: f64) -> Self {
        if total_energy_index < 10.0 {
            EfficiencyRating::High
        } else if total_energy_index < 20.0 {
            EfficiencyRating::Medium
        } else {
            EfficiencyRating::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EfficiencyRating::High => "High",
            EfficiencyRating::Medium => "Medium",
            EfficiencyRating::Low => "Low",
        }
    }
}

impl std::fmt::Display for EfficiencyRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyMetrics {
    pub heating_demand: f64,
    pub cooling_demand: f64,
    pub total_energy_index: f64,
    pub efficiency_rating: EfficiencyRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityReport {
    pub name: String,
    pub country: String,
    pub temperature: f64,
    /// Reading before display rounding; continent statistics use this.
    #[serde(skip)]
    pub temperature_c: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub weather: String,
    pub condition_code: String,
    pub energy_metrics: EnergyMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempVariability {
    High,
    Medium,
    Low,
}

impl TempVariability {
    pub fn from_range(range: f64) -> Self {
        if range > 15.0 {
            TempVariability::High
        } else if range > 8.0 {
            TempVariability::Medium
        } else {
            TempVariability::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinentSummary {
    pub continent: Continent,
    pub cities: Vec<CityReport>,
    pub avg_temp: f64,
    pub avg_energy_index: f64,
    pub weather_summary: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_variability: Option<TempVariability>,
}

/// Continent key to summary, in continent order.
pub type AllContinentsReport = BTreeMap<Continent, ContinentSummary>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: f64,
    pub wind_speed: f64,
    pub description: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastTrend {
    pub next_24h_avg: f64,
    pub temp_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDetail {
    pub name: String,
    pub country: String,
    pub current_weather: CurrentWeather,
    pub energy_analysis: EnergyMetrics,
    pub forecast_trend: ForecastTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub city: String,
    pub efficiency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailAnalysis {
    pub energy_efficiency_ranking: Vec<RankingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinentDetailReport {
    pub continent: Continent,
    pub cities: Vec<CityDetail>,
    pub analysis: DetailAnalysis,
}

//! Report assembly: the all-continents summary and the single-continent detail.

use std::sync::Arc;

use tracing::info;

use crate::{
    Config,
    aggregate::{city_reports, observe_cities},
    catalog::CityCatalog,
    energy::{self, round_to},
    error::ReportError,
    model::{
        AllContinentsReport, City, CityDetail, Continent, ContinentDetailReport, ContinentSummary,
        CurrentWeather, DetailAnalysis, ForecastTrend, Observation, RankingEntry,
    },
    provider::{ProviderId, WeatherProvider, default_provider_from_config, provider_from_config},
    rate_limit::RateGate,
    summary::summarize,
};

/// Mean of the forecast samples against the current temperature.
///
/// Without samples the trend is flat at the unrounded current temperature.
pub fn forecast_trend(current_temp: f64, forecast_temps: &[f64]) -> ForecastTrend {
    if forecast_temps.is_empty() {
        return ForecastTrend {
            next_24h_avg: current_temp,
            temp_change: 0.0,
        };
    }

    let avg = forecast_temps.iter().sum::<f64>() / forecast_temps.len() as f64;
    ForecastTrend {
        next_24h_avg: round_to(avg, 1),
        temp_change: round_to(avg - current_temp, 1),
    }
}

/// Cities by ascending energy index; ties keep input order.
pub fn rank_by_efficiency(details: &[CityDetail]) -> Vec<RankingEntry> {
    let mut ranking: Vec<RankingEntry> = details
        .iter()
        .map(|d| RankingEntry {
            city: d.name.clone(),
            efficiency_score: d.energy_analysis.total_energy_index,
        })
        .collect();

    ranking.sort_by(|a, b| a.efficiency_score.total_cmp(&b.efficiency_score));
    ranking
}

pub fn city_detail(city: &City, observation: &Observation) -> CityDetail {
    let reading = &observation.reading;

    CityDetail {
        name: city.name.clone(),
        country: city.country.clone(),
        current_weather: CurrentWeather {
            temperature: round_to(reading.temperature_c, 1),
            feels_like: round_to(reading.feels_like_c, 1),
            humidity: reading.humidity_pct,
            pressure: reading.pressure_hpa,
            wind_speed: round_to(reading.wind_speed_mps, 1),
            description: reading.condition.clone(),
            icon: reading.icon.clone(),
        },
        energy_analysis: energy::for_reading(reading),
        forecast_trend: forecast_trend(reading.temperature_c, &observation.forecast_temps),
    }
}

/// Drives a provider over the city catalog.
///
/// Each call is self-contained; only the rate gate is shared between calls.
#[derive(Debug)]
pub struct ReportBuilder {
    provider: Box<dyn WeatherProvider>,
    catalog: Arc<CityCatalog>,
    gate: RateGate,
    max_concurrent_fetches: usize,
}

impl ReportBuilder {
    pub fn new(provider: Box<dyn WeatherProvider>, catalog: Arc<CityCatalog>) -> Self {
        Self {
            provider,
            catalog,
            gate: RateGate::new(std::time::Duration::from_millis(100)),
            max_concurrent_fetches: 1,
        }
    }

    /// Build from config; `provider` overrides the configured default.
    ///
    /// Fails before any fetch when the provider has no credentials.
    pub fn from_config(
        config: &Config,
        provider: Option<ProviderId>,
        catalog: Arc<CityCatalog>,
    ) -> Result<Self, ReportError> {
        let provider = match provider {
            Some(id) => provider_from_config(id, config)?,
            None => default_provider_from_config(config)?,
        };

        Ok(Self::new(provider, catalog)
            .with_rate_gate(RateGate::new(config.settings.request_interval()))
            .with_max_concurrent_fetches(config.settings.max_concurrent_fetches))
    }

    pub fn with_rate_gate(mut self, gate: RateGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, n: usize) -> Self {
        self.max_concurrent_fetches = n.max(1);
        self
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    pub async fn continent_summary(&self, continent: Continent) -> ContinentSummary {
        let cities = self.catalog.cities(continent);
        let reports = city_reports(
            self.provider.as_ref(),
            &self.gate,
            cities,
            self.max_concurrent_fetches,
        )
        .await;

        let summary = summarize(continent, reports);
        info!(
            continent = %continent,
            cities = summary.cities.len(),
            skipped = cities.len() - summary.cities.len(),
            avg_temp = summary.avg_temp,
            avg_energy_index = summary.avg_energy_index,
            "continent summarized"
        );
        summary
    }

    /// One summary per catalog continent, in continent order.
    pub async fn all_continents(&self) -> AllContinentsReport {
        let mut report = AllContinentsReport::new();
        for (continent, _) in self.catalog.continents() {
            report.insert(continent, self.continent_summary(continent).await);
        }
        report
    }

    /// City details and efficiency ranking for the continent named by `key`.
    pub async fn continent_detail(&self, key: &str) -> Result<ContinentDetailReport, ReportError> {
        let continent = Continent::try_from(key)
            .ok()
            .filter(|c| self.catalog.contains(*c))
            .ok_or_else(|| ReportError::UnknownContinent(key.to_string()))?;

        let observations = observe_cities(
            self.provider.as_ref(),
            &self.gate,
            self.catalog.cities(continent),
            self.max_concurrent_fetches,
        )
        .await;

        let cities: Vec<CityDetail> = observations
            .iter()
            .map(|(city, observation)| city_detail(city, observation))
            .collect();
        let ranking = rank_by_efficiency(&cities);

        info!(continent = %continent, cities = cities.len(), "continent detail built");

        Ok(ContinentDetailReport {
            continent,
            cities,
            analysis: DetailAnalysis {
                energy_efficiency_ranking: ranking,
            },
        })
    }
}

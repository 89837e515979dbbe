//! Per-city acquisition: fetch every city of a continent, drop the failures.

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::{
    energy::{self, round_to},
    model::{City, CityReport, Observation},
    provider::WeatherProvider,
    rate_limit::RateGate,
};

/// Observe `cities` through `provider`, keeping successes in input order.
///
/// At most `max_concurrent` requests are in flight; every request first
/// passes through `gate`. A failed city is logged and left out.
pub async fn observe_cities(
    provider: &dyn WeatherProvider,
    gate: &RateGate,
    cities: &[City],
    max_concurrent: usize,
) -> Vec<(City, Observation)> {
    let outcomes: Vec<_> = stream::iter(cities)
        .map(move |city| async move {
            gate.acquire().await;
            debug!(city = %city.name, provider = %provider.id(), "fetching observation");
            (city, provider.observe(city.coordinates()).await)
        })
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    outcomes
        .into_iter()
        .filter_map(|(city, outcome)| match outcome {
            Ok(observation) => Some((city.clone(), observation)),
            Err(err) => {
                warn!(city = %city.name, provider = %provider.id(), error = %err, "skipping city");
                None
            }
        })
        .collect()
}

pub fn city_report(city: &City, observation: &Observation) -> CityReport {
    let reading = &observation.reading;

    CityReport {
        name: city.name.clone(),
        country: city.country.clone(),
        temperature: round_to(reading.temperature_c, 1),
        temperature_c: reading.temperature_c,
        humidity: reading.humidity_pct,
        wind_speed: round_to(reading.wind_speed_mps, 1),
        weather: reading.condition.clone(),
        condition_code: reading.condition_code.clone(),
        energy_metrics: energy::for_reading(reading),
    }
}

/// Fetch and score every city; one report per successful fetch.
pub async fn city_reports(
    provider: &dyn WeatherProvider,
    gate: &RateGate,
    cities: &[City],
    max_concurrent: usize,
) -> Vec<CityReport> {
    observe_cities(provider, gate, cities, max_concurrent)
        .await
        .iter()
        .map(|(city, observation)| city_report(city, observation))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FetchFailure,
        fixture::{ScriptedProvider, reading},
        model::EfficiencyRating,
    };
    use std::time::Duration;

    fn cities() -> Vec<City> {
        vec![
            City::new("A", "AA", 1.0, 1.0),
            City::new("B", "BB", 2.0, 2.0),
            City::new("C", "CC", 3.0, 3.0),
            City::new("D", "DD", 4.0, 4.0),
        ]
    }

    #[tokio::test]
    async fn failures_are_dropped_and_order_kept() {
        let provider = ScriptedProvider::new()
            .ok(1.0, reading(10.0, "Clear"))
            .fail(2.0, FetchFailure::fetch("HTTP 500"))
            .ok(3.0, reading(20.0, "Cloudy"))
            .fail(4.0, FetchFailure::malformed("missing main"));

        let out = observe_cities(&provider, &RateGate::unlimited(), &cities(), 1).await;

        let names: Vec<_> = out.iter().map(|(c, _)| c.name.as_str()).collect();
        assert_eq!(names, ["A", "C"]);
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_fetches_keep_catalog_order() {
        // Earlier cities answer later.
        let provider = ScriptedProvider::new()
            .ok(1.0, reading(1.0, "Clear"))
            .ok(2.0, reading(2.0, "Clear"))
            .ok(3.0, reading(3.0, "Clear"))
            .ok(4.0, reading(4.0, "Clear"))
            .with_delay(|lat| Duration::from_millis(((5.0 - lat) * 100.0) as u64));

        let out = observe_cities(&provider, &RateGate::unlimited(), &cities(), 4).await;

        let temps: Vec<f64> = out.iter().map(|(_, o)| o.reading.temperature_c).collect();
        assert_eq!(temps, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn all_failures_yield_empty() {
        let provider = ScriptedProvider::new();
        let out = city_reports(&provider, &RateGate::unlimited(), &cities(), 2).await;
        assert!(out.is_empty());
    }

    #[test]
    fn city_report_rounds_for_display() {
        let city = City::new("Lima", "PE", -12.0464, -77.0428);
        let mut r = reading(30.04, "Sunny");
        r.humidity_pct = 80;
        r.wind_speed_mps = 5.04;

        let report = city_report(&city, &Observation::current_only(r));

        assert_eq!(report.name, "Lima");
        assert_eq!(report.country, "PE");
        assert_eq!(report.temperature, 30.0);
        assert_eq!(report.wind_speed, 5.0);
        assert_eq!(report.condition_code, "Sunny");
        assert_eq!(report.energy_metrics.efficiency_rating, EfficiencyRating::Medium);
    }
}

use std::collections::BTreeMap;

use crate::{
    energy::round_to,
    model::{CityReport, Continent, ContinentSummary, TempVariability},
};

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn spread(values: &[f64]) -> Option<f64> {
    let max = values.iter().copied().reduce(f64::max)?;
    let min = values.iter().copied().reduce(f64::min)?;
    Some(max - min)
}

/// Aggregate the successful reports of one continent.
///
/// Temperature statistics run on the raw readings; only the final mean is
/// rounded. An empty `cities` gives zero averages, an empty histogram and no
/// variability class.
pub fn summarize(continent: Continent, cities: Vec<CityReport>) -> ContinentSummary {
    let temps: Vec<f64> = cities.iter().map(|c| c.temperature_c).collect();
    let indices: Vec<f64> = cities
        .iter()
        .map(|c| c.energy_metrics.total_energy_index)
        .collect();

    let mut weather_summary = BTreeMap::new();
    for city in &cities {
        *weather_summary.entry(city.condition_code.clone()).or_insert(0) += 1;
    }

    ContinentSummary {
        continent,
        avg_temp: mean(&temps).map(|m| round_to(m, 1)).unwrap_or(0.0),
        avg_energy_index: mean(&indices).map(|m| round_to(m, 1)).unwrap_or(0.0),
        weather_summary,
        temp_variability: spread(&temps).map(TempVariability::from_range),
        cities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate::city_report, fixture::reading, model::{City, Observation}};

    fn report(temp: f64, condition: &str) -> CityReport {
        let city = City::new("X", "XX", 0.0, 0.0);
        city_report(&city, &Observation::current_only(reading(temp, condition)))
    }

    #[test]
    fn empty_continent_is_zeroed() {
        let s = summarize(Continent::Africa, Vec::new());

        assert_eq!(s.continent, Continent::Africa);
        assert_eq!(s.avg_temp, 0.0);
        assert_eq!(s.avg_energy_index, 0.0);
        assert!(s.weather_summary.is_empty());
        assert!(s.cities.is_empty());
        assert_eq!(s.temp_variability, None);
    }

    #[test]
    fn averages_are_rounded_to_one_decimal() {
        let s = summarize(
            Continent::Europe,
            vec![report(10.0, "Clear"), report(11.0, "Clear"), report(11.0, "Cloudy")],
        );

        // mean 10.666..
        assert_eq!(s.avg_temp, 10.7);
        // heating 12, 10.5, 10.5 -> mean 11.0
        assert_eq!(s.avg_energy_index, 11.0);
    }

    #[test]
    fn histogram_counts_condition_codes() {
        let cities = vec![
            report(20.0, "Partly cloudy"),
            report(21.0, "Partly sunny"),
            report(22.0, "Clear"),
            report(23.0, "Light rain"),
        ];
        let s = summarize(Continent::Asia, cities);

        assert_eq!(s.weather_summary.get("Partly"), Some(&2));
        assert_eq!(s.weather_summary.get("Clear"), Some(&1));
        assert_eq!(s.weather_summary.get("Light"), Some(&1));
        assert_eq!(s.weather_summary.values().sum::<usize>(), s.cities.len());
    }

    #[test]
    fn histogram_is_case_sensitive() {
        let s = summarize(Continent::Oceania, vec![report(20.0, "Sunny"), report(20.0, "sunny")]);
        assert_eq!(s.weather_summary.len(), 2);
    }

    #[test]
    fn variability_classes() {
        let high = summarize(Continent::Asia, vec![report(10.0, "Clear"), report(30.0, "Clear")]);
        assert_eq!(high.temp_variability, Some(TempVariability::High));

        let low_at_eight = summarize(Continent::Asia, vec![report(10.0, "Clear"), report(18.0, "Clear")]);
        assert_eq!(low_at_eight.temp_variability, Some(TempVariability::Low));

        let medium = summarize(Continent::Asia, vec![report(10.0, "Clear"), report(19.0, "Clear")]);
        assert_eq!(medium.temp_variability, Some(TempVariability::Medium));

        let low = summarize(Continent::Asia, vec![report(10.0, "Clear"), report(16.0, "Clear")]);
        assert_eq!(low.temp_variability, Some(TempVariability::Low));

        let single = summarize(Continent::Asia, vec![report(25.0, "Clear")]);
        assert_eq!(single.temp_variability, Some(TempVariability::Low));
    }

    #[test]
    fn mean_temperature_uses_raw_readings() {
        // shown as 10.0, 10.0, 10.1 -> 10.03; raw mean 10.073
        let s = summarize(
            Continent::Europe,
            vec![report(10.04, "Clear"), report(10.04, "Clear"), report(10.14, "Clear")],
        );
        assert_eq!(s.avg_temp, 10.1);

        let s = summarize(Continent::Europe, vec![report(10.05, "Clear"), report(10.0, "Clear")]);
        assert_eq!(s.avg_temp, 10.0);
    }

    #[test]
    fn variability_boundaries_use_raw_range() {
        // both shown as a range of exactly 8.0 / 15.0
        let medium = summarize(Continent::Asia, vec![report(10.0, "Clear"), report(18.04, "Clear")]);
        assert_eq!(medium.temp_variability, Some(TempVariability::Medium));

        let high = summarize(Continent::Asia, vec![report(10.0, "Clear"), report(25.04, "Clear")]);
        assert_eq!(high.temp_variability, Some(TempVariability::High));
    }
}

use chrono::Local;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use weather_energy_core::{
    AllContinentsReport, CityCatalog, Continent, ContinentDetailReport, ProviderId,
};

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn signed(value: f64) -> String {
    format!("{value:+.1}")
}

fn stamp(provider: ProviderId) {
    println!(
        "Source: {provider}, generated {}\n",
        Local::now().format("%Y-%m-%d %H:%M")
    );
}

pub fn print_summary(provider: ProviderId, report: &AllContinentsReport) {
    stamp(provider);

    let mut overview = table(vec![
        "Continent",
        "Cities",
        "Avg temp (°C)",
        "Avg energy index",
        "Variability",
        "Conditions",
    ]);

    for (continent, summary) in report {
        let conditions = summary
            .weather_summary
            .iter()
            .map(|(code, n)| format!("{code} ×{n}"))
            .collect::<Vec<_>>()
            .join(", ");

        overview.add_row(vec![
            continent.display_name().to_string(),
            summary.cities.len().to_string(),
            format!("{:.1}", summary.avg_temp),
            format!("{:.1}", summary.avg_energy_index),
            summary
                .temp_variability
                .map(|v| format!("{v:?}"))
                .unwrap_or_else(|| "-".to_string()),
            conditions,
        ]);
    }
    println!("{overview}");

    for (continent, summary) in report {
        if summary.cities.is_empty() {
            println!("\n{}: no cities reported", continent.display_name());
            continue;
        }

        let mut cities = table(vec![
            "City", "Country", "Temp (°C)", "Humidity (%)", "Wind (m/s)", "Weather", "Heating",
            "Cooling", "Index", "Rating",
        ]);
        for city in &summary.cities {
            let m = &city.energy_metrics;
            cities.add_row(vec![
                city.name.clone(),
                city.country.clone(),
                format!("{:.1}", city.temperature),
                city.humidity.to_string(),
                format!("{:.1}", city.wind_speed),
                city.weather.clone(),
                format!("{:.2}", m.heating_demand),
                format!("{:.2}", m.cooling_demand),
                format!("{:.2}", m.total_energy_index),
                m.efficiency_rating.to_string(),
            ]);
        }
        println!("\n{}\n{cities}", continent.display_name());
    }
}

pub fn print_detail(provider: ProviderId, report: &ContinentDetailReport) {
    stamp(provider);
    println!("{}\n", report.continent.display_name());

    if report.cities.is_empty() {
        println!("No cities reported.");
        return;
    }

    let mut cities = table(vec![
        "City",
        "Temp (°C)",
        "Feels like",
        "Humidity (%)",
        "Pressure (hPa)",
        "Wind (m/s)",
        "Weather",
        "Index",
        "Rating",
        "Forecast avg",
        "Change",
    ]);
    for city in &report.cities {
        let w = &city.current_weather;
        cities.add_row(vec![
            format!("{} ({})", city.name, city.country),
            format!("{:.1}", w.temperature),
            format!("{:.1}", w.feels_like),
            w.humidity.to_string(),
            format!("{:.0}", w.pressure),
            format!("{:.1}", w.wind_speed),
            w.description.clone(),
            format!("{:.2}", city.energy_analysis.total_energy_index),
            city.energy_analysis.efficiency_rating.to_string(),
            format!("{:.1}", city.forecast_trend.next_24h_avg),
            signed(city.forecast_trend.temp_change),
        ]);
    }
    println!("{cities}");

    let mut ranking = table(vec!["#", "City", "Efficiency score"]);
    for (i, entry) in report.analysis.energy_efficiency_ranking.iter().enumerate() {
        ranking.add_row(vec![
            (i + 1).to_string(),
            entry.city.clone(),
            format!("{:.2}", entry.efficiency_score),
        ]);
    }
    println!("\nEnergy efficiency ranking (lowest demand first)\n{ranking}");
}

pub fn print_catalog(catalog: &CityCatalog, only: Option<Continent>) {
    let mut cities = table(vec!["Continent", "City", "Country", "Lat", "Lon"]);

    for (continent, list) in catalog.continents() {
        if only.is_some_and(|c| c != continent) {
            continue;
        }
        for city in list {
            cities.add_row(vec![
                continent.key().to_string(),
                city.name.clone(),
                city.country.clone(),
                format!("{:.4}", city.lat),
                format!("{:.4}", city.lon),
            ]);
        }
    }

    println!("{cities}");
}

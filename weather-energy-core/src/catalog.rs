//! Static reference table of cities grouped by continent.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use crate::{
    error::CatalogError,
    model::{City, Continent},
};

/// Immutable continent -> ordered cities mapping.
///
/// Built once at startup and shared; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CityCatalog {
    continents: BTreeMap<Continent, Vec<City>>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    continents: HashMap<String, Vec<City>>,
}

impl CityCatalog {
    pub fn new(continents: BTreeMap<Continent, Vec<City>>) -> Self {
        Self { continents }
    }

    /// Parse a catalog from TOML.
    ///
    /// ```toml
    /// [[continents.europe]]
    /// name = "Lisbon"
    /// country = "PT"
    /// lat = 38.7223
    /// lon = -9.1393
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;

        let mut continents = BTreeMap::new();
        for (key, cities) in file.continents {
            let continent = Continent::try_from(key.as_str())?;
            for city in &cities {
                if !(-90.0..=90.0).contains(&city.lat) || !(-180.0..=180.0).contains(&city.lon) {
                    return Err(CatalogError::InvalidCoordinates {
                        name: city.name.clone(),
                        lat: city.lat,
                        lon: city.lon,
                    });
                }
            }
            continents.insert(continent, cities);
        }

        Ok(Self { continents })
    }

    pub fn cities(&self, continent: Continent) -> &[City] {
        self.continents.get(&continent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, continent: Continent) -> bool {
        self.continents.contains_key(&continent)
    }

    /// Continents present in the catalog, in report order.
    pub fn continents(&self) -> impl Iterator<Item = (Continent, &[City])> {
        self.continents.iter().map(|(c, cities)| (*c, cities.as_slice()))
    }

    pub fn city_count(&self) -> usize {
        self.continents.values().map(Vec::len).sum()
    }

    /// Eight major cities per continent.
    pub fn builtin() -> Self {
        let mut continents = BTreeMap::new();

        continents.insert(
            Continent::NorthAmerica,
            vec![
                City::new("New York", "US", 40.7128, -74.0060),
                City::new("Los Angeles", "US", 34.0522, -118.2437),
                City::new("Chicago", "US", 41.8781, -87.6298),
                City::new("Toronto", "CA", 43.6532, -79.3832),
                City::new("Vancouver", "CA", 49.2827, -123.1207),
                City::new("Mexico City", "MX", 19.4326, -99.1332),
                City::new("Miami", "US", 25.7617, -80.1918),
                City::new("Denver", "US", 39.7392, -104.9903),
            ],
        );
        continents.insert(
            Continent::Europe,
            vec![
                City::new("London", "GB", 51.5074, -0.1278),
                City::new("Paris", "FR", 48.8566, 2.3522),
                City::new("Berlin", "DE", 52.5200, 13.4050),
                City::new("Madrid", "ES", 40.4168, -3.7038),
                City::new("Rome", "IT", 41.9028, 12.4964),
                City::new("Amsterdam", "NL", 52.3676, 4.9041),
                City::new("Stockholm", "SE", 59.3293, 18.0686),
                City::new("Vienna", "AT", 48.2082, 16.3738),
            ],
        );
        continents.insert(
            Continent::Asia,
            vec![
                City::new("Tokyo", "JP", 35.6762, 139.6503),
                City::new("Mumbai", "IN", 19.0760, 72.8777),
                City::new("Beijing", "CN", 39.9042, 116.4074),
                City::new("Seoul", "KR", 37.5665, 126.9780),
                City::new("Bangkok", "TH", 13.7563, 100.5018),
                City::new("Singapore", "SG", 1.3521, 103.8198),
                City::new("Delhi", "IN", 28.7041, 77.1025),
                City::new("Shanghai", "CN", 31.2304, 121.4737),
            ],
        );
        continents.insert(
            Continent::SouthAmerica,
            vec![
                City::new("São Paulo", "BR", -23.5505, -46.6333),
                City::new("Buenos Aires", "AR", -34.6118, -58.3960),
                City::new("Lima", "PE", -12.0464, -77.0428),
                City::new("Bogotá", "CO", 4.7110, -74.0721),
                City::new("Rio de Janeiro", "BR", -22.9068, -43.1729),
                City::new("Santiago", "CL", -33.4489, -70.6693),
                City::new("Caracas", "VE", 10.4806, -66.9036),
                City::new("Quito", "EC", -0.1807, -78.4678),
            ],
        );
        continents.insert(
            Continent::Africa,
            vec![
                City::new("Cairo", "EG", 30.0444, 31.2357),
                City::new("Lagos", "NG", 6.5244, 3.3792),
                City::new("Cape Town", "ZA", -33.9249, 18.4241),
                City::new("Nairobi", "KE", -1.2921, 36.8219),
                City::new("Casablanca", "MA", 33.5731, -7.5898),
                City::new("Johannesburg", "ZA", -26.2041, 28.0473),
                City::new("Addis Ababa", "ET", 9.1450, 38.7451),
                City::new("Accra", "GH", 5.6037, -0.1870),
            ],
        );
        continents.insert(
            Continent::Oceania,
            vec![
                City::new("Sydney", "AU", -33.8688, 151.2093),
                City::new("Melbourne", "AU", -37.8136, 144.9631),
                City::new("Auckland", "NZ", -36.8485, 174.7633),
                City::new("Perth", "AU", -31.9505, 115.8605),
                City::new("Brisbane", "AU", -27.4698, 153.0251),
                City::new("Wellington", "NZ", -41.2865, 174.7762),
                City::new("Adelaide", "AU", -34.9285, 138.6007),
                City::new("Fiji (Suva)", "FJ", -18.1248, 178.4501),
            ],
        );

        Self { continents }
    }
}

impl Default for CityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

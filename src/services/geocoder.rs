// src/services/geocoder.rs

//! Resolve free-text location names to coordinates.
//!
//! Known depot and city names are answered from an offline table. Other
//! names go to OpenCage, and if that fails a keyword match against major
//! cities is attempted.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Coordinates, GeocodingConfig};
use crate::utils::http::read_success_body;

const ZURICH: Coordinates = Coordinates::new(47.3769, 8.5417);
const BASEL: Coordinates = Coordinates::new(47.5596, 7.5886);
const BERN: Coordinates = Coordinates::new(46.9481, 7.4474);
const FRANKFURT: Coordinates = Coordinates::new(50.1109, 8.6821);
const MUNICH: Coordinates = Coordinates::new(48.1351, 11.5820);
const HAMBURG: Coordinates = Coordinates::new(53.5511, 9.9937);
const BERLIN: Coordinates = Coordinates::new(52.5200, 13.4050);
const VIENNA: Coordinates = Coordinates::new(48.2082, 16.3738);
const PARIS: Coordinates = Coordinates::new(48.8566, 2.3522);

/// Exact-match table, keyed by lower-cased name.
const KNOWN_LOCATIONS: &[(&str, Coordinates)] = &[
    // Switzerland
    ("zürich", ZURICH),
    ("basel", BASEL),
    ("bern", BERN),
    ("genf", Coordinates::new(46.2044, 6.1432)),
    ("winterthur", Coordinates::new(47.4996, 8.7273)),
    ("luzern", Coordinates::new(47.0502, 8.3093)),
    // Germany
    ("frankfurt", FRANKFURT),
    ("münchen", MUNICH),
    ("hamburg", HAMBURG),
    ("berlin", BERLIN),
    ("köln", Coordinates::new(50.9375, 6.9603)),
    ("stuttgart", Coordinates::new(48.7758, 9.1829)),
    // Austria
    ("wien", VIENNA),
    ("salzburg", Coordinates::new(47.8095, 13.0550)),
    ("innsbruck", Coordinates::new(47.2692, 11.4041)),
    // Europe
    ("paris", PARIS),
    ("amsterdam", Coordinates::new(52.3702, 4.8951)),
    ("mailand", Coordinates::new(45.4642, 9.1900)),
    // Depots
    ("verteilzentrum zürich", ZURICH),
    ("depot basel", BASEL),
    ("sortierzentrum frankfurt", FRANKFURT),
    ("dhl depot münchen", MUNICH),
];

/// Substring table, checked in order.
const CITY_KEYWORDS: &[(&str, Coordinates)] = &[
    ("zürich", ZURICH),
    ("basel", BASEL),
    ("bern", BERN),
    ("frankfurt", FRANKFURT),
    ("münchen", MUNICH),
    ("hamburg", HAMBURG),
    ("berlin", BERLIN),
    ("wien", VIENNA),
    ("paris", PARIS),
];

/// Look up a name in the offline table.
pub fn known_location(name: &str) -> Option<Coordinates> {
    let key = name.trim().to_lowercase();
    KNOWN_LOCATIONS
        .iter()
        .find(|(known, _)| *known == key)
        .map(|(_, coords)| *coords)
}

/// Find the first city keyword contained in a name.
pub fn fuzzy_location(name: &str) -> Option<Coordinates> {
    let lower = name.to_lowercase();
    CITY_KEYWORDS
        .iter()
        .find(|(city, _)| lower.contains(city))
        .map(|(city, coords)| {
            log::debug!("Fuzzy location match: {}", city);
            *coords
        })
}

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    geometry: OpenCageGeometry,
}

#[derive(Debug, Deserialize)]
struct OpenCageGeometry {
    lat: f64,
    lng: f64,
}

pub struct Geocoder<'a> {
    client: &'a Client,
    config: &'a GeocodingConfig,
}

impl<'a> Geocoder<'a> {
    pub fn new(client: &'a Client, config: &'a GeocodingConfig) -> Self {
        Self { client, config }
    }

    /// Resolve a location name. `None` means the name could not be placed.
    pub async fn geocode(&self, location: &str) -> Option<Coordinates> {
        if let Some(coords) = known_location(location) {
            log::debug!("Found '{}' in known locations", location);
            return Some(coords);
        }

        match self.query_opencage(location).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Geocoding failed for '{}': {}", location, e);
                fuzzy_location(location)
            }
        }
    }

    async fn query_opencage(&self, location: &str) -> Result<Option<Coordinates>> {
        if self.config.opencage_key.is_empty() {
            return Err(AppError::Geocoding("no OpenCage key configured".to_string()));
        }

        let response = self
            .client
            .get(&self.config.opencage_url)
            .query(&[
                ("q", location),
                ("key", self.config.opencage_key.as_str()),
                ("limit", "1"),
                ("no_annotations", "1"),
            ])
            .send()
            .await?;
        let body = read_success_body("opencage", response).await?;
        let parsed: OpenCageResponse = serde_json::from_str(&body)?;

        Ok(parsed
            .results
            .first()
            .map(|r| Coordinates::new(r.geometry.lat, r.geometry.lng)))
    }
}

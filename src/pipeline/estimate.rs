// src/pipeline/estimate.rs

//! Delivery estimate pipeline.

use chrono::{Local, Timelike};
use reqwest::Client;

use crate::error::Result;
use crate::models::{Config, Coordinates};
use crate::services::estimate::{demo_estimate, schedule_estimate};
use crate::services::{DeliveryEstimator, Geocoder};
use crate::utils::log;

/// Which estimate to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EstimateMode {
    /// Geocode the location and derive travel time from the distance
    #[default]
    Travel,
    /// Offline travel time using only the known-locations table
    Demo,
    /// Calendar arrival date from region, weekday and hour
    Schedule,
}

/// Estimate delivery for a package location and print it.
///
/// `user` falls back to the configured origin when absent.
pub async fn run_estimate(
    config: &Config,
    client: &Client,
    package_location: &str,
    user: Option<Coordinates>,
    mode: EstimateMode,
) -> Result<String> {
    let user = user.unwrap_or_else(|| {
        ::log::info!("No position given, using configured fallback origin");
        config.estimate.user_fallback()
    });
    let now = Local::now();

    log::header(&format!("Lieferzeit-Schätzung für {}", package_location));
    let text = match mode {
        EstimateMode::Travel => {
            let estimator = DeliveryEstimator::new(Geocoder::new(client, &config.geocoding));
            let text = estimator
                .calculate_delivery_estimate(package_location, user, now.hour())
                .await?;
            log::sub_item(&text);
            text
        }
        EstimateMode::Demo => {
            let text = demo_estimate(
                package_location,
                user,
                config.estimate.demo_origin(),
                now.hour(),
            );
            log::sub_item(&text);
            text
        }
        EstimateMode::Schedule => {
            let estimate =
                schedule_estimate(package_location, user, now.naive_local(), &mut rand::rng());
            log::sub_item(&estimate.full_text);
            log::sub_item(&format!("Entfernung: {:.1} km", estimate.distance_km));
            log::sub_item(&format!("Geschätzte Zeit: {}h", estimate.hours));
            log::sub_item(&format!("Vertrauen: {}", estimate.confidence));
            estimate.full_text
        }
    };

    Ok(text)
}

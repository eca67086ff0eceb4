// src/services/estimate.rs

//! Delivery time heuristics.
//!
//! Two independent estimates are offered: a travel-time estimate derived
//! from the distance between the package and the recipient, and a calendar
//! estimate derived from where the package is and when it is asked about.

use chrono::{Datelike, Days, Duration, NaiveDateTime, Timelike, Weekday};
use rand::Rng;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::timeline::UNKNOWN;
use crate::models::{Coordinates, PackageSnapshot};
use crate::services::geocoder::{Geocoder, known_location};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance bands as (upper bound in km, speed in km/h).
const SPEED_BANDS: &[(f64, f64)] = &[(5.0, 25.0), (20.0, 40.0), (100.0, 55.0), (f64::INFINITY, 70.0)];

const MIN_MINUTES: f64 = 30.0;
const MAX_MINUTES: f64 = 480.0;

/// Reference point of the calendar estimate.
const SCHEDULE_REFERENCE: Coordinates = Coordinates::new(47.3769, 8.5417);

/// Great-circle distance in km, rounded to two decimals.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    (EARTH_RADIUS_KM * c * 100.0).round() / 100.0
}

/// Estimated delivery time in minutes for a distance at a given hour of day.
///
/// Each band's speed applies only to the kilometres inside that band, so the
/// result never decreases as the distance grows.
pub fn delivery_minutes(distance_km: f64, hour: u32) -> u32 {
    let distance = if distance_km.is_finite() { distance_km.max(0.0) } else { 0.0 };

    let mut minutes = 0.0;
    let mut lower = 0.0;
    for &(upper, speed) in SPEED_BANDS {
        if distance <= lower {
            break;
        }
        minutes += (distance.min(upper) - lower) * 60.0 / speed;
        lower = upper;
    }

    // Sorting and handling
    minutes += (distance * 0.5).clamp(15.0, 45.0);

    // Extra stops on longer routes
    if distance > 10.0 {
        minutes += (distance / 20.0).floor() * 10.0;
    }

    if is_rush_hour(hour) {
        minutes *= 1.2;
    }

    minutes.clamp(MIN_MINUTES, MAX_MINUTES).round() as u32
}

fn is_rush_hour(hour: u32) -> bool {
    (7..=9).contains(&hour) || (17..=19).contains(&hour)
}

fn minutes_word(n: u32) -> &'static str {
    if n == 1 { "Minute" } else { "Minuten" }
}

fn hours_word(n: u32) -> &'static str {
    if n == 1 { "Stunde" } else { "Stunden" }
}

/// Render a duration in German, e.g. `1 Stunde 15 Minuten`.
pub fn format_duration(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{} {}", minutes, minutes_word(minutes));
    }

    let hours = minutes / 60;
    let rest = minutes % 60;
    if rest == 0 {
        format!("{} {}", hours, hours_word(hours))
    } else {
        format!("{} {} {} {}", hours, hours_word(hours), rest, minutes_word(rest))
    }
}

pub fn format_delivery_time(minutes: u32) -> String {
    format!("Voraussichtliche Lieferzeit: {}", format_duration(minutes))
}

/// Travel-time estimate using geocoding.
pub struct DeliveryEstimator<'a> {
    geocoder: Geocoder<'a>,
}

impl<'a> DeliveryEstimator<'a> {
    pub fn new(geocoder: Geocoder<'a>) -> Self {
        Self { geocoder }
    }

    /// Estimate from a package location name to the user's position.
    pub async fn calculate_delivery_estimate(
        &self,
        package_location: &str,
        user: Coordinates,
        hour: u32,
    ) -> Result<String> {
        let package = self
            .geocoder
            .geocode(package_location)
            .await
            .ok_or_else(|| estimate_failed("Paket-Standort konnte nicht gefunden werden"))?;

        let distance = haversine_km(package, user);
        let minutes = delivery_minutes(distance, hour);
        log::debug!(
            "Estimate for '{}': {} km, {} min",
            package_location,
            distance,
            minutes
        );
        Ok(format_delivery_time(minutes))
    }
}

fn estimate_failed(reason: impl std::fmt::Display) -> AppError {
    AppError::Estimate(format!("Schätzung fehlgeschlagen: {reason}"))
}

/// Offline estimate; unknown locations are placed at `fallback_origin`.
pub fn demo_estimate(
    package_location: &str,
    user: Coordinates,
    fallback_origin: Coordinates,
    hour: u32,
) -> String {
    let package = known_location(package_location).unwrap_or(fallback_origin);
    let distance = haversine_km(package, user);
    format!(
        "{} ({} km Entfernung)",
        format_delivery_time(delivery_minutes(distance, hour)),
        distance
    )
}

/// Calendar estimate of the arrival date and time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEstimate {
    pub full_text: String,
    pub arrival: NaiveDateTime,
    /// Rough distance to the reference point, one decimal
    pub distance_km: f64,
    pub hours: i64,
    pub confidence: &'static str,
}

/// Estimate an arrival time from the package location and the current time.
pub fn schedule_estimate<R: Rng>(
    package_location: &str,
    user: Coordinates,
    now: NaiveDateTime,
    rng: &mut R,
) -> ScheduleEstimate {
    let distance = ((user.latitude - SCHEDULE_REFERENCE.latitude).powi(2)
        + (user.longitude - SCHEDULE_REFERENCE.longitude).powi(2))
    .sqrt()
        * 111.0;

    let base = base_hours(package_location, now);
    let hours = (base * rng.random_range(0.8..1.2)).round() as i64;

    let mut arrival = now + Duration::hours(hours);
    if arrival.hour() < 8 {
        arrival = with_hour(arrival, 8 + rng.random_range(0..4));
    } else if arrival.hour() > 18 {
        arrival = with_hour(next_day(arrival), 8 + rng.random_range(0..6));
    }
    if arrival.weekday() == Weekday::Sun {
        arrival = with_hour(next_day(arrival), 9 + rng.random_range(0..5));
    }

    let prefix = if arrival.date() == now.date() {
        "Heute, "
    } else if Some(arrival.date()) == now.date().checked_add_days(Days::new(1)) {
        "Morgen, "
    } else {
        ""
    };

    ScheduleEstimate {
        full_text: format!("{prefix}{}", format_german_datetime(arrival)),
        arrival,
        distance_km: (distance * 10.0).round() / 10.0,
        hours,
        confidence: if package_location == UNKNOWN { "niedrig" } else { "hoch" },
    }
}

/// Hours until delivery by region, weekday and time of day.
fn base_hours(package_location: &str, now: NaiveDateTime) -> f64 {
    let location = package_location.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| location.contains(w));
    let weekend = matches!(now.weekday(), Weekday::Sat | Weekday::Sun);
    let hour = now.hour();

    // (weekend, late weekday, early weekday, cut-off hour)
    let (weekend_hours, late, early, cutoff) = if has(&["zürich", "zurich"]) {
        (4.0, 18.0, 2.0, 16)
    } else if has(&["basel", "bern"]) {
        (8.0, 24.0, 4.0, 14)
    } else if has(&["deutschland", "german"]) {
        (48.0, 36.0, 12.0, 12)
    } else if has(&["china", "asia"]) {
        (168.0, 120.0, 72.0, 10)
    } else {
        (24.0, 30.0, 8.0, 15)
    };

    if weekend {
        weekend_hours
    } else if hour > cutoff {
        late
    } else {
        early
    }
}

fn with_hour(dt: NaiveDateTime, hour: u32) -> NaiveDateTime {
    dt.with_hour(hour).unwrap_or(dt)
}

fn next_day(dt: NaiveDateTime) -> NaiveDateTime {
    dt.checked_add_days(Days::new(1)).unwrap_or(dt)
}

const WEEKDAYS: [&str; 7] = [
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
    "Sonntag",
];

const MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// e.g. `Montag, 20. Oktober 2026 um 14:30`
pub fn format_german_datetime(dt: NaiveDateTime) -> String {
    format!(
        "{}, {}. {} {} um {:02}:{:02}",
        WEEKDAYS[dt.weekday().num_days_from_monday() as usize],
        dt.day(),
        MONTHS[dt.month0() as usize],
        dt.year(),
        dt.hour(),
        dt.minute()
    )
}

/// Calendar estimate for a tracked package.
pub fn estimate_for_snapshot<R: Rng>(
    snapshot: &PackageSnapshot,
    user: Coordinates,
    now: NaiveDateTime,
    rng: &mut R,
) -> Result<ScheduleEstimate> {
    let location = snapshot.known_location().ok_or(AppError::MissingLocation)?;
    Ok(schedule_estimate(location, user, now, rng))
}

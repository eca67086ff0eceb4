// src/models/mod.rs

//! Domain models for the tracking application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

pub mod carrier;
mod config;
mod package;
mod scrape;
mod selectors;
pub mod timeline;
mod tracking;

// Re-export all public types
pub use carrier::{CarrierGuess, KNOWN_CARRIERS, KnownCarrier};
pub use config::{
    Config, EstimateConfig, GeocodingConfig, HttpConfig, Kuaidi100Config, ScraperConfig,
    ServerConfig, SwissPostConfig, TrackingConfig,
};
pub use package::{PackageSnapshot, TrackingRequest};
pub use scrape::{ScrapeResponse, ScrapedEvent};
pub use selectors::ScrapeSelectors;
pub use timeline::TimelineEvent;
pub use tracking::{DataSource, RawEvent, RawTrackingData, ShipmentStatus};

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

//! Service layer for the tracking application.
//!
//! This module contains the business logic for:
//! - Carrier detection (`CarrierDetector`)
//! - Backend clients (Kuaidi100, Swiss Post, the local scraping service)
//! - The tracking cascade (`Tracker`)
//! - Portal scraping (`PostScraper`)
//! - Geocoding and delivery estimates

pub mod demo;
pub mod detector;
pub mod estimate;
pub mod geocoder;
pub mod kuaidi100;
pub mod scrape_client;
pub mod scraper;
pub mod swisspost;
pub mod tracker;

pub use detector::CarrierDetector;
pub use estimate::{DeliveryEstimator, ScheduleEstimate};
pub use geocoder::Geocoder;
pub use kuaidi100::Kuaidi100Client;
pub use scrape_client::ScrapeServiceClient;
pub use scraper::{HttpPageSource, PageSource, PostScraper};
pub use swisspost::SwissPostClient;
pub use tracker::Tracker;

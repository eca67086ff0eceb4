//! Pipeline entry points for tracking operations.
//!
//! - `run_track`: Detect the carrier, fetch and print a shipment timeline
//! - `run_detect`: Print the carrier guess for a tracking number
//! - `run_estimate`: Estimate a delivery time for a package location
//! - `run_scrape`: Scrape the postal portal directly
//! - `run_validate`: Check the configuration

pub mod estimate;
pub mod scrape;
pub mod track;
pub mod validate;

pub use estimate::{EstimateMode, run_estimate};
pub use scrape::run_scrape;
pub use track::{TrackOptions, run_detect, run_track};
pub use validate::run_validate;

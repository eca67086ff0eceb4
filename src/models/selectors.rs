// src/models/selectors.rs

//! CSS selectors for scraping the postal tracking portal.

use serde::{Deserialize, Serialize};

/// CSS selectors for scraping the shipment timeline page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSelectors {
    /// Element that only exists once the shipment has been rendered
    #[serde(default = "default_ready")]
    pub ready_selector: String,

    /// Selector for each day group of events
    #[serde(default = "default_day")]
    pub day_selector: String,

    /// Selector for the date label within a day group
    #[serde(default = "default_date")]
    pub date_selector: String,

    /// Selector for each event row within a day group
    #[serde(default = "default_row")]
    pub row_selector: String,

    /// Selector for the time cell within a row
    #[serde(default = "default_time")]
    pub time_selector: String,

    /// Selector for the detail cells within a row (description, then location)
    #[serde(default = "default_detail")]
    pub detail_selector: String,

    /// Selector for the calculated delivery date
    #[serde(default = "default_estimate")]
    pub estimate_selector: String,

    /// Selector for candidate "show earlier" links
    #[serde(default = "default_load_more")]
    pub load_more_selector: String,
}

fn default_ready() -> String {
    ".font-weight-bold.h4".to_string()
}

fn default_day() -> String {
    "ekp-event-day".to_string()
}

fn default_date() -> String {
    ".sub-menu-item span".to_string()
}

fn default_row() -> String {
    "ekp-event-item .row.event".to_string()
}

fn default_time() -> String {
    ".time".to_string()
}

fn default_detail() -> String {
    "div.col-8 > div".to_string()
}

fn default_estimate() -> String {
    "#calculatedDeliveryDateNoAveDeliveryRange .font-weight-bold.h4".to_string()
}

fn default_load_more() -> String {
    "a.text-link".to_string()
}

impl Default for ScrapeSelectors {
    fn default() -> Self {
        Self {
            ready_selector: default_ready(),
            day_selector: default_day(),
            date_selector: default_date(),
            row_selector: default_row(),
            time_selector: default_time(),
            detail_selector: default_detail(),
            estimate_selector: default_estimate(),
            load_more_selector: default_load_more(),
        }
    }
}

impl ScrapeSelectors {
    /// All selector strings, for validation.
    pub fn all(&self) -> [&str; 8] {
        [
            &self.ready_selector,
            &self.day_selector,
            &self.date_selector,
            &self.row_selector,
            &self.time_selector,
            &self.detail_selector,
            &self.estimate_selector,
            &self.load_more_selector,
        ]
    }
}

// src/models/scrape.rs

//! Payload of the scraping service's `/track` endpoint.

use serde::{Deserialize, Serialize};

use crate::models::timeline::EventKind;
use crate::models::{DataSource, RawEvent, RawTrackingData};

/// One event row as read from the portal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedEvent {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub location: String,
}

/// Response body of `GET /track`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    pub delivery_estimate: Option<String>,
    #[serde(default)]
    pub timeline: Vec<ScrapedEvent>,
}

impl ScrapeResponse {
    /// Convert portal rows (newest first) into backend-neutral tracking data.
    pub fn into_tracking_data(self) -> RawTrackingData {
        let events: Vec<RawEvent> = self
            .timeline
            .into_iter()
            .map(|e| RawEvent {
                ftime: join_date_time(&e.date, &e.time),
                context: e.desc,
                location: Some(e.location).filter(|l| !l.trim().is_empty()),
            })
            .collect();

        let delivered = events
            .first()
            .is_some_and(|newest| EventKind::classify(&newest.context) == EventKind::Delivered);
        let state = if delivered { "3" } else { "2" };

        let mut data = RawTrackingData::new(state, true, events, DataSource::Scraper);
        data.delivery_estimate = self.delivery_estimate;
        data
    }
}

fn join_date_time(date: &str, time: &str) -> String {
    match (date.trim(), time.trim()) {
        ("", t) => t.to_string(),
        (d, "") => d.to_string(),
        (d, t) => format!("{d} {t}"),
    }
}

// src/models/package.rs

//! Package snapshot: everything known about one shipment at one moment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::timeline::{UNKNOWN, build_timeline, extract_location};
use crate::models::{CarrierGuess, DataSource, RawTrackingData, ShipmentStatus, TimelineEvent};

/// A tracking request: a number plus an optional carrier chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRequest {
    pub tracking_number: String,
    pub manual_carrier: Option<String>,
}

impl TrackingRequest {
    /// Create a request; the number is trimmed and an empty carrier is dropped.
    pub fn new(tracking_number: &str, manual_carrier: Option<&str>) -> Self {
        Self {
            tracking_number: tracking_number.trim().to_string(),
            manual_carrier: manual_carrier
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }
}

/// Normalized shipment state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSnapshot {
    pub tracking_number: String,
    pub carrier: String,
    pub carrier_code: String,
    pub status: ShipmentStatus,
    pub status_text: String,
    pub is_check: bool,
    /// Oldest first; the newest event is the active one
    pub timeline: Vec<TimelineEvent>,
    pub current_location: Option<String>,
    pub confidence: u8,
    pub last_update: DateTime<Utc>,
    pub is_manual_carrier: bool,
    pub source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_estimate: Option<String>,
}

impl PackageSnapshot {
    /// Assemble a snapshot from a carrier guess and backend data.
    pub fn assemble(
        tracking_number: &str,
        carrier: &CarrierGuess,
        data: RawTrackingData,
        is_manual_carrier: bool,
    ) -> Self {
        let status = ShipmentStatus::from_state(&data.state);
        let current_location = data.events.first().map(|newest| {
            newest
                .location
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| extract_location(&newest.context))
        });

        Self {
            tracking_number: tracking_number.to_string(),
            carrier: carrier.name.clone(),
            carrier_code: carrier.code.clone(),
            status,
            status_text: status.text().to_string(),
            is_check: data.is_check,
            timeline: build_timeline(&data.events),
            current_location,
            confidence: carrier.confidence,
            last_update: Utc::now(),
            is_manual_carrier,
            source: data.source,
            delivery_estimate: data.delivery_estimate,
        }
    }

    /// Current location, unless missing or unresolved.
    pub fn known_location(&self) -> Option<&str> {
        self.current_location
            .as_deref()
            .filter(|l| !l.is_empty() && *l != UNKNOWN)
    }
}

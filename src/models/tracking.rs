// src/models/tracking.rs

//! Backend-neutral tracking data, before normalization into a timeline.

use serde::{Deserialize, Serialize};

/// Where a snapshot's events came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Tracking aggregator (Kuaidi100)
    Aggregator,
    /// Swiss Post events API
    SwissPost,
    /// Local scraping service
    Scraper,
    /// Placeholder data substituted after every backend failed
    Demo,
}

/// One event as reported by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Backend timestamp, kept verbatim
    pub ftime: String,

    /// Free-text description
    pub context: String,

    /// Location when the backend reports it separately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl RawEvent {
    pub fn new(ftime: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            ftime: ftime.into(),
            context: context.into(),
            location: None,
        }
    }
}

/// Tracking data in aggregator shape. Events are newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrackingData {
    /// Aggregator state code, `"0"`..`"6"`
    pub state: String,

    /// Whether the backend marked the shipment as verified
    pub is_check: bool,

    pub events: Vec<RawEvent>,

    pub source: DataSource,

    /// Delivery date text reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_estimate: Option<String>,
}

impl RawTrackingData {
    pub fn new(state: impl Into<String>, is_check: bool, events: Vec<RawEvent>, source: DataSource) -> Self {
        Self {
            state: state.into(),
            is_check,
            events,
            source,
            delivery_estimate: None,
        }
    }
}

/// Shipment status derived from the aggregator state code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    PickedUp,
    InTransit,
    Delivered,
    Returned,
    Delivering,
    PickupReady,
    Unknown,
}

impl ShipmentStatus {
    /// Map an aggregator state code.
    pub fn from_state(state: &str) -> Self {
        match state.trim() {
            "0" => Self::Pending,
            "1" => Self::PickedUp,
            "2" => Self::InTransit,
            "3" => Self::Delivered,
            "4" => Self::Returned,
            "5" => Self::Delivering,
            "6" => Self::PickupReady,
            _ => Self::Unknown,
        }
    }

    /// Machine-readable status key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PickedUp => "picked_up",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Returned => "returned",
            Self::Delivering => "delivering",
            Self::PickupReady => "pickup_ready",
            Self::Unknown => "unknown",
        }
    }

    /// German display text.
    pub fn text(&self) -> &'static str {
        match self {
            Self::Pending => "Auf dem Transport",
            Self::PickedUp => "Abgeholt",
            Self::InTransit => "Unterwegs",
            Self::Delivered => "Zugestellt",
            Self::Returned => "Zurückgesendet",
            Self::Delivering => "Wird zugestellt",
            Self::PickupReady => "Bereit zur Abholung",
            Self::Unknown => "Status unbekannt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_mapping() {
        assert_eq!(ShipmentStatus::from_state("0"), ShipmentStatus::Pending);
        assert_eq!(ShipmentStatus::from_state("3"), ShipmentStatus::Delivered);
        assert_eq!(ShipmentStatus::from_state("6").as_str(), "pickup_ready");
        assert_eq!(ShipmentStatus::from_state("9"), ShipmentStatus::Unknown);
        assert_eq!(ShipmentStatus::from_state("").text(), "Status unbekannt");
    }
}

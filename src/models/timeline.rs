// src/models/timeline.rs

//! Timeline events and the text heuristics that derive them.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::RawEvent;

/// Placeholder for fields that could not be derived.
pub const UNKNOWN: &str = "Unbekannt";

/// One milestone in a shipment's history, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: String,
    pub location: String,
    pub status: String,
    pub description: String,
    pub icon: String,
    pub is_active: bool,
}

impl TimelineEvent {
    /// Build an event; `is_latest` marks the newest event of the shipment.
    pub fn from_raw(raw: &RawEvent, is_latest: bool) -> Self {
        let location = raw
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| extract_location(&raw.context));
        let kind = EventKind::classify(&raw.context);

        Self {
            date: raw.ftime.clone(),
            location,
            status: kind.label(is_latest).to_string(),
            description: raw.context.clone(),
            icon: kind.icon(is_latest).to_string(),
            is_active: is_latest,
        }
    }
}

/// Normalize newest-first backend events into a timeline.
///
/// The newest event is the active one; the result is reversed, so it
/// reads oldest first.
pub fn build_timeline(events: &[RawEvent]) -> Vec<TimelineEvent> {
    let mut timeline: Vec<TimelineEvent> = events
        .iter()
        .enumerate()
        .map(|(index, raw)| TimelineEvent::from_raw(raw, index == 0))
        .collect();
    timeline.reverse();
    timeline
}

static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"【(.+?)】",
        r"\[(.+?)\]",
        r"^(.+?)[,:]",
        r"(?i)(\w+(?:\s+\w+)*(?:\s+(?:Sortierzentrum|Depot|Center|Hub|Station)))",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Pull a location token out of a free-text event description.
///
/// Tries full-width brackets, square brackets, the text before the first
/// comma or colon, then a `<name> Depot`-style phrase. Returns
/// [`UNKNOWN`] when nothing longer than one character matches.
pub fn extract_location(context: &str) -> String {
    for pattern in LOCATION_PATTERNS.iter() {
        if let Some(found) = pattern.captures(context).and_then(|caps| caps.get(1)) {
            if found.as_str().chars().count() > 1 {
                return found.as_str().trim().to_string();
            }
        }
    }
    UNKNOWN.to_string()
}

/// Event category recognised from description keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Delivered,
    InTransit,
    PickedUp,
    Sorted,
    Arrived,
    Dispatched,
    Other,
}

const KEYWORDS: &[(EventKind, &[&str])] = &[
    (EventKind::Delivered, &["delivered", "zugestellt", "签收"]),
    (EventKind::InTransit, &["transit", "unterwegs", "运输中"]),
    (EventKind::PickedUp, &["picked", "abgeholt", "已取件"]),
    (EventKind::Sorted, &["sorted", "sortiert", "分拣"]),
    (EventKind::Arrived, &["arrived", "angekommen", "到达"]),
    (EventKind::Dispatched, &["出库", "发出"]),
];

impl EventKind {
    /// First category whose keywords occur in the description.
    pub fn classify(context: &str) -> Self {
        let lower = context.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(kind, _)| *kind)
            .unwrap_or(Self::Other)
    }

    pub fn label(&self, is_latest: bool) -> &'static str {
        match self {
            Self::Delivered => "Zugestellt",
            Self::InTransit => "Unterwegs",
            Self::PickedUp => "Abgeholt",
            Self::Sorted => "Sortiert",
            Self::Arrived => "Angekommen",
            Self::Dispatched => "Versandt",
            Self::Other if is_latest => "Aktuell",
            Self::Other => "Verarbeitet",
        }
    }

    pub fn icon(&self, is_latest: bool) -> &'static str {
        match self {
            Self::Delivered => "checkmark-circle",
            Self::InTransit => "car",
            Self::PickedUp => "cube",
            Self::Sorted => "git-network",
            Self::Arrived => "location",
            Self::Dispatched => "send",
            Self::Other if is_latest => "radio-button-on",
            Self::Other => "radio-button-off",
        }
    }
}

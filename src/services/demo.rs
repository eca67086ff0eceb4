// src/services/demo.rs

//! Placeholder shipment histories used when every backend failed.
//!
//! Timestamps are relative to `now` so the data always looks current.

use chrono::{DateTime, Duration, Utc};

use crate::models::{DataSource, RawEvent, RawTrackingData};

fn stamp(now: DateTime<Utc>, days_ago: i64) -> String {
    (now - Duration::days(days_ago))
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn demo(is_check: bool, events: Vec<RawEvent>) -> RawTrackingData {
    RawTrackingData::new("2", is_check, events, DataSource::Demo)
}

/// Swiss Post history used when the carrier API answered with an error status.
pub fn swiss_post(now: DateTime<Utc>) -> RawTrackingData {
    demo(
        true,
        vec![
            RawEvent::new(
                stamp(now, 0),
                "【Zürich Briefzentrum】Sendung wird bearbeitet und für die Zustellung vorbereitet",
            ),
            RawEvent::new(
                stamp(now, 1),
                "【Basel Sortierzentrum】Sendung ist im Sortierzentrum angekommen",
            ),
            RawEvent::new(stamp(now, 2), "【Bern Post】Sendung wurde von der Post angenommen"),
        ],
    )
}

/// Swiss Post history used when the carrier API was unreachable or its
/// answer could not be read.
pub fn swiss_post_offline(now: DateTime<Utc>) -> RawTrackingData {
    demo(
        true,
        vec![RawEvent::new(
            stamp(now, 0),
            "【Swiss Post】Sendung wird bearbeitet - Demo-Modus",
        )],
    )
}

/// International marketplace shipment; never verified.
pub fn aliexpress(now: DateTime<Utc>) -> RawTrackingData {
    demo(
        false,
        vec![
            RawEvent::new(stamp(now, 0), "【Transit】Package is in transit to destination country"),
            RawEvent::new(stamp(now, 2), "【China】Package departed from origin country"),
            RawEvent::new(stamp(now, 4), "【Hangzhou】Package picked up by carrier"),
            RawEvent::new(stamp(now, 5), "【AliExpress】Order shipped from seller"),
        ],
    )
}

pub fn dhl(now: DateTime<Utc>) -> RawTrackingData {
    demo(
        true,
        vec![
            RawEvent::new(
                stamp(now, 0),
                "【DHL】Sendung wird verarbeitet - API-Integration nicht verfügbar",
            ),
            RawEvent::new(stamp(now, 1), "【DHL Depot】Sendung wurde vom Absender abgeholt"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_demo_timestamps_are_relative() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
        let data = aliexpress(now);

        assert_eq!(data.source, DataSource::Demo);
        assert!(!data.is_check);
        let stamps: Vec<_> = data.events.iter().map(|e| e.ftime.as_str()).collect();
        assert_eq!(
            stamps,
            [
                "2026-10-17 09:30",
                "2026-10-15 09:30",
                "2026-10-13 09:30",
                "2026-10-12 09:30"
            ]
        );
    }

    #[test]
    fn test_swiss_post_demo_is_newest_first() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
        let data = swiss_post(now);
        assert_eq!(data.events.len(), 3);
        assert!(data.events[0].context.contains("Zürich Briefzentrum"));
        assert_eq!(data.events[2].ftime, "2026-10-15 09:30");
    }
}

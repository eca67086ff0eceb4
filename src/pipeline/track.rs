// src/pipeline/track.rs

//! Shipment tracking pipeline.

use chrono::Local;
use reqwest::Client;

use crate::error::Result;
use crate::models::timeline::UNKNOWN;
use crate::models::{CarrierGuess, Config, Coordinates, DataSource, PackageSnapshot, TrackingRequest};
use crate::services::Tracker;
use crate::services::estimate::estimate_for_snapshot;
use crate::utils::log;

/// Options for a tracking run.
#[derive(Debug, Clone, Default)]
pub struct TrackOptions {
    pub carrier: Option<String>,
    pub json: bool,
    /// Also print a calendar estimate from this position
    pub estimate_from: Option<Coordinates>,
}

/// Track a shipment and print the result.
pub async fn run_track(
    config: &Config,
    client: &Client,
    tracking_number: &str,
    options: &TrackOptions,
) -> Result<PackageSnapshot> {
    let request = TrackingRequest::new(tracking_number, options.carrier.as_deref());
    let snapshot = Tracker::new(config, client).track(&request).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }

    if let Some(user) = options.estimate_from {
        match estimate_for_snapshot(&snapshot, user, Local::now().naive_local(), &mut rand::rng()) {
            Ok(estimate) => {
                log::header("Voraussichtliche Ankunft");
                log::sub_item(&estimate.full_text);
                log::sub_item(&format!("Entfernung: {:.1} km", estimate.distance_km));
                log::sub_item(&format!("Geschätzte Zeit: {}h", estimate.hours));
                log::sub_item(&format!("Vertrauen: {}", estimate.confidence));
            }
            Err(e) => log::warn_line(&e.to_string()),
        }
    }

    Ok(snapshot)
}

fn print_snapshot(snapshot: &PackageSnapshot) {
    log::header(&format!("Sendung {}", snapshot.tracking_number));

    let carrier_note = if snapshot.is_manual_carrier {
        " (manuell gewählt)"
    } else {
        ""
    };
    log::sub_item(&format!(
        "Carrier: {} [{}], Konfidenz {}/5{}",
        snapshot.carrier, snapshot.carrier_code, snapshot.confidence, carrier_note
    ));
    log::sub_item(&format!("Status: {}", snapshot.status_text));
    log::sub_item(&format!(
        "Verifiziert: {}",
        if snapshot.is_check { "ja" } else { "nein" }
    ));
    log::sub_item(&format!(
        "Standort: {}",
        snapshot.current_location.as_deref().unwrap_or(UNKNOWN)
    ));
    if let Some(estimate) = &snapshot.delivery_estimate {
        log::sub_item(&format!("Zustellung laut Carrier: {}", estimate));
    }
    if snapshot.source == DataSource::Demo {
        log::warn_line("Keine Live-Daten verfügbar, es werden Demo-Daten angezeigt");
    }

    // Newest first on screen
    for event in snapshot.timeline.iter().rev() {
        let marker = if event.is_active { "●" } else { "○" };
        log::sub_item(&format!(
            "{} {}  {} | {}: {}",
            marker, event.date, event.status, event.location, event.description
        ));
    }

    log::summary(
        "Tracking",
        &[
            ("Ereignisse", snapshot.timeline.len().to_string()),
            ("Quelle", format!("{:?}", snapshot.source)),
            (
                "Letztes Update",
                snapshot.last_update.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ),
        ],
    );
}

/// Detect the carrier for a tracking number and print it.
pub async fn run_detect(config: &Config, client: &Client, tracking_number: &str) -> Result<CarrierGuess> {
    let guess = Tracker::new(config, client)
        .detect(tracking_number.trim())
        .await?;

    log::header(&format!("Carrier-Erkennung {}", tracking_number.trim()));
    log::sub_item(&format!("Carrier: {}", guess.name));
    log::sub_item(&format!("Code: {}", guess.code));
    log::sub_item(&format!("Konfidenz: {}/5", guess.confidence));

    Ok(guess)
}

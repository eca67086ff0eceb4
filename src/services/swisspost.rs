// src/services/swisspost.rs

//! Swiss Post events API client.

use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{DataSource, RawEvent, RawTrackingData, SwissPostConfig};
use crate::utils::encode_path_segment;
use crate::utils::http::read_success_body;

const BACKEND: &str = "swisspost";

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<SwissPostEvent>,
}

#[derive(Debug, Deserialize)]
struct SwissPostEvent {
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    description: String,
}

pub struct SwissPostClient<'a> {
    client: &'a Client,
    config: &'a SwissPostConfig,
}

impl<'a> SwissPostClient<'a> {
    pub fn new(client: &'a Client, config: &'a SwissPostConfig) -> Self {
        Self { client, config }
    }

    fn events_url(&self, tracking_number: &str) -> String {
        format!(
            "{}/packages/{}/events",
            self.config.api_base_url.trim_end_matches('/'),
            encode_path_segment(tracking_number)
        )
    }

    /// Fetch the event list for a parcel.
    ///
    /// The API carries no shipment state, so results are reported as in
    /// transit and verified. A body that is not JSON surfaces as
    /// [`AppError::Json`](crate::error::AppError::Json).
    pub async fn fetch_events(&self, tracking_number: &str) -> Result<RawTrackingData> {
        let url = self.events_url(tracking_number);
        log::debug!("Swiss Post API call: {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let body = read_success_body(BACKEND, response).await?;
        parse_events(&body)
    }
}

fn parse_events(body: &str) -> Result<RawTrackingData> {
    let parsed: EventsResponse = serde_json::from_str(body)?;

    let events = parsed
        .events
        .into_iter()
        .map(|e| RawEvent::new(e.timestamp, e.description))
        .collect();

    Ok(RawTrackingData::new("2", true, events, DataSource::SwissPost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_events_url() {
        let client = Client::new();
        let config = SwissPostConfig {
            api_base_url: "https://api.example.ch/v1/".to_string(),
            ..SwissPostConfig::default()
        };
        assert_eq!(
            SwissPostClient::new(&client, &config).events_url("99.60.123456.12345678"),
            "https://api.example.ch/v1/packages/99.60.123456.12345678/events"
        );
    }

    #[test]
    fn test_parse_events() {
        let body = r#"{"events":[
            {"timestamp":"2026-10-17T08:15:00","description":"Zugestellt"},
            {"timestamp":"2026-10-16T18:40:00","description":"Basel Sortierzentrum: Sortiert"}
        ]}"#;
        let data = parse_events(body).unwrap();

        assert_eq!(data.state, "2");
        assert!(data.is_check);
        assert_eq!(data.source, DataSource::SwissPost);
        assert_eq!(data.events.len(), 2);
        assert_eq!(data.events[0].context, "Zugestellt");
    }

    #[test]
    fn test_events_url_escapes_number() {
        let client = Client::new();
        let config = SwissPostConfig {
            api_base_url: "https://api.example.ch/v1".to_string(),
            ..SwissPostConfig::default()
        };
        assert_eq!(
            SwissPostClient::new(&client, &config).events_url("../AB#1"),
            "https://api.example.ch/v1/packages/..%2FAB%231/events"
        );
    }

    #[test]
    fn test_parse_events_not_json() {
        let err = parse_events("<html>Wartung</html>").unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }

    #[test]
    fn test_parse_events_missing_list() {
        let data = parse_events("{}").unwrap();
        assert!(data.events.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_api_is_error() {
        let client = Client::new();
        let config = SwissPostConfig {
            api_base_url: "http://127.0.0.1:1/v1".to_string(),
            ..SwissPostConfig::default()
        };
        let result = SwissPostClient::new(&client, &config)
            .fetch_events("99.60.123456.12345678")
            .await;
        assert!(matches!(result, Err(AppError::Http(_))));
    }
}

// src/services/scrape_client.rs

//! Client for the local scraping service's `/track` endpoint.

use reqwest::Client;
use reqwest::header::ACCEPT;

use crate::error::{AppError, Result};
use crate::models::{RawTrackingData, ScrapeResponse};
use crate::utils::http::read_success_body;

const BACKEND: &str = "scraper";

pub struct ScrapeServiceClient<'a> {
    client: &'a Client,
    base_url: &'a str,
}

impl<'a> ScrapeServiceClient<'a> {
    pub fn new(client: &'a Client, base_url: &'a str) -> Self {
        Self { client, base_url }
    }

    /// Ask the service to scrape one tracking number.
    pub async fn fetch(&self, tracking_number: &str) -> Result<ScrapeResponse> {
        let url = format!("{}/track", self.base_url.trim_end_matches('/'));
        log::debug!("Scrape service call: {}?tracking={}", url, tracking_number);

        let response = self
            .client
            .get(&url)
            .query(&[("tracking", tracking_number)])
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let body = read_success_body(BACKEND, response).await?;

        serde_json::from_str(&body)
            .map_err(|e| AppError::api(BACKEND, format!("Ungültige Antwort: {e}")))
    }

    /// Scrape and convert into raw tracking data, newest event first.
    pub async fn fetch_tracking(&self, tracking_number: &str) -> Result<RawTrackingData> {
        let response = self.fetch(tracking_number).await?;
        if response.timeline.is_empty() {
            return Err(AppError::api(BACKEND, "Keine Sendungsereignisse gefunden"));
        }
        Ok(response.into_tracking_data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_service_is_error() {
        let client = Client::new();
        let result = ScrapeServiceClient::new(&client, "http://127.0.0.1:1/")
            .fetch_tracking("99.60.123456.12345678")
            .await;
        assert!(matches!(result, Err(AppError::Http(_))));
    }
}

// src/services/tracker.rs

//! Tracking cascade.
//!
//! Resolves the carrier, then walks the backends for that carrier in order
//! until one answers. When all of them fail, placeholder data may be
//! substituted and is marked as such.

use chrono::Utc;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{CarrierGuess, Config, PackageSnapshot, RawTrackingData, TrackingRequest};
use crate::services::demo;
use crate::services::detector::CarrierDetector;
use crate::services::kuaidi100::Kuaidi100Client;
use crate::services::scrape_client::ScrapeServiceClient;
use crate::services::swisspost::SwissPostClient;

/// Service that turns a tracking request into a package snapshot.
pub struct Tracker<'a> {
    config: &'a Config,
    client: &'a Client,
}

impl<'a> Tracker<'a> {
    pub fn new(config: &'a Config, client: &'a Client) -> Self {
        Self { config, client }
    }

    /// Track a shipment end to end.
    pub async fn track(&self, request: &TrackingRequest) -> Result<PackageSnapshot> {
        if request.tracking_number.is_empty() {
            return Err(AppError::validation("Trackingnummer fehlt"));
        }

        let number = request.tracking_number.as_str();
        let carrier = match request.manual_carrier.as_deref() {
            Some(code) => {
                let guess = CarrierGuess::manual(code);
                log::info!("Using manual carrier {} ({})", guess.name, guess.code);
                guess
            }
            None => {
                let guess = self.detect(number).await?;
                log::info!(
                    "Detected carrier {} ({}), confidence {}",
                    guess.name,
                    guess.code,
                    guess.confidence
                );
                guess
            }
        };

        let data = self.fetch_tracking_data(number, &carrier.code).await?;
        log::info!("{} events from {:?}", data.events.len(), data.source);

        Ok(PackageSnapshot::assemble(
            number,
            &carrier,
            data,
            request.manual_carrier.is_some(),
        ))
    }

    /// Detect the carrier without tracking.
    pub async fn detect(&self, tracking_number: &str) -> Result<CarrierGuess> {
        CarrierDetector::new(self.client, &self.config.kuaidi100)
            .detect(tracking_number)
            .await
    }

    /// Fetch raw tracking data from the backends responsible for a carrier.
    pub async fn fetch_tracking_data(
        &self,
        tracking_number: &str,
        carrier_code: &str,
    ) -> Result<RawTrackingData> {
        match carrier_code {
            "swisspost" => self.fetch_swisspost(tracking_number).await,
            "chinapost" | "cainiao" => {
                let result = self
                    .query_codes(&self.config.kuaidi100.china_post_codes, tracking_number)
                    .await;
                self.or_demo(result, demo::aliexpress)
            }
            "dhl" => {
                let result = self
                    .query_codes(&self.config.kuaidi100.dhl_codes, tracking_number)
                    .await;
                self.or_demo(result, demo::dhl)
            }
            code => self.aggregator().query(code, tracking_number).await,
        }
    }

    async fn fetch_swisspost(&self, tracking_number: &str) -> Result<RawTrackingData> {
        if let Some(base_url) = self.config.swisspost.scraper_service() {
            match ScrapeServiceClient::new(self.client, base_url)
                .fetch_tracking(tracking_number)
                .await
            {
                Ok(data) => return Ok(data),
                Err(e) => log::warn!("Scrape service failed: {}", e),
            }
        }

        let result = SwissPostClient::new(self.client, &self.config.swisspost)
            .fetch_events(tracking_number)
            .await;
        match result {
            Ok(data) => Ok(data),
            Err(e @ (AppError::Http(_) | AppError::Json(_))) => {
                self.or_demo(Err(e), demo::swiss_post_offline)
            }
            Err(e) => self.or_demo(Err(e), demo::swiss_post),
        }
    }

    /// Try each aggregator code in turn; the last error wins.
    async fn query_codes(&self, codes: &[String], tracking_number: &str) -> Result<RawTrackingData> {
        let aggregator = self.aggregator();
        let mut last_error = None;

        for code in codes {
            log::debug!("Trying carrier code {}", code);
            match aggregator.query(code, tracking_number).await {
                Ok(data) => {
                    log::info!("Found tracking data with carrier code {}", code);
                    return Ok(data);
                }
                Err(e) => {
                    log::debug!("Carrier code {} failed: {}", code, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::config("no aggregator carrier codes configured")))
    }

    fn or_demo(
        &self,
        result: Result<RawTrackingData>,
        fallback: fn(chrono::DateTime<Utc>) -> RawTrackingData,
    ) -> Result<RawTrackingData> {
        match result {
            Ok(data) => Ok(data),
            Err(e) if self.config.tracking.allow_demo_fallback => {
                log::warn!("All backends failed ({}), using demo data", e);
                Ok(fallback(Utc::now()))
            }
            Err(e) => Err(e),
        }
    }

    fn aggregator(&self) -> Kuaidi100Client<'_> {
        Kuaidi100Client::new(self.client, &self.config.kuaidi100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataSource, ShipmentStatus};

    const UNREACHABLE: &str = "http://127.0.0.1:1";

    fn offline_config(allow_demo: bool) -> Config {
        let mut config = Config::default();
        config.kuaidi100.auto_detect_url = format!("{UNREACHABLE}/autonumber/auto");
        config.kuaidi100.tracking_url = format!("{UNREACHABLE}/poll/query.do");
        config.swisspost.api_base_url = format!("{UNREACHABLE}/v1");
        config.swisspost.scraper_service_url = Some(UNREACHABLE.to_string());
        config.tracking.allow_demo_fallback = allow_demo;
        config
    }

    #[tokio::test]
    async fn test_swisspost_falls_back_to_demo() {
        let config = offline_config(true);
        let client = Client::new();
        let tracker = Tracker::new(&config, &client);

        let snapshot = tracker
            .track(&TrackingRequest::new("99.60.123456.12345678", None))
            .await
            .unwrap();

        assert_eq!(snapshot.carrier_code, "swisspost");
        assert_eq!(snapshot.source, DataSource::Demo);
        assert_eq!(snapshot.status, ShipmentStatus::InTransit);
        assert_eq!(snapshot.current_location.as_deref(), Some("Swiss Post"));
        assert!(!snapshot.is_manual_carrier);
    }

    #[tokio::test]
    async fn test_china_post_demo_is_unverified() {
        let config = offline_config(true);
        let client = Client::new();
        let tracker = Tracker::new(&config, &client);

        let snapshot = tracker
            .track(&TrackingRequest::new("RB123456789CN", None))
            .await
            .unwrap();

        assert_eq!(snapshot.carrier, "China Post");
        assert!(!snapshot.is_check);
        assert_eq!(snapshot.timeline.len(), 4);
        assert_eq!(snapshot.timeline[0].location, "AliExpress");
        assert!(snapshot.timeline[3].is_active);
        assert_eq!(snapshot.current_location.as_deref(), Some("Transit"));
    }

    #[tokio::test]
    async fn test_manual_dhl_uses_dhl_demo() {
        let config = offline_config(true);
        let client = Client::new();
        let tracker = Tracker::new(&config, &client);

        let snapshot = tracker
            .track(&TrackingRequest::new("ABC", Some("DHL")))
            .await
            .unwrap();

        assert!(snapshot.is_manual_carrier);
        assert_eq!(snapshot.confidence, 5);
        assert_eq!(snapshot.current_location.as_deref(), Some("DHL"));
        assert_eq!(snapshot.timeline.len(), 2);
    }

    #[tokio::test]
    async fn test_demo_disabled_returns_error() {
        let config = offline_config(false);
        let client = Client::new();
        let tracker = Tracker::new(&config, &client);

        let result = tracker
            .track(&TrackingRequest::new("99.60.123456.12345678", None))
            .await;
        assert!(matches!(result, Err(AppError::Http(_))));
    }

    #[tokio::test]
    async fn test_other_carriers_propagate_errors() {
        let config = offline_config(true);
        let client = Client::new();
        let tracker = Tracker::new(&config, &client);

        let result = tracker
            .track(&TrackingRequest::new("1Z999AA10123456784", None))
            .await;
        assert!(matches!(result, Err(AppError::Http(_))));
    }

    #[tokio::test]
    async fn test_empty_number_rejected() {
        let config = offline_config(true);
        let client = Client::new();
        let tracker = Tracker::new(&config, &client);

        let err = tracker.track(&TrackingRequest::new("  ", None)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_code_list_without_demo() {
        let mut config = offline_config(false);
        config.kuaidi100.dhl_codes.clear();
        let client = Client::new();
        let tracker = Tracker::new(&config, &client);

        let err = tracker.fetch_tracking_data("123456789", "dhl").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[cfg(feature = "server")]
    mod backends {
        use super::*;
        use crate::server::fixture::FixtureServer;

        const SWISSPOST_NUMBER: &str = "99.60.123456.12345678";

        const AGGREGATOR_OK: &str = r#"{"message":"ok","state":3,"ischeck":1,"data":[
            {"ftime":"2026-10-17 09:12","context":"[Leipzig] Zugestellt"},
            {"ftime":"2026-10-16 18:40","context":"[Halle] Sortiert"}]}"#;

        const AGGREGATOR_NO_RESULT: &str =
            r#"{"result":false,"returnCode":"400","message":"查询无结果"}"#;

        fn point_at(server: &FixtureServer) -> Config {
            let mut config = offline_config(false);
            config.kuaidi100.tracking_url = server.url("/poll/query.do");
            config.kuaidi100.auto_detect_url = server.url("/autonumber/auto");
            config.swisspost.api_base_url = server.url("/v1");
            config.swisspost.scraper_service_url = Some(server.url(""));
            config
        }

        fn carrier_codes(server: &FixtureServer) -> Vec<String> {
            server
                .requests()
                .iter()
                .filter_map(|r| r.carrier_code())
                .collect()
        }

        #[tokio::test]
        async fn test_dhl_first_answering_code_wins() {
            let server = FixtureServer::start(|req| match req.carrier_code().as_deref() {
                Some("dhlde") => (200, AGGREGATOR_OK.to_string()),
                _ => (200, AGGREGATOR_NO_RESULT.to_string()),
            })
            .await;
            let config = point_at(&server);
            let client = Client::new();

            let data = Tracker::new(&config, &client)
                .fetch_tracking_data("123456789", "dhl")
                .await
                .unwrap();

            assert_eq!(data.source, DataSource::Aggregator);
            assert_eq!(data.state, "3");
            assert!(data.is_check);
            assert_eq!(data.events.len(), 2);
            assert_eq!(carrier_codes(&server), ["dhl", "dhlde"]);
            assert_eq!(
                server.requests()[0].form_field("sign").map(|s| s.len()),
                Some(32)
            );
        }

        #[tokio::test]
        async fn test_china_codes_tried_in_order_last_error_wins() {
            let server = FixtureServer::start(|req| match req.carrier_code().as_deref() {
                Some("cainiao") => (503, String::new()),
                _ => (200, AGGREGATOR_NO_RESULT.to_string()),
            })
            .await;
            let config = point_at(&server);
            let client = Client::new();

            let err = Tracker::new(&config, &client)
                .fetch_tracking_data("RB123456789CN", "chinapost")
                .await
                .unwrap_err();

            assert_eq!(carrier_codes(&server), ["chinapost", "ems", "cainiao"]);
            assert_eq!(err.to_string(), "kuaidi100: HTTP 503: Service Unavailable");
        }

        #[tokio::test]
        async fn test_china_success_snapshot() {
            let server = FixtureServer::start(|_| (200, AGGREGATOR_OK.to_string())).await;
            let config = point_at(&server);
            let client = Client::new();

            let snapshot = Tracker::new(&config, &client)
                .track(&TrackingRequest::new("RB123456789CN", None))
                .await
                .unwrap();

            assert_eq!(snapshot.source, DataSource::Aggregator);
            assert_eq!(snapshot.status, ShipmentStatus::Delivered);
            assert_eq!(carrier_codes(&server), ["chinapost"]);
        }

        #[tokio::test]
        async fn test_scrape_service_answer_skips_api() {
            let server = FixtureServer::start(|req| match req.path.as_str() {
                "/track" => (
                    200,
                    r#"{"deliveryEstimate":"Mo. 20.10.2026","timeline":[
                        {"date":"Fr. 17.10.2026","time":"07:05","desc":"In Zustellung","location":"8001 Zürich"}]}"#
                        .to_string(),
                ),
                _ => (500, String::new()),
            })
            .await;
            let config = point_at(&server);
            let client = Client::new();

            let data = Tracker::new(&config, &client)
                .fetch_tracking_data(SWISSPOST_NUMBER, "swisspost")
                .await
                .unwrap();

            assert_eq!(data.source, DataSource::Scraper);
            assert_eq!(data.delivery_estimate.as_deref(), Some("Mo. 20.10.2026"));

            let requests = server.requests();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].path, "/track");
            assert_eq!(
                requests[0].query_param("tracking").as_deref(),
                Some(SWISSPOST_NUMBER)
            );
        }

        #[tokio::test]
        async fn test_empty_scrape_timeline_falls_through_to_api() {
            let server = FixtureServer::start(|req| match req.path.as_str() {
                "/track" => (200, r#"{"deliveryEstimate":null,"timeline":[]}"#.to_string()),
                _ => (
                    200,
                    r#"{"events":[{"timestamp":"2026-10-17T08:15:00","description":"Zugestellt"}]}"#
                        .to_string(),
                ),
            })
            .await;
            let config = point_at(&server);
            let client = Client::new();

            let data = Tracker::new(&config, &client)
                .fetch_tracking_data(SWISSPOST_NUMBER, "swisspost")
                .await
                .unwrap();

            assert_eq!(data.source, DataSource::SwissPost);
            let paths: Vec<String> = server.requests().into_iter().map(|r| r.path).collect();
            assert_eq!(
                paths,
                ["/track", "/v1/packages/99.60.123456.12345678/events"]
            );
        }

        #[tokio::test]
        async fn test_disabled_scrape_service_goes_straight_to_api() {
            let server = FixtureServer::start(|_| (200, r#"{"events":[]}"#.to_string())).await;
            let mut config = point_at(&server);
            config.swisspost.scraper_service_url = Some(String::new());
            let client = Client::new();

            let data = Tracker::new(&config, &client)
                .fetch_tracking_data(SWISSPOST_NUMBER, "swisspost")
                .await
                .unwrap();

            assert_eq!(data.source, DataSource::SwissPost);
            let requests = server.requests();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].method, "GET");
            assert!(requests[0].path.starts_with("/v1/packages/"));
        }

        #[tokio::test]
        async fn test_unreadable_api_body_uses_offline_placeholder() {
            let server = FixtureServer::start(|req| match req.path.as_str() {
                "/track" => (502, String::new()),
                _ => (200, "<html>Wartung</html>".to_string()),
            })
            .await;
            let mut config = point_at(&server);
            config.tracking.allow_demo_fallback = true;
            let client = Client::new();

            let data = Tracker::new(&config, &client)
                .fetch_tracking_data(SWISSPOST_NUMBER, "swisspost")
                .await
                .unwrap();

            assert_eq!(data.source, DataSource::Demo);
            assert_eq!(data.events.len(), 1);
            assert!(data.events[0].context.ends_with("Demo-Modus"));
        }

        #[tokio::test]
        async fn test_api_error_status_uses_full_demo() {
            let server = FixtureServer::start(|_| (500, String::new())).await;
            let mut config = point_at(&server);
            config.tracking.allow_demo_fallback = true;
            let client = Client::new();

            let data = Tracker::new(&config, &client)
                .fetch_tracking_data(SWISSPOST_NUMBER, "swisspost")
                .await
                .unwrap();

            assert_eq!(data.source, DataSource::Demo);
            assert_eq!(data.events.len(), 3);
        }
    }
}

// src/services/detector.rs

//! Carrier detection from the shape of a tracking number.
//!
//! Detection runs an ordered local pattern table first. Numbers it does
//! not recognise are sent to the aggregator's auto-detection endpoint, and
//! a length-based heuristic covers anything the remote side cannot answer.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{CarrierGuess, Kuaidi100Config};
use crate::services::kuaidi100::{AutoDetect, Kuaidi100Client};

/// One entry of the local pattern table.
struct CarrierPattern {
    pattern: Regex,
    code: &'static str,
    name: &'static str,
    confidence: u8,
}

/// Order matters: the first matching pattern wins.
const PATTERN_TABLE: &[(&str, &str, &str, u8)] = &[
    (r"^99\.\d{2}\.\d{6}\.\d{8}$", "swisspost", "Swiss Post", 4),
    (r"^[A-Z]{2}\d{9}[A-Z]{2}$", "chinapost", "China Post", 3),
    (r"^00\d{18}$", "dhl", "DHL Express", 4),
    (r"^\d{9}$", "dhl", "DHL", 3),
    (r"^\d{10}$", "dhl", "DHL Express", 3),
    (r"^\d{11,12}$", "deutschepost", "Deutsche Post", 2),
    (r"^1Z[0-9A-Z]{16}$", "ups", "UPS", 4),
    (r"^\d{12}$|^\d{14}$", "fedex", "FedEx", 3),
    (r"^[0-9]{8,10}$", "tnt", "TNT", 1),
    (r"^[A-Z]{2}\d{9,11}[A-Z]{2}$", "cainiao", "Cainiao", 2),
];

static PATTERNS: LazyLock<Vec<CarrierPattern>> = LazyLock::new(|| {
    PATTERN_TABLE
        .iter()
        .filter_map(|&(pattern, code, name, confidence)| {
            Regex::new(pattern).ok().map(|pattern| CarrierPattern {
                pattern,
                code,
                name,
                confidence,
            })
        })
        .collect()
});

static UPU_SHAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}\d+[A-Z]{2}$").ok());

/// Match a number against the local pattern table.
pub fn detect_local(tracking_number: &str) -> Option<CarrierGuess> {
    PATTERNS
        .iter()
        .find(|p| p.pattern.is_match(tracking_number))
        .map(|p| CarrierGuess::new(p.code, p.name, p.confidence))
}

/// Length and format based guess used when nothing else answered.
pub fn detect_heuristic(tracking_number: &str) -> CarrierGuess {
    let all_digits =
        !tracking_number.is_empty() && tracking_number.chars().all(|c| c.is_ascii_digit());

    if all_digits {
        match tracking_number.len() {
            9 => return CarrierGuess::new("dhl", "DHL", 2),
            10 => return CarrierGuess::new("dhl", "DHL Express", 2),
            11 | 12 => return CarrierGuess::new("deutschepost", "Deutsche Post", 1),
            13 => return CarrierGuess::new("dhl", "DHL", 1),
            _ => {}
        }
    }

    let upu_shaped = UPU_SHAPE
        .as_ref()
        .is_some_and(|re| re.is_match(tracking_number));
    if upu_shaped {
        return CarrierGuess::new("chinapost", "China Post", 1);
    }

    CarrierGuess::new("dhl", "DHL (Auto-detected)", 1)
}

/// Carrier detector backed by the aggregator's auto-detection endpoint.
pub struct CarrierDetector<'a> {
    kuaidi100: Kuaidi100Client<'a>,
}

impl<'a> CarrierDetector<'a> {
    pub fn new(client: &'a Client, config: &'a Kuaidi100Config) -> Self {
        Self {
            kuaidi100: Kuaidi100Client::new(client, config),
        }
    }

    /// Detect the carrier for a tracking number.
    pub async fn detect(&self, tracking_number: &str) -> Result<CarrierGuess> {
        if let Some(guess) = detect_local(tracking_number) {
            log::debug!("Local pattern match: {} -> {}", tracking_number, guess.code);
            return Ok(guess);
        }

        log::debug!("No local pattern for {}, asking aggregator", tracking_number);
        match self.kuaidi100.auto_detect(tracking_number).await {
            Ok(AutoDetect::Found(guess)) => Ok(guess),
            Ok(AutoDetect::NoMatch) => Ok(detect_heuristic(tracking_number)),
            Err(e) => Err(AppError::Detection(format!(
                "Carrier-Erkennung fehlgeschlagen: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_for(number: &str) -> Option<String> {
        detect_local(number).map(|g| g.code)
    }

    #[test]
    fn test_pattern_table_compiles() {
        assert_eq!(PATTERNS.len(), PATTERN_TABLE.len());
    }

    #[test]
    fn test_detect_local_table() {
        assert_eq!(code_for("99.60.123456.12345678").as_deref(), Some("swisspost"));
        assert_eq!(code_for("RB123456789CN").as_deref(), Some("chinapost"));
        assert_eq!(code_for("00340434161234567890").as_deref(), Some("dhl"));
        assert_eq!(code_for("123456789").as_deref(), Some("dhl"));
        assert_eq!(code_for("1234567890").as_deref(), Some("dhl"));
        assert_eq!(code_for("12345678901").as_deref(), Some("deutschepost"));
        assert_eq!(code_for("1Z999AA10123456784").as_deref(), Some("ups"));
        assert_eq!(code_for("12345678901234").as_deref(), Some("fedex"));
        assert_eq!(code_for("12345678").as_deref(), Some("tnt"));
        assert_eq!(code_for("LP1234567890CN").as_deref(), Some("cainiao"));
    }

    #[test]
    fn test_first_match_wins() {
        // 12 digits also matches the FedEx pattern, which comes later
        let guess = detect_local("123456789012").unwrap();
        assert_eq!(guess, CarrierGuess::new("deutschepost", "Deutsche Post", 2));

        let guess = detect_local("0012345678901234567890");
        assert!(guess.is_none());
    }

    #[test]
    fn test_detect_local_is_case_sensitive() {
        assert!(detect_local("rb123456789cn").is_none());
    }

    #[test]
    fn test_heuristic_fallback() {
        assert_eq!(detect_heuristic("1234567890123").code, "dhl");
        assert_eq!(detect_heuristic("1234567890123").confidence, 1);
        assert_eq!(detect_heuristic("AB12CD").code, "chinapost");
        assert_eq!(detect_heuristic("XYZ-1").name, "DHL (Auto-detected)");
        assert_eq!(detect_heuristic("").name, "DHL (Auto-detected)");
    }

    #[tokio::test]
    async fn test_detect_prefers_local_table() {
        let client = Client::new();
        let config = Kuaidi100Config {
            auto_detect_url: "http://127.0.0.1:1/autonumber/auto".to_string(),
            ..Kuaidi100Config::default()
        };
        let detector = CarrierDetector::new(&client, &config);

        let guess = detector.detect("99.60.123456.12345678").await.unwrap();
        assert_eq!(guess.code, "swisspost");
        assert_eq!(guess.confidence, 4);
    }

    #[tokio::test]
    async fn test_detect_transport_failure_is_error() {
        let client = Client::new();
        let config = Kuaidi100Config {
            auto_detect_url: "http://127.0.0.1:1/autonumber/auto".to_string(),
            ..Kuaidi100Config::default()
        };
        let detector = CarrierDetector::new(&client, &config);

        let err = detector.detect("ABC-123").await.unwrap_err();
        assert!(matches!(err, AppError::Detection(_)));
        assert!(err.to_string().starts_with("Carrier-Erkennung fehlgeschlagen"));
    }

    #[cfg(feature = "server")]
    mod auto_detect {
        use super::*;
        use crate::server::fixture::FixtureServer;

        fn detector_config(server: &FixtureServer) -> Kuaidi100Config {
            Kuaidi100Config {
                auto_detect_url: server.url("/autonumber/auto"),
                ..Kuaidi100Config::default()
            }
        }

        #[tokio::test]
        async fn test_detect_uses_first_aggregator_candidate() {
            let server = FixtureServer::start(|_| {
                (
                    200,
                    r#"[{"comCode":"yunda","comName":"Yunda"},{"comCode":"ems","comName":"EMS"}]"#
                        .to_string(),
                )
            })
            .await;
            let client = Client::new();
            let config = detector_config(&server);

            let guess = CarrierDetector::new(&client, &config)
                .detect("ABC-123")
                .await
                .unwrap();

            assert_eq!(guess, CarrierGuess::new("yunda", "Yunda", 2));
            let requests = server.requests();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].path, "/autonumber/auto");
            assert_eq!(requests[0].query_param("num").as_deref(), Some("ABC-123"));
        }

        #[tokio::test]
        async fn test_detect_error_status_falls_back_to_heuristic() {
            let server = FixtureServer::start(|_| (404, String::new())).await;
            let client = Client::new();
            let config = detector_config(&server);

            let guess = CarrierDetector::new(&client, &config)
                .detect("ABC-123")
                .await
                .unwrap();

            assert_eq!(guess, detect_heuristic("ABC-123"));
            assert_eq!(guess.name, "DHL (Auto-detected)");
        }

        #[tokio::test]
        async fn test_detect_empty_candidate_list_falls_back_to_heuristic() {
            let server = FixtureServer::start(|_| (200, "[]".to_string())).await;
            let client = Client::new();
            let config = detector_config(&server);

            let guess = CarrierDetector::new(&client, &config)
                .detect("AB12345678XY")
                .await
                .unwrap();

            assert_eq!(guess.code, "chinapost");
            assert_eq!(server.requests().len(), 1);
        }
    }
}

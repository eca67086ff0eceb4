// src/services/kuaidi100.rs

//! Kuaidi100 tracking aggregator client.
//!
//! Queries are form-POSTed with a `customer`, a `sign` and a JSON `param`.
//! The sign is a 32-bit rolling string hash, not a cryptographic digest.

use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{CarrierGuess, DataSource, Kuaidi100Config, RawEvent, RawTrackingData};
use crate::utils::http::read_success_body;

const BACKEND: &str = "kuaidi100";

/// Sign a request: rolling hash of `param + key + customer`.
pub fn sign(param: &str, key: &str, customer: &str) -> String {
    weak_hash(&format!("{param}{key}{customer}"))
}

/// `h = h * 31 + unit` over UTF-16 code units with 32-bit wraparound,
/// rendered as lowercase hex of the absolute value, zero-padded to 32.
pub fn weak_hash(input: &str) -> String {
    if input.is_empty() {
        return "0".to_string();
    }
    let hash = input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32));
    format!("{:0>32}", format!("{:x}", (hash as i64).abs()))
}

/// Query parameter, serialized in this field order.
#[derive(Debug, Serialize)]
struct QueryParam<'a> {
    com: &'a str,
    num: &'a str,
    resultv2: &'a str,
}

/// Raw aggregator response.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Option<bool>,
    #[serde(default, rename = "returnCode", deserialize_with = "string_or_number")]
    return_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    state: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    ischeck: Option<String>,
    #[serde(default)]
    data: Option<Vec<RawEvent>>,
}

/// Codes arrive as `"3"` or `3` depending on the endpoint.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(if b { "1" } else { "0" }.to_string()),
        _ => None,
    })
}

/// Auto-detection candidate.
#[derive(Debug, Deserialize)]
struct AutoDetectCandidate {
    #[serde(rename = "comCode")]
    com_code: String,
    #[serde(rename = "comName", default)]
    com_name: String,
}

/// Outcome of an auto-detection request that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoDetect {
    /// First candidate; confidence is the number of candidates
    Found(CarrierGuess),
    /// Non-2xx, unparsable or empty answer
    NoMatch,
}

/// Client for the Kuaidi100 query and auto-detection endpoints.
pub struct Kuaidi100Client<'a> {
    client: &'a Client,
    config: &'a Kuaidi100Config,
}

impl<'a> Kuaidi100Client<'a> {
    pub fn new(client: &'a Client, config: &'a Kuaidi100Config) -> Self {
        Self { client, config }
    }

    /// Build the signed form body for a query.
    pub fn form_body(&self, carrier_code: &str, tracking_number: &str) -> Result<Vec<(String, String)>> {
        let param = serde_json::to_string(&QueryParam {
            com: carrier_code,
            num: tracking_number,
            resultv2: "1",
        })?;
        let sign = sign(&param, &self.config.key, &self.config.customer);
        log::debug!("kuaidi100 param={} sign={}", param, sign);

        Ok(vec![
            ("customer".to_string(), self.config.customer.clone()),
            ("sign".to_string(), sign),
            ("param".to_string(), param),
        ])
    }

    /// Query tracking data for one aggregator carrier code.
    pub async fn query(&self, carrier_code: &str, tracking_number: &str) -> Result<RawTrackingData> {
        let form = self.form_body(carrier_code, tracking_number)?;
        let response = self
            .client
            .post(&self.config.tracking_url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;
        log::debug!("kuaidi100 {} -> HTTP {}", carrier_code, response.status());

        let body = read_success_body(BACKEND, response).await?;
        parse_query_response(&body)
    }

    /// Ask the aggregator which carriers issue numbers like this one.
    ///
    /// Transport failures are returned as errors; anything the server
    /// answers that is not a usable candidate list is [`AutoDetect::NoMatch`].
    pub async fn auto_detect(&self, tracking_number: &str) -> Result<AutoDetect> {
        let response = self
            .client
            .get(&self.config.auto_detect_url)
            .query(&[("num", tracking_number)])
            .header(ACCEPT, "application/json")
            .header(reqwest::header::REFERER, "https://www.kuaidi100.com/")
            .send()
            .await?;
        log::debug!("kuaidi100 auto-detect -> HTTP {}", response.status());

        if !response.status().is_success() {
            return Ok(AutoDetect::NoMatch);
        }
        let body = response.text().await?;
        Ok(parse_auto_detect(&body))
    }
}

fn parse_query_response(body: &str) -> Result<RawTrackingData> {
    let parsed: QueryResponse = serde_json::from_str(body)
        .map_err(|_| AppError::api(BACKEND, format!("Ungültige API-Antwort: {body}")))?;

    let rejected = parsed.result == Some(false)
        || parsed.return_code.as_deref().is_some_and(|code| code != "200");
    if rejected {
        let message = parsed
            .message
            .or(parsed.return_code)
            .unwrap_or_else(|| "Unbekannter API-Fehler".to_string());
        return Err(AppError::api(BACKEND, format!("API Fehler: {message}")));
    }

    match (parsed.message.as_deref(), parsed.data) {
        (Some("ok"), Some(events)) => Ok(RawTrackingData::new(
            parsed.state.unwrap_or_default(),
            parsed.ischeck.as_deref() == Some("1"),
            events,
            DataSource::Aggregator,
        )),
        (message, _) => Err(AppError::api(
            BACKEND,
            message
                .filter(|m| !m.is_empty())
                .unwrap_or("Sendung nicht gefunden oder noch nicht im System"),
        )),
    }
}

fn parse_auto_detect(body: &str) -> AutoDetect {
    match serde_json::from_str::<Vec<AutoDetectCandidate>>(body) {
        Ok(candidates) => match candidates.first() {
            Some(first) => AutoDetect::Found(CarrierGuess::new(
                first.com_code.clone(),
                first.com_name.clone(),
                u8::try_from(candidates.len()).unwrap_or(u8::MAX),
            )),
            None => AutoDetect::NoMatch,
        },
        Err(e) => {
            log::warn!("Unparsable auto-detect response: {}", e);
            AutoDetect::NoMatch
        }
    }
}

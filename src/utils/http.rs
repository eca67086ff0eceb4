// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::Response;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Read a response body, turning non-2xx statuses into a backend error.
pub async fn read_success_body(backend: &str, response: Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::api(
            backend,
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            ),
        ));
    }
    Ok(response.text().await?)
}

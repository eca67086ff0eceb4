// src/error.rs

//! Unified error handling for the tracking application.

use std::fmt;

use thiserror::Error;

/// Result type alias for tracking operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Carrier detection failed
    #[error("{0}")]
    Detection(String),

    /// A tracking backend rejected or failed the request
    #[error("{backend}: {message}")]
    Api { backend: String, message: String },

    /// Page scraping failed
    #[error("Scrape error: {0}")]
    Scrape(String),

    /// Location could not be resolved to coordinates
    #[error("Geocoding error: {0}")]
    Geocoding(String),

    /// Delivery estimate could not be produced
    #[error("{0}")]
    Estimate(String),

    /// The package has no known current location
    #[error("Paket-Standort ist nicht verfügbar")]
    MissingLocation,
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a backend error with context.
    pub fn api(backend: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Api {
            backend: backend.into(),
            message: message.to_string(),
        }
    }

    /// Create a scrape error.
    pub fn scrape(message: impl Into<String>) -> Self {
        Self::Scrape(message.into())
    }
}

//! Application configuration structures.

use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Coordinates, ScrapeSelectors};
use crate::utils::encode_path_segment;

/// Environment variable overriding `kuaidi100.customer`.
pub const ENV_KUAIDI100_CUSTOMER: &str = "TRACKIT_KUAIDI100_CUSTOMER";
/// Environment variable overriding `kuaidi100.key`.
pub const ENV_KUAIDI100_KEY: &str = "TRACKIT_KUAIDI100_KEY";
/// Environment variable overriding `geocoding.opencage_key`.
pub const ENV_OPENCAGE_KEY: &str = "TRACKIT_OPENCAGE_KEY";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings shared by all backends
    #[serde(default)]
    pub http: HttpConfig,

    /// Tracking aggregator (Kuaidi100) settings
    #[serde(default)]
    pub kuaidi100: Kuaidi100Config,

    /// Swiss Post backends
    #[serde(default)]
    pub swisspost: SwissPostConfig,

    /// Page scraper used by the scraping service
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Geocoding backend
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Delivery estimate defaults
    #[serde(default)]
    pub estimate: EstimateConfig,

    /// Scraping service listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Aggregation behavior
    #[serde(default)]
    pub tracking: TrackingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Apply secrets from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply secrets from an arbitrary lookup (environment, test tables).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(customer) = non_empty(ENV_KUAIDI100_CUSTOMER) {
            self.kuaidi100.customer = customer;
        }
        if let Some(key) = non_empty(ENV_KUAIDI100_KEY) {
            self.kuaidi100.key = key;
        }
        if let Some(key) = non_empty(ENV_OPENCAGE_KEY) {
            self.geocoding.opencage_key = key;
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.server.port == 0 {
            return Err(AppError::validation("server.port must be > 0"));
        }
        if !self.scraper.page_url.contains("{tracking}") {
            return Err(AppError::validation(
                "scraper.page_url must contain a {tracking} placeholder",
            ));
        }
        if self.scraper.wait_timeout_secs == 0 {
            return Err(AppError::validation(
                "scraper.wait_timeout_secs must be > 0",
            ));
        }
        if self.kuaidi100.dhl_codes.is_empty() {
            return Err(AppError::validation("kuaidi100.dhl_codes is empty"));
        }
        if self.kuaidi100.china_post_codes.is_empty() {
            return Err(AppError::validation("kuaidi100.china_post_codes is empty"));
        }
        for selector in self.scraper.selectors.all() {
            Selector::parse(selector).map_err(|e| AppError::selector(selector, format!("{e:?}")))?;
        }
        Ok(())
    }

    /// Non-fatal configuration gaps worth reporting.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.kuaidi100.customer.is_empty() || self.kuaidi100.key.is_empty() {
            warnings.push(format!(
                "kuaidi100 credentials missing (set {ENV_KUAIDI100_CUSTOMER} / {ENV_KUAIDI100_KEY})"
            ));
        }
        if self.geocoding.opencage_key.is_empty() {
            warnings.push(format!(
                "OpenCage key missing (set {ENV_OPENCAGE_KEY}); only the offline table is used"
            ));
        }
        warnings
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Kuaidi100 aggregator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kuaidi100Config {
    /// Customer ID sent with every query
    #[serde(default)]
    pub customer: String,

    /// Static signing key
    #[serde(default)]
    pub key: String,

    /// Carrier auto-detection endpoint
    #[serde(default = "defaults::auto_detect_url")]
    pub auto_detect_url: String,

    /// Tracking query endpoint
    #[serde(default = "defaults::tracking_url")]
    pub tracking_url: String,

    /// Aggregator codes tried in order for DHL shipments
    #[serde(default = "defaults::dhl_codes")]
    pub dhl_codes: Vec<String>,

    /// Aggregator codes tried in order for China Post / Cainiao shipments
    #[serde(default = "defaults::china_post_codes")]
    pub china_post_codes: Vec<String>,
}

impl Default for Kuaidi100Config {
    fn default() -> Self {
        Self {
            customer: String::new(),
            key: String::new(),
            auto_detect_url: defaults::auto_detect_url(),
            tracking_url: defaults::tracking_url(),
            dhl_codes: defaults::dhl_codes(),
            china_post_codes: defaults::china_post_codes(),
        }
    }
}

/// Swiss Post backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwissPostConfig {
    /// Base URL of the public events API
    #[serde(default = "defaults::swisspost_api")]
    pub api_base_url: String,

    /// Base URL of the local scraping service; an empty string disables it
    #[serde(default = "defaults::scraper_service_url")]
    pub scraper_service_url: Option<String>,
}

impl SwissPostConfig {
    /// Scraping service base URL, if one is configured.
    pub fn scraper_service(&self) -> Option<&str> {
        self.scraper_service_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

impl Default for SwissPostConfig {
    fn default() -> Self {
        Self {
            api_base_url: defaults::swisspost_api(),
            scraper_service_url: defaults::scraper_service_url(),
        }
    }
}

/// Page scraper settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Portal URL with a `{tracking}` placeholder
    #[serde(default = "defaults::page_url")]
    pub page_url: String,

    /// CSS selectors for the portal markup
    #[serde(default)]
    pub selectors: ScrapeSelectors,

    /// Link text of the "show earlier events" control
    #[serde(default = "defaults::load_more_text")]
    pub load_more_text: String,

    /// Pause between follow-up page loads
    #[serde(default = "defaults::load_more_delay")]
    pub load_more_delay_ms: u64,

    /// Upper bound on follow-up page loads
    #[serde(default = "defaults::max_load_more")]
    pub max_load_more: usize,

    /// Timeout for the initial page load in seconds
    #[serde(default = "defaults::wait_timeout")]
    pub wait_timeout_secs: u64,
}

impl ScraperConfig {
    /// Portal URL for a tracking number, encoded as one path segment.
    pub fn page_url_for(&self, tracking: &str) -> String {
        self.page_url.replace("{tracking}", &encode_path_segment(tracking))
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            page_url: defaults::page_url(),
            selectors: ScrapeSelectors::default(),
            load_more_text: defaults::load_more_text(),
            load_more_delay_ms: defaults::load_more_delay(),
            max_load_more: defaults::max_load_more(),
            wait_timeout_secs: defaults::wait_timeout(),
        }
    }
}

/// Geocoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// OpenCage forward geocoding endpoint
    #[serde(default = "defaults::opencage_url")]
    pub opencage_url: String,

    /// OpenCage API key; empty disables the online lookup
    #[serde(default)]
    pub opencage_key: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            opencage_url: defaults::opencage_url(),
            opencage_key: String::new(),
        }
    }
}

/// Delivery estimate defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateConfig {
    /// Origin used when the caller supplies no position (Zürich HB)
    #[serde(default = "defaults::fallback_latitude")]
    pub fallback_latitude: f64,

    #[serde(default = "defaults::fallback_longitude")]
    pub fallback_longitude: f64,

    /// Package position assumed by the demo estimate (Basel)
    #[serde(default = "defaults::demo_latitude")]
    pub demo_fallback_latitude: f64,

    #[serde(default = "defaults::demo_longitude")]
    pub demo_fallback_longitude: f64,
}

impl EstimateConfig {
    pub fn user_fallback(&self) -> Coordinates {
        Coordinates::new(self.fallback_latitude, self.fallback_longitude)
    }

    pub fn demo_origin(&self) -> Coordinates {
        Coordinates::new(self.demo_fallback_latitude, self.demo_fallback_longitude)
    }
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            fallback_latitude: defaults::fallback_latitude(),
            fallback_longitude: defaults::fallback_longitude(),
            demo_fallback_latitude: defaults::demo_latitude(),
            demo_fallback_longitude: defaults::demo_longitude(),
        }
    }
}

/// Scraping service listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,

    #[serde(default = "defaults::port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
        }
    }
}

/// Aggregation behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Substitute placeholder data when every backend fails
    #[serde(default = "defaults::allow_demo_fallback")]
    pub allow_demo_fallback: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            allow_demo_fallback: defaults::allow_demo_fallback(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; TrackIt/1.0)".into()
    }
    pub fn timeout() -> u64 {
        15
    }

    // Aggregator defaults
    pub fn auto_detect_url() -> String {
        "https://www.kuaidi100.com/autonumber/auto".into()
    }
    pub fn tracking_url() -> String {
        "https://poll.kuaidi100.com/poll/query.do".into()
    }
    pub fn dhl_codes() -> Vec<String> {
        vec![
            "dhl".into(),
            "dhlde".into(),
            "dhlglobal".into(),
            "dhl_de".into(),
            "deutschepost".into(),
        ]
    }
    pub fn china_post_codes() -> Vec<String> {
        vec!["chinapost".into(), "ems".into(), "cainiao".into()]
    }

    // Swiss Post defaults
    pub fn swisspost_api() -> String {
        "https://api.swisspost.ch/v1".into()
    }
    pub fn scraper_service_url() -> Option<String> {
        Some("http://localhost:3001".into())
    }

    // Scraper defaults
    pub fn page_url() -> String {
        "https://service.post.ch/ekp-web/ui/entry/search/{tracking}?lang=de".into()
    }
    pub fn load_more_text() -> String {
        "Frühere anzeigen".into()
    }
    pub fn load_more_delay() -> u64 {
        700
    }
    pub fn max_load_more() -> usize {
        10
    }
    pub fn wait_timeout() -> u64 {
        15
    }

    // Geocoding defaults
    pub fn opencage_url() -> String {
        "https://api.opencagedata.com/geocode/v1/json".into()
    }

    // Estimate defaults
    pub fn fallback_latitude() -> f64 {
        47.3769
    }
    pub fn fallback_longitude() -> f64 {
        8.5417
    }
    pub fn demo_latitude() -> f64 {
        47.5596
    }
    pub fn demo_longitude() -> f64 {
        7.5886
    }

    // Server defaults
    pub fn host() -> String {
        "127.0.0.1".into()
    }
    pub fn port() -> u16 {
        3001
    }

    pub fn allow_demo_fallback() -> bool {
        true
    }
}

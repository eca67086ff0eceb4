// src/pipeline/scrape.rs

//! Run the portal scraper in-process.

use crate::error::Result;
use crate::models::{Config, ScrapeResponse};
use crate::services::{HttpPageSource, PostScraper};

/// Scrape one tracking number and print the service payload as JSON.
pub async fn run_scrape(config: &Config, tracking_number: &str) -> Result<ScrapeResponse> {
    let source = HttpPageSource::new(&config.http, &config.scraper)?;
    let scraper = PostScraper::new(source, &config.scraper)?;

    let response = scraper.scrape(tracking_number.trim()).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response)
}

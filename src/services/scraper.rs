// src/services/scraper.rs

//! Postal portal scraper.
//!
//! Reads the shipment timeline and calculated delivery date from the
//! carrier's tracking page. Older events hide behind a "show earlier" link,
//! which is followed until it disappears or the load limit is reached.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{HttpConfig, ScrapeResponse, ScrapedEvent, ScraperConfig};
use crate::utils::http::{create_async_client, read_success_body};
use crate::utils::resolve_url;

/// Source of rendered page markup.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Fetches pages over plain HTTP.
pub struct HttpPageSource {
    client: Client,
    wait_timeout: Duration,
}

impl HttpPageSource {
    pub fn new(http: &HttpConfig, scraper: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(http)?,
            wait_timeout: Duration::from_secs(scraper.wait_timeout_secs),
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(self.wait_timeout)
            .send()
            .await?;
        read_success_body("portal", response).await
    }
}

/// Selectors compiled once per scraper.
struct CompiledSelectors {
    ready: Selector,
    day: Selector,
    date: Selector,
    row: Selector,
    time: Selector,
    detail: Selector,
    estimate: Selector,
    load_more: Selector,
}

impl CompiledSelectors {
    fn compile(config: &ScraperConfig) -> Result<Self> {
        let s = &config.selectors;
        Ok(Self {
            ready: parse_selector(&s.ready_selector)?,
            day: parse_selector(&s.day_selector)?,
            date: parse_selector(&s.date_selector)?,
            row: parse_selector(&s.row_selector)?,
            time: parse_selector(&s.time_selector)?,
            detail: parse_selector(&s.detail_selector)?,
            estimate: parse_selector(&s.estimate_selector)?,
            load_more: parse_selector(&s.load_more_selector)?,
        })
    }
}

/// Everything read from one page load.
#[derive(Debug, Default)]
struct ParsedPage {
    ready: bool,
    delivery_estimate: Option<String>,
    events: Vec<ScrapedEvent>,
    load_more_href: Option<String>,
}

/// Scraper for the postal tracking portal.
pub struct PostScraper<S> {
    source: S,
    config: ScraperConfig,
    selectors: CompiledSelectors,
}

impl<S: PageSource> PostScraper<S> {
    pub fn new(source: S, config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            source,
            selectors: CompiledSelectors::compile(config)?,
            config: config.clone(),
        })
    }

    /// Scrape the timeline for one tracking number, newest event first.
    pub async fn scrape(&self, tracking: &str) -> Result<ScrapeResponse> {
        let mut url = self.config.page_url_for(tracking);
        log::info!("Scraping {}", url);

        let html = self.source.fetch_page(&url).await?;
        let first = self.parse_page(&html);
        if !first.ready {
            return Err(AppError::scrape("Seite nicht bereit"));
        }

        let delivery_estimate = first.delivery_estimate;
        let mut timeline = first.events;
        let mut next = first.load_more_href;
        let delay = Duration::from_millis(self.config.load_more_delay_ms);
        let mut loads = 0;

        while let Some(href) = next.take() {
            if loads >= self.config.max_load_more {
                log::warn!("Stopped after {} follow-up loads for {}", loads, tracking);
                break;
            }
            let next_url = Url::parse(&url)
                .map(|base| resolve_url(&base, &href))
                .unwrap_or(href);
            if next_url == url {
                break;
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            log::debug!("Loading earlier events: {}", next_url);
            let html = self.source.fetch_page(&next_url).await?;
            let page = self.parse_page(&html);
            merge_events(&mut timeline, page.events);

            url = next_url;
            next = page.load_more_href;
            loads += 1;
        }

        log::info!("Scraped {} events for {}", timeline.len(), tracking);
        Ok(ScrapeResponse {
            delivery_estimate,
            timeline,
        })
    }

    fn parse_page(&self, html: &str) -> ParsedPage {
        let document = Html::parse_document(html);
        let sel = &self.selectors;

        let ready = document.select(&sel.ready).next().is_some();
        let delivery_estimate = document
            .select(&sel.estimate)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty());

        let events = document
            .select(&sel.day)
            .flat_map(|day| {
                let date = day.select(&sel.date).next().map(element_text).unwrap_or_default();
                day.select(&sel.row)
                    .map(|row| self.parse_row(&row, &date))
                    .collect::<Vec<_>>()
            })
            .collect();

        let load_more_href = document
            .select(&sel.load_more)
            .find(|a| element_text(*a).contains(&self.config.load_more_text))
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);

        ParsedPage {
            ready,
            delivery_estimate,
            events,
            load_more_href,
        }
    }

    fn parse_row(&self, row: &ElementRef, date: &str) -> ScrapedEvent {
        let time = row
            .select(&self.selectors.time)
            .next()
            .map(element_text)
            .unwrap_or_default();
        let mut details = row.select(&self.selectors.detail).map(element_text);

        ScrapedEvent {
            date: date.to_string(),
            time,
            desc: details.next().unwrap_or_default(),
            location: details.next().unwrap_or_default(),
        }
    }
}

/// Append events not already present, keeping order.
fn merge_events(timeline: &mut Vec<ScrapedEvent>, events: Vec<ScrapedEvent>) {
    for event in events {
        if !timeline.contains(&event) {
            timeline.push(event);
        }
    }
}

/// Rendered text of an element with whitespace collapsed.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

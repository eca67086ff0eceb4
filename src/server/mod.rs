//! HTTP scraping service.
//!
//! Exposes the portal scraper at `GET /track?tracking=<id>` and a
//! `GET /health` check. Each request scrapes independently.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::models::Config;
use crate::services::{HttpPageSource, PageSource, PostScraper};

#[cfg(test)]
pub(crate) mod fixture;

/// A routed response before it is turned into a hyper response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = self.status;
        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        response
    }
}

/// Value of the `tracking` query parameter, if present and non-blank.
fn tracking_param(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query.unwrap_or("").as_bytes())
        .find(|(key, _)| key == "tracking")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Route one request.
pub async fn route<S: PageSource>(
    method: &Method,
    path: &str,
    query: Option<&str>,
    scraper: &PostScraper<S>,
) -> ApiResponse {
    match (method, path) {
        (&Method::GET, "/track") => {
            let Some(tracking) = tracking_param(query) else {
                return ApiResponse::json(
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "Trackingnummer fehlt" }),
                );
            };

            match scraper.scrape(&tracking).await {
                Ok(result) => match serde_json::to_value(&result) {
                    Ok(body) => {
                        info!(tracking = %tracking, events = result.timeline.len(), "scrape_ok");
                        ApiResponse::json(StatusCode::OK, body)
                    }
                    Err(e) => scrape_failed(&tracking, &e.to_string()),
                },
                Err(e) => scrape_failed(&tracking, &e.to_string()),
            }
        }
        (&Method::GET, "/health") => ApiResponse::text(StatusCode::OK, "ok"),
        _ => ApiResponse::text(StatusCode::NOT_FOUND, "Not Found"),
    }
}

fn scrape_failed(tracking: &str, details: &str) -> ApiResponse {
    error!(tracking = %tracking, error = %details, "scrape_failed");
    ApiResponse::json(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Scraper-Fehler", "details": details }),
    )
}

async fn handle_request<S: PageSource>(
    req: Request<hyper::body::Incoming>,
    scraper: Arc<PostScraper<S>>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let response = route(req.method(), req.uri().path(), req.uri().query(), &scraper).await;
    Ok(response.into_response())
}

/// Accept connections until `shutdown` resolves.
pub async fn serve<S, F>(listener: TcpListener, scraper: Arc<PostScraper<S>>, shutdown: F) -> Result<()>
where
    S: PageSource + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        let io = TokioIo::new(stream);
                        let scraper = Arc::clone(&scraper);

                        tokio::spawn(async move {
                            let service = service_fn(move |req| {
                                let scraper = Arc::clone(&scraper);
                                async move { handle_request(req, scraper).await }
                            });

                            if let Err(e) = http1::Builder::new()
                                .serve_connection(io, service)
                                .await
                            {
                                warn!(peer = %addr, error = %e, "http_connection_error");
                            }
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "accept_error");
                    }
                }
            }
            _ = &mut shutdown => {
                info!("scraper_service_shutdown");
                return Ok(());
            }
        }
    }
}

/// Run the scraping service with the configured page source until Ctrl-C.
pub async fn run(config: &Config) -> Result<()> {
    let source = HttpPageSource::new(&config.http, &config.scraper)?;
    let scraper = Arc::new(PostScraper::new(source, &config.scraper)?);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!(
        addr = %listener.local_addr()?,
        "Server läuft auf http://{}:{}",
        config.server.host,
        config.server.port
    );

    serve(listener, scraper, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "ctrl_c_listener_failed");
        }
    })
    .await
}

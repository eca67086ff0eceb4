//! In-process HTTP backend for client tests.
//!
//! Binds an ephemeral port, answers every request through a handler
//! closure and records what was asked.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use url::form_urlencoded;

/// A request as seen by the fixture backend.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

impl Recorded {
    /// Value of a query-string parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        lookup(&self.query, name)
    }

    /// Value of a urlencoded form field.
    pub fn form_field(&self, name: &str) -> Option<String> {
        lookup(&self.body, name)
    }

    /// Aggregator carrier code from the JSON `param` form field.
    pub fn carrier_code(&self) -> Option<String> {
        let param: serde_json::Value = serde_json::from_str(&self.form_field("param")?).ok()?;
        param["com"].as_str().map(str::to_string)
    }
}

fn lookup(encoded: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(encoded.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

type Handler = dyn Fn(&Recorded) -> (u16, String) + Send + Sync;

pub(crate) struct FixtureServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FixtureServer {
    /// Start serving; the handler returns a status code and a body.
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);

                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let handler = Arc::clone(&handler);
                        let log = Arc::clone(&log);
                        async move {
                            let method = req.method().to_string();
                            let path = req.uri().path().to_string();
                            let query = req.uri().query().unwrap_or("").to_string();
                            let body = req
                                .into_body()
                                .collect()
                                .await
                                .map(|collected| collected.to_bytes())
                                .unwrap_or_default();

                            let recorded = Recorded {
                                method,
                                path,
                                query,
                                body: String::from_utf8_lossy(&body).into_owned(),
                            };
                            let (status, body) = handler(&recorded);
                            log.lock().unwrap().push(recorded);

                            let response = Response::builder()
                                .status(StatusCode::from_u16(status).unwrap())
                                .header(CONTENT_TYPE, "application/json")
                                .body(Full::new(Bytes::from(body)))
                                .unwrap();
                            Ok::<_, Infallible>(response)
                        }
                    });

                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, requests }
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

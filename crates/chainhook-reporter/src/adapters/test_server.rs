//! Local HTTP server standing in for the Stacks node and Google APIs.

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use parking_lot::Mutex;
use reqwest::Client;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral loopback port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Client that ignores proxy settings from the environment.
pub fn client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    /// Path and query as received.
    pub uri: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// Upstream answering every request with one canned JSON response.
#[derive(Clone)]
pub struct CannedUpstream {
    status: StatusCode,
    response: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl CannedUpstream {
    pub fn new(status: StatusCode, response: impl Into<String>) -> Self {
        Self {
            status,
            response: response.into(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start serving; returns the base URL.
    pub async fn start(&self) -> String {
        let router = Router::new().fallback(answer).with_state(self.clone());
        spawn(router).await
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().clone()
    }
}

async fn answer(
    State(upstream): State<CannedUpstream>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    upstream.seen.lock().push(SeenRequest {
        method,
        uri: uri.to_string(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body,
    });
    (
        upstream.status,
        [(header::CONTENT_TYPE, "application/json")],
        upstream.response.clone(),
    )
}

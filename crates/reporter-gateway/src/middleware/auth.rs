//! Webhook secret middleware.
//!
//! When a secret is configured, requests must carry it in `x-chainhook-secret`
//! or as an `Authorization: Bearer` token. Without a secret every request
//! passes.

use crate::error::ApiError;
use crate::metrics::ReporterMetrics;
use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

/// Header carrying the shared secret.
pub const SECRET_HEADER: &str = "x-chainhook-secret";

/// Webhook secret layer
#[derive(Clone)]
pub struct WebhookSecretLayer {
    secret: Option<Arc<str>>,
    metrics: Option<Arc<ReporterMetrics>>,
}

impl WebhookSecretLayer {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.map(Arc::from),
            metrics: None,
        }
    }

    /// Count rejected requests.
    pub fn with_metrics(mut self, metrics: Arc<ReporterMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl<S> Layer<S> for WebhookSecretLayer {
    type Service = WebhookSecretService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        WebhookSecretService {
            inner,
            secret: self.secret.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

/// Webhook secret service
#[derive(Clone)]
pub struct WebhookSecretService<S> {
    inner: S,
    secret: Option<Arc<str>>,
    metrics: Option<Arc<ReporterMetrics>>,
}

impl<S> Service<Request<Body>> for WebhookSecretService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if let Some(expected) = &self.secret {
            if !has_valid_secret(&req, expected) {
                warn!(uri = %req.uri(), "Webhook rejected - missing or invalid secret");
                if let Some(metrics) = &self.metrics {
                    metrics.record_rejected_delivery();
                }
                let response = ApiError::Unauthorized.into_response();
                return Box::pin(async move { Ok::<_, S::Error>(response) });
            }
        }

        // Take the service that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        Box::pin(async move { inner.call(req).await })
    }
}

/// Check the shared secret from request headers
fn has_valid_secret<B>(req: &Request<B>, expected: &str) -> bool {
    if let Some(value) = req.headers().get(SECRET_HEADER) {
        if let Ok(secret) = value.to_str() {
            return constant_time_compare(secret, expected);
        }
    }

    if let Some(auth) = req.headers().get("authorization") {
        if let Ok(auth_str) = auth.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return constant_time_compare(token, expected);
            }
        }
    }

    false
}

/// Constant-time string comparison.
///
/// Inputs of different lengths are padded with different bytes so the
/// comparison runs over the longer length and still fails.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;

    let max_len = std::cmp::max(a.len(), b.len());

    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];

    a_padded[..a.len()].copy_from_slice(a.as_bytes());
    b_padded[..b.len()].copy_from_slice(b.as_bytes());

    let lengths_equal = a.len().ct_eq(&b.len());
    let contents_equal = a_padded.ct_eq(&b_padded);

    (lengths_equal & contents_equal).into()
}

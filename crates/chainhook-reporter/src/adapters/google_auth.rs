//! Google OAuth access tokens.
//!
//! [`ServiceAccountTokenProvider`] signs an RS256 assertion with the service
//! account key, exchanges it at the token endpoint and caches the result
//! until shortly before it expires.

use super::truncate_body;
use crate::domain::{AuthError, GoogleCredentials};
use crate::ports::outbound::AccessTokenProvider;
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the cached token expires.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Fixed bearer token, e.g. from `GOOGLE_ACCESS_TOKEN`.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS as u64
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_MARGIN < self.expires_at
    }
}

/// Expiry of a token issued at `now`, capped at the assertion lifetime.
fn token_expiry(now: Instant, expires_in: u64) -> Instant {
    now + Duration::from_secs(expires_in.min(ASSERTION_LIFETIME_SECS as u64))
}

/// Service account flow (RFC 7523 JWT bearer grant).
pub struct ServiceAccountTokenProvider {
    client: Client,
    client_email: String,
    key: EncodingKey,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenProvider {
    pub fn new(
        client: Client,
        client_email: impl Into<String>,
        private_key_pem: &str,
    ) -> Result<Self, AuthError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| AuthError::InvalidCredentials(format!("private key: {e}")))?;
        Ok(Self {
            client,
            client_email: client_email.into(),
            key,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            cached: Mutex::new(None),
        })
    }

    /// Override the token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    fn signed_assertion(&self) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_url,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| AuthError::InvalidCredentials(format!("signing assertion: {e}")))
    }

    async fn exchange(&self) -> Result<CachedToken, AuthError> {
        let assertion = self.signed_assertion()?;
        let response = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = format!("HTTP {status}: {}", truncate_body(&body));
            return Err(
                if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    AuthError::Unavailable(message)
                } else {
                    AuthError::TokenExchange(message)
                },
            );
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        debug!(expires_in = token.expires_in, "obtained Google access token");
        Ok(CachedToken {
            token: token.access_token,
            expires_at: token_expiry(Instant::now(), token.expires_in),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self) -> Result<String, AuthError> {
        let cached = self.cached.lock().clone();
        if let Some(cached) = cached.filter(|c| c.is_fresh(Instant::now())) {
            return Ok(cached.token);
        }

        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *self.cached.lock() = Some(fresh);
        Ok(token)
    }
}

/// Build the token provider for configured credentials.
pub fn token_provider(
    client: Client,
    credentials: &GoogleCredentials,
) -> Result<Arc<dyn AccessTokenProvider>, AuthError> {
    Ok(match credentials {
        GoogleCredentials::AccessToken(token) => Arc::new(StaticTokenProvider::new(token.clone())),
        GoogleCredentials::ServiceAccount {
            client_email,
            private_key_pem,
        } => Arc::new(ServiceAccountTokenProvider::new(
            client,
            client_email.clone(),
            private_key_pem,
        )?),
    })
}

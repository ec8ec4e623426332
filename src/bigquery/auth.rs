//! OAuth2 Token Exchange
//!
//! Turns the service account key into short-lived bearer tokens via the
//! JWT-bearer grant: sign an RS256 assertion with the key, exchange it at
//! the key's token endpoint, cache the access token until shortly before
//! it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

use super::credentials::ServiceAccountKey;

/// OAuth2 scope for BigQuery access (queries and ML.PREDICT)
const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

/// JWT-bearer grant type
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime in seconds (Google caps this at one hour)
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh the cached token this long before it actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Provides cached bearer tokens for the bound service account.
pub struct TokenProvider {
    http: reqwest::Client,
    key: ServiceAccountKey,
    cached: RwLock<Option<CachedToken>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Claims for the signed assertion
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
    expires_in: i64,
}

impl TokenProvider {
    /// Create a provider bound to the given service account key.
    /// No network call happens until a token is first requested.
    pub fn new(http: reqwest::Client, key: ServiceAccountKey) -> Self {
        Self {
            http,
            key,
            cached: RwLock::new(None),
        }
    }

    /// Get a bearer token, reusing the cached one while it is still fresh.
    pub async fn bearer_token(&self) -> Result<String, AuthError> {
        {
            let cached = self.cached.read().unwrap();
            if let Some(token) = cached.as_ref() {
                if token.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > Utc::now() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let token = self.exchange().await?;
        let access_token = token.access_token.clone();
        *self.cached.write().unwrap() = Some(token);
        Ok(access_token)
    }

    /// Sign an assertion and exchange it for an access token.
    async fn exchange(&self) -> Result<CachedToken, AuthError> {
        let assertion = self.sign_assertion()?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(AuthError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                message: text,
            });
        }

        let token: TokenResponse = response.json().await.map_err(AuthError::Request)?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }

    fn sign_assertion(&self) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: BIGQUERY_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(AuthError::Key)?;

        encode(&Header::new(Algorithm::RS256), &claims, &encoding_key).map_err(AuthError::Sign)
    }
}

/// Errors obtaining a bearer token
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid service account private key: {0}")]
    Key(#[source] jsonwebtoken::errors::Error),

    #[error("Failed to sign token assertion: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("Token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Token exchange rejected ({status}): {message}")]
    Exchange { status: u16, message: String },
}

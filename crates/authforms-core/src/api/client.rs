//! API client for the EyePredict authentication router.
//!
//! Each call issues exactly one request: no retries, no backoff, and no
//! timeout unless the config sets one. The response body is parsed as JSON
//! whatever the status; success is decided by the status class alone.

use std::time::Duration;

use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, info};

use crate::forms::Encoding;
use crate::models::{AuthResponse, Credentials};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const REGISTER_PATH: &str = "/register";
const TOKEN_PATH: &str = "/token";

/// API client for the authentication endpoints.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct AuthClient {
    client: Client,
    base: String,
}

impl AuthClient {
    /// Create a client for the given base, e.g. `http://127.0.0.1:8000/auth`
    pub fn new(base: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base = Self::normalize_base(base)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base })
    }

    /// Trim whitespace and trailing slashes; only absolute http(s) bases are usable
    fn normalize_base(base: &str) -> Result<String, ApiError> {
        let trimmed = base.trim().trim_end_matches('/');
        let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
        let has_host = trimmed.split("://").nth(1).is_some_and(|rest| !rest.is_empty());
        if has_scheme && has_host {
            Ok(trimmed.to_string())
        } else {
            Err(ApiError::InvalidBaseUrl(base.to_string()))
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// Create an account. Body is JSON `{email, password}`.
    pub async fn register(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.send(Encoding::Json, REGISTER_PATH, credentials).await
    }

    /// Request an access token. Body is the OAuth2 password form, with the
    /// email sent as `username`.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.send(Encoding::Form, TOKEN_PATH, credentials).await
    }

    /// POST the credentials to `path` under the base using `encoding`.
    ///
    /// A non-2xx status is not an error here: it comes back as an
    /// `AuthResponse` with `ok == false`. Errors are transport failures and
    /// bodies that are not JSON.
    pub async fn send(
        &self,
        encoding: Encoding,
        path: &str,
        credentials: &Credentials,
    ) -> Result<AuthResponse, ApiError> {
        let url = self.endpoint(path);
        debug!(url = %url, ?encoding, email = %credentials.email, "Sending auth request");

        let request = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            // Set first; .json() and .form() leave an existing Content-Type alone
            .header(header::CONTENT_TYPE, encoding.content_type());
        let request = match encoding {
            Encoding::Json => request.json(credentials),
            Encoding::Form => request.form(&credentials.as_password_form()),
        };

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|_| ApiError::unparseable_body(status, &bytes))?;

        let auth = AuthResponse::new(status.as_u16(), body);
        info!(url = %url, status = auth.status, ok = auth.ok, "Auth request completed");
        Ok(auth)
    }
}

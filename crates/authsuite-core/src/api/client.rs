//! API client for communicating with the AuthSuite REST API.
//!
//! This module provides the `ApiClient` struct for the session endpoints
//! (login, refresh, logout) and the theme endpoints.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{ThemeSettings, UserProfile};
use crate::theme::ThemeForm;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Body of a successful `/login` or `/refresh` call.
///
/// `/refresh` may answer with the token alone, so both fields are optional
/// and the caller decides what a missing token means.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// API client for the AuthSuite service.
/// Clone is cheap - reqwest::Client uses Arc internally, and clones share
/// both the connection pool and the cookie store holding the refresh cookie.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Self::parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Endpoint paths are appended to the base URL, so it must end in `/`
    /// for `Url::join` to keep any path prefix (`https://host/api`).
    fn parse_base_url(base_url: &str) -> Result<Url> {
        let trimmed = base_url.trim();
        let normalized = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        };
        Url::parse(&normalized).with_context(|| format!("Invalid API base URL: {}", base_url))
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Create a new ApiClient with the given token, sharing the connection pool
    /// and cookie store.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid endpoint path: {}", path))
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} response body", what))?;
        serde_json::from_str(&text).map_err(|e| {
            anyhow::Error::from(ApiError::InvalidResponse(format!(
                "Failed to parse {} response: {}",
                what, e
            )))
        })
    }

    // ===== Session =====

    /// Authenticate with username and password. On success the server also
    /// sets the refresh cookie, which the cookie store keeps.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let url = self.endpoint("login")?;
        debug!(%url, "Sending login request");

        let response = self
            .client
            .post(url)
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response, "login").await
    }

    /// Exchange the refresh cookie for a new access token.
    pub async fn refresh(&self) -> Result<AuthResponse> {
        let url = self.endpoint("refresh")?;
        debug!(%url, "Sending refresh request");

        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send refresh request")?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response, "refresh").await
    }

    /// Ask the server to invalidate its side of the session. Any response
    /// body is ignored.
    pub async fn logout(&self) -> Result<()> {
        let url = self.endpoint("logout")?;
        debug!(%url, "Sending logout request");

        let response = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send logout request")?;

        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Theme =====

    /// Fetch the current theme settings
    pub async fn fetch_theme(&self) -> Result<ThemeSettings> {
        let url = self.endpoint("theme")?;

        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to fetch theme")?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response, "theme").await
    }

    /// Send a theme save or reset and return the server's stored settings
    pub async fn update_theme(&self, form: ThemeForm) -> Result<ThemeSettings> {
        let url = self.endpoint("theme")?;
        debug!(reset = form.is_reset(), fields = form.fields.len(), "Sending theme update");

        let response = self
            .client
            .patch(url)
            .headers(self.auth_headers()?)
            .multipart(form.into_multipart()?)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send theme update")?;

        let response = Self::check_response(response).await?;
        Self::parse_json(response, "theme update").await
    }
}

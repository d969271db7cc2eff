//! # HTTP Client Utilities
//!
//! Shared HTTP client used by the provider adapters.
//!
//! This module provides a reusable HTTP client wrapper with:
//! - A per-client request timeout
//! - JSON request and response bodies
//! - Optional bearer authentication
//! - Status code to [`ProviderError`] mapping
//!
//! # Examples
//!
//! ```ignore
//! use motor_quote_aggregator::infrastructure::providers::http_client::HttpClient;
//!
//! let client = HttpClient::new(30_000)?;
//! let url = "https://axa.ma/bff/website/v1/quotation";
//! let body: serde_json::Value = client.post(url, &payload).await?;
//! ```

use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest response body excerpt kept in error messages.
const MAX_ERROR_BODY: usize = 512;

/// HTTP client wrapper for provider adapters.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client.
    client: Client,
    /// Request timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> ProviderResult<Self> {
        Self::with_headers(timeout_ms, default_headers())
    }

    /// Creates a new HTTP client with custom default headers.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the client cannot be created.
    pub fn with_headers(timeout_ms: u64, default_headers: HeaderMap) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ProviderError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails or the status is not 2xx,
    /// and `ProviderError::Protocol` if the body cannot be parsed.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> ProviderResult<T> {
        self.send(self.client.get(url)).await
    }

    /// Makes a GET request with query parameters under a bearer token.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get`].
    pub async fn get_with_bearer<T: DeserializeOwned, P: Serialize + ?Sized>(
        &self,
        url: &str,
        token: &str,
        params: &P,
    ) -> ProviderResult<T> {
        self.send(self.client.get(url).bearer_auth(token).query(params))
            .await
    }

    /// Makes a POST request with a JSON body and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get`].
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> ProviderResult<T> {
        self.send(self.client.post(url).json(body)).await
    }

    /// Makes a PUT request with a JSON body and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get`].
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> ProviderResult<T> {
        self.send(self.client.put(url).json(body)).await
    }

    /// Makes a DELETE request, ignoring any response body.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails or the status is not 2xx.
    pub async fn delete(&self, url: &str) -> ProviderResult<()> {
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(map_status_error(status, &body))
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ProviderResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        handle_response(response).await
    }

    /// Maps a reqwest error to a ProviderError.
    fn map_reqwest_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::timeout_with_duration("Request timed out", self.timeout_ms)
        } else if error.is_connect() {
            ProviderError::connection(format!("Connection failed: {}", error))
        } else {
            ProviderError::connection(format!("HTTP request failed: {}", error))
        }
    }
}

/// Browser-like headers some upstreams require.
fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        reqwest::header::USER_AGENT,
        HeaderValue::from_static("Mozilla/5.0"),
    );
    headers
}

/// Handles the HTTP response, checking status and deserializing JSON.
async fn handle_response<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::protocol(format!("Failed to parse response: {}", e)))
    } else {
        let error_body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &error_body))
    }
}

/// Maps an HTTP status code to a ProviderError.
pub(crate) fn map_status_error(status: StatusCode, body: &str) -> ProviderError {
    let body = excerpt(body);
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(format!("Bad request ({}): {}", status, body))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::authentication(format!("Authentication failed ({}): {}", status, body))
        }
        StatusCode::NOT_FOUND => ProviderError::not_found(format!("Resource not found: {}", body)),
        StatusCode::GONE => ProviderError::session_expired(format!("Resource gone: {}", body)),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited("Rate limit exceeded"),
        s if s.is_server_error() => ProviderError::upstream(s.as_u16(), body),
        _ => ProviderError::protocol(format!("HTTP error ({}): {}", status, body)),
    }
}

fn excerpt(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", body.get(..end).unwrap_or_default())
}

use std::time::Duration;

use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use super::normalize::{parse_records, EnvelopeError};
use crate::catalog::CategoryRecord;
use crate::util::{join_path, validate_base_url, UrlValidationError};

/// Largest category payload accepted from the backend.
pub const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid UTF-8 in response")]
    InvalidUtf8,
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] UrlValidationError),
    #[error("Malformed category payload: {0}")]
    Payload(#[from] EnvelopeError),
    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
}

/// Request tuning for [`CategoryClient`].
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Upper bound on connect plus response headers.
    pub timeout: Duration,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
        }
    }
}

/// Read-only client for the category listing endpoint.
#[derive(Debug, Clone)]
pub struct CategoryClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
    options: SourceOptions,
}

impl CategoryClient {
    pub fn new(
        base_url: &str,
        categories_path: &str,
        token: Option<SecretString>,
        options: SourceOptions,
    ) -> Result<Self, SourceError> {
        let base = validate_base_url(base_url)?;
        let endpoint = join_path(&base, categories_path);

        let http = reqwest::Client::builder()
            .user_agent(concat!("category-tree/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(2)
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            token,
            options,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch and normalize the full category snapshot.
    ///
    /// A single attempt; failures surface to the caller, which decides
    /// whether to reload.
    pub async fn fetch_records(&self) -> Result<Vec<CategoryRecord>, SourceError> {
        let body = self.fetch_body().await?;
        let records = parse_records(&body)?;
        tracing::info!(
            endpoint = %self.endpoint,
            count = records.len(),
            "Loaded category snapshot"
        );
        Ok(records)
    }

    async fn fetch_body(&self) -> Result<String, SourceError> {
        let mut request = self
            .http
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(token) = &self.token {
            tracing::trace!("Category API authentication configured");
            request = request.bearer_auth(token.expose_secret());
        }

        let response = tokio::time::timeout(self.options.timeout, request.send())
            .await
            .map_err(|_| SourceError::Timeout(self.options.timeout.as_secs()))?
            .map_err(SourceError::Network)?;

        if !response.status().is_success() {
            return Err(SourceError::HttpStatus(response.status().as_u16()));
        }

        read_limited_text(response, MAX_RESPONSE_SIZE).await
    }
}

async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, SourceError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(SourceError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(SourceError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(SourceError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| SourceError::InvalidUtf8)
}

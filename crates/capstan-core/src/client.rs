//! HTTP client for the deploy endpoint.
//!
//! The deploy endpoint exposes three operations: `PUT /apply`,
//! `PUT /delete` and `GET /{object}`. Responses are returned raw so
//! callers can relay whatever the server said, success or not.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::manifest::Service;

/// Endpoint used when neither configuration nor the manifest names one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:6227";

/// Request timeout applied when configuration does not override it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Errors that can occur while talking to the deploy endpoint.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The endpoint is not something a request can be sent to.
    #[error("invalid endpoint {0:?}: expected an http(s) URL")]
    InvalidEndpoint(String),

    /// A request body could not be serialised.
    #[error("failed to serialise request body: {0}")]
    Body(#[source] serde_json::Error),

    /// The request could not be built or did not complete.
    #[error("request to deploy endpoint failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// A response from the deploy endpoint, kept verbatim.
///
/// Non-2xx statuses are not errors at this layer; the server's body is
/// often the most useful diagnostic and callers decide how to present it.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status the server answered with.
    pub status: StatusCode,
    /// Raw response body.
    pub body: Bytes,
}

impl ApiResponse {
    /// Whether the server answered with a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// HTTP client for a single deploy endpoint.
#[derive(Debug, Clone)]
pub struct DeployClient {
    client: Client,
    base_url: String,
}

impl DeployClient {
    /// Create a client for the given endpoint.
    ///
    /// The timeout covers the whole request; deploy operations are
    /// expected to answer quickly and a hung endpoint should surface as
    /// an error rather than a stalled terminal.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ClientError::InvalidEndpoint(endpoint));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_owned(),
        })
    }

    /// The endpoint this client talks to, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Apply a manifest: `PUT /apply` with a JSON body.
    pub async fn apply(&self, manifest: Vec<u8>) -> Result<ApiResponse> {
        self.put_json("apply", manifest).await
    }

    /// Serialise a service and apply it: `PUT /apply`.
    pub async fn apply_service(&self, service: &Service) -> Result<ApiResponse> {
        let body = serde_json::to_vec(service).map_err(ClientError::Body)?;
        self.put_json("apply", body).await
    }

    /// Delete the objects a manifest describes: `PUT /delete` with a JSON body.
    pub async fn delete(&self, manifest: Vec<u8>) -> Result<ApiResponse> {
        self.put_json("delete", manifest).await
    }

    /// Fetch the current state of an object: `GET /{object}`.
    pub async fn get(&self, object: &str) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.base_url, object);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Http)?;

        Self::read_response(response).await
    }

    async fn put_json(&self, path: &str, body: Vec<u8>) -> Result<ApiResponse> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body)
            .send()
            .await
            .map_err(ClientError::Http)?;

        Self::read_response(response).await
    }

    async fn read_response(response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status();
        let body = response.bytes().await.map_err(ClientError::Http)?;
        Ok(ApiResponse { status, body })
    }
}

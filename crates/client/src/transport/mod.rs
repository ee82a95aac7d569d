//! HTTP transport seam.
//!
//! The dispatcher and the attachment cache both issue requests through
//! the [`Transport`] trait, so tests can substitute a canned
//! implementation and count calls without touching the network.
//!
//! Non-2xx statuses are returned as responses, not errors: mapping a
//! status to a failure is the caller's decision. Only connection-level
//! problems surface as [`ClientError`].

use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use serde_json::Value;

use crate::error::ClientError;

/// A single outgoing HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Fully built request URL.
    pub url: String,
    /// Bearer token for the Authorization header, when the endpoint
    /// requires it. Attachment URLs are pre-signed and carry none.
    pub bearer_token: Option<String>,
    /// JSON payload, serialized with a JSON content type when present.
    pub json_body: Option<Value>,
}

impl HttpRequest {
    /// Build an unauthenticated GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::GET, url: url.into(), bearer_token: None, json_body: None }
    }
}

/// A received HTTP response, status and body only.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Numeric HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport abstraction over the HTTP stack.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request and return the raw response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

/// Production transport built on reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(ClientError::from)?;

        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let mut builder = self.http.request(request.method.clone(), &request.url);

        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ClientError::from)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(ClientError::from)?;

        tracing::debug!("{} {} -> {}", request.method, request.url, status);

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_transport_new() {
        let transport = ReqwestTransport::new(Duration::from_secs(30));
        assert!(transport.is_ok());
    }

    #[test]
    fn test_response_is_success() {
        let ok = HttpResponse { status: 200, body: Bytes::new() };
        assert!(ok.is_success());

        let redirect = HttpResponse { status: 304, body: Bytes::new() };
        assert!(!redirect.is_success());

        let err = HttpResponse { status: 422, body: Bytes::new() };
        assert!(!err.is_success());
    }

    #[test]
    fn test_get_request_has_no_auth() {
        let req = HttpRequest::get("https://files.example.com/att1.png");
        assert_eq!(req.method, Method::GET);
        assert!(req.bearer_token.is_none());
        assert!(req.json_body.is_none());
    }
}

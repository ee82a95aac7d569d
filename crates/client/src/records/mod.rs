//! Tabular-data API dispatcher.
//!
//! Builds requests against `{base_url}/{base}/{table}`, sends them with
//! bearer-token authorization, and maps the response:
//!
//! - status >= 400 becomes [`ClientError::Api`] carrying the server's
//!   message when one is present
//! - a 2xx body is decoded as JSON; an undecodable body decodes to
//!   `null` rather than failing
//!
//! Caching is layered on top by [`crate::caching::CachingClient`]; the
//! dispatcher itself always goes to the network.

pub mod request;
pub mod response;

pub use request::ListOptions;
pub use response::{Deleted, Record, RecordPage};

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use url::Url;

use airgrid_core::{AppConfig, ConfigError};

use crate::error::ClientError;
use crate::transport::{HttpRequest, Transport};

/// Dispatcher for one table of one remote base.
#[derive(Clone)]
pub struct RecordsApi {
    transport: Arc<dyn Transport>,
    api_key: String,
    endpoint: Url,
}

impl RecordsApi {
    /// Create a dispatcher over the given transport.
    pub fn new(config: &AppConfig, transport: Arc<dyn Transport>) -> Result<Self, ClientError> {
        let mut endpoint = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::Invalid { field: "base_url".into(), reason: e.to_string() })?;

        endpoint
            .path_segments_mut()
            .map_err(|()| ConfigError::Invalid { field: "base_url".into(), reason: "cannot be a base".into() })?
            .pop_if_empty()
            .push(&config.base)
            .push(&config.table);

        Ok(Self { transport, api_key: config.api_key.clone(), endpoint })
    }

    /// Full URL for a request path and query pairs.
    ///
    /// The URL doubles as cache-key input, so it is built identically
    /// for every call shape.
    pub fn request_url(&self, path: &str, query: &[(String, String)]) -> Url {
        let mut url = self.endpoint.clone();
        if !path.is_empty()
            && let Ok(mut segments) = url.path_segments_mut()
        {
            segments.push(path);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Dispatch one request and decode the response body.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let url = self.request_url(path, query);
        tracing::debug!("dispatching {} {}", method, url);

        let response = self
            .transport
            .send(HttpRequest {
                method,
                url: url.to_string(),
                bearer_token: Some(self.api_key.clone()),
                json_body: body,
            })
            .await?;

        if response.status >= 400 {
            return Err(ClientError::Api {
                status: response.status,
                message: response::error_message(&response.body),
            });
        }

        // Lenient by contract: an unparsable 2xx body decodes to null
        // instead of failing the call.
        Ok(serde_json::from_slice(&response.body).unwrap_or(Value::Null))
    }
}

//! Client error types.

use std::sync::Arc;

/// Errors from the tabular-data API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid or missing configuration at construction.
    #[error(transparent)]
    Config(#[from] airgrid_core::ConfigError),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The server answered with a status >= 400.
    #[error("api error: status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Api { status: u16, message: Option<String> },

    /// The response cache could not be read from or written to.
    #[error("cache error: {0}")]
    Cache(#[from] airgrid_core::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ClientError::Timeout } else { ClientError::Network(Arc::new(err)) }
    }
}

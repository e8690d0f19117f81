//! HTTP transport for the place API.
//!
//! The client talks to the service through the `Transport` trait so tests
//! and alternative stacks can substitute the wire layer. The production
//! implementation is a thin reqwest adapter.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use place_common::{PlaceError, PlaceResult};

/// A GET-only wire collaborator.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a path relative to the service root with query parameters.
    ///
    /// Returns the raw payload; HTTP and connection failures surface as
    /// `PlaceError::Transport`.
    async fn get(&self, path: &str, params: &[(String, String)]) -> PlaceResult<Bytes>;
}

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// Connection establishment timeout
    pub connect_timeout: Duration,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 4,
        }
    }
}

/// reqwest-backed transport bound to a service root URL.
pub struct HttpTransport {
    client: Client,
    root_url: String,
}

impl HttpTransport {
    /// Create a transport with default configuration.
    pub fn new(root_url: impl Into<String>) -> PlaceResult<Self> {
        Self::with_config(root_url, TransportConfig::default())
    }

    /// Create a transport with explicit configuration.
    ///
    /// The root URL must be non-empty; trailing slashes are normalized away
    /// so path joining is unambiguous.
    pub fn with_config(root_url: impl Into<String>, config: TransportConfig) -> PlaceResult<Self> {
        let root_url = root_url.into();
        let root_url = root_url.trim_end_matches('/').to_string();
        if root_url.is_empty() {
            return Err(PlaceError::InvalidArgument(
                "undefined API URL".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| PlaceError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, root_url })
    }

    /// The normalized service root.
    pub fn root_url(&self) -> &str {
        &self.root_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> PlaceResult<Bytes> {
        let url = format!("{}/{}", self.root_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| PlaceError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaceError::Transport(format!(
                "HTTP {} from {}",
                status, url
            )));
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| PlaceError::Transport(e.to_string()))?;

        debug!(url = %url, bytes = payload.len(), "GET completed");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_root_url_rejected() {
        assert!(matches!(
            HttpTransport::new(""),
            Err(PlaceError::InvalidArgument(_))
        ));
        // A bare slash normalizes to empty and is rejected too.
        assert!(HttpTransport::new("/").is_err());
    }

    #[test]
    fn test_trailing_slash_normalized() {
        let transport = HttpTransport::new("http://api.example.com/api/v1/").unwrap();
        assert_eq!(transport.root_url(), "http://api.example.com/api/v1");

        let transport = HttpTransport::new("http://api.example.com/api/v1").unwrap();
        assert_eq!(transport.root_url(), "http://api.example.com/api/v1");
    }
}

//! The HTTP side of a session: send the request, hand back the body stream.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use dashgen_types::StreamError;
use futures::{Stream, StreamExt};

use crate::config::ClientConfig;
use crate::error::{map_http_status, map_reqwest_error};

/// A response body as an ordered stream of byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>;

/// Which streaming endpoint to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Generate a new dashboard.
    Generate,
    /// Refine an existing dashboard.
    Optimize,
}

/// Opens a streaming exchange with the backend.
///
/// Implementations resolve once response headers have arrived: `Ok` for a
/// success status, with the body still unread, and `Err` otherwise. Dropping
/// the returned future or stream must abort the exchange.
pub trait Transport: Send + Sync + 'static {
    /// POST `body` to `endpoint`.
    fn open(
        &self,
        endpoint: Endpoint,
        body: serde_json::Value,
    ) -> impl Future<Output = Result<ByteStream, StreamError>> + Send;
}

/// [`Transport`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    pub(crate) config: ClientConfig,
    pub(crate) client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport, applying the configured timeouts.
    pub fn new(config: ClientConfig) -> Result<Self, StreamError> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StreamError::Network(Box::new(e)))?;
        Ok(Self { config, client })
    }

    /// Reuse an existing `reqwest` client. Timeouts in `config` are then
    /// whatever that client was built with.
    #[must_use]
    pub fn with_client(config: ClientConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Transport for HttpTransport {
    fn open(
        &self,
        endpoint: Endpoint,
        body: serde_json::Value,
    ) -> impl Future<Output = Result<ByteStream, StreamError>> + Send {
        let url = self.config.endpoint_url(endpoint);
        let limits = self.config.timeout_limits();
        let http_client = self.client.clone();

        async move {
            tracing::debug!(url = %url, ?endpoint, "opening dashboard stream");

            let response = http_client
                .post(&url)
                .header("accept", "text/event-stream")
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, limits))?;

            let status = response.status();
            if !status.is_success() {
                // An unreadable error body still yields the status text.
                let body_text = response.text().await.unwrap_or_default();
                return Err(map_http_status(status, &body_text));
            }

            tracing::debug!(%status, "dashboard stream opened");

            let stream = response
                .bytes_stream()
                .map(move |chunk| chunk.map_err(|e| map_reqwest_error(e, limits)));
            Ok(Box::pin(stream) as ByteStream)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_config() {
        let config = ClientConfig::new().base_url("http://localhost:9999");
        let transport = HttpTransport::new(config.clone()).unwrap();
        assert_eq!(transport.config(), &config);
    }

    #[test]
    fn with_client_keeps_config() {
        let config = ClientConfig::new().base_url("http://localhost:1234");
        let transport = HttpTransport::with_client(config, reqwest::Client::new());
        assert_eq!(transport.config().base_url, "http://localhost:1234");
    }
}

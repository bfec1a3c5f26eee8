//! HTTP transport backed by reqwest.

use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{ExchangeError, ExchangeResult};
use crate::ports::{HttpMethod, HttpResponse, SignedRequest, Transport};

/// Default request deadline in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Real HTTP transport.
///
/// Each request runs under its own deadline; expiry maps to
/// `RequestTimeout`, any other client failure to `Network`.
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with the given per-request deadline.
    pub fn new(timeout: Duration) -> Self {
        Self { client: Client::new(), timeout }
    }

    /// Per-request deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: SignedRequest) -> ExchangeResult<HttpResponse> {
        let mut builder = self.client.request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = timeout(self.timeout, builder.send())
            .await
            .map_err(|_| {
                ExchangeError::RequestTimeout(format!(
                    "{} {} timed out after {}ms",
                    request.method,
                    request.url,
                    self.timeout.as_millis()
                ))
            })?
            .map_err(|e| {
                if e.is_timeout() {
                    ExchangeError::RequestTimeout(format!("{} {} {}", request.method, request.url, e))
                } else {
                    ExchangeError::Network(format!("{} {} {}", request.method, request.url, e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Network(format!("{} {} {}", request.method, request.url, e)))?;

        debug!(
            method = %request.method,
            url = %request.url,
            status = status.as_u16(),
            bytes = body.len(),
            "HTTP response received"
        );

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        let transport = ReqwestTransport::default();
        assert_eq!(transport.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest_method(HttpMethod::Delete), Method::DELETE);
        assert_eq!(to_reqwest_method(HttpMethod::Get), Method::GET);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2));
        let request = SignedRequest {
            url: "http://127.0.0.1:9/api/v3/ping".to_string(),
            method: HttpMethod::Get,
            body: None,
            headers: vec![],
        };

        let err = transport.execute(request).await.unwrap_err();
        assert!(err.is_network_error());
    }
}

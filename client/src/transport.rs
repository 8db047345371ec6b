//! Blocking HTTP transport.
//!
//! The `Transport` trait is the seam between request building and the
//! network: it takes a host and a host-relative `HttpRequest` and returns the
//! raw response. Non-success statuses are data, not errors; only failures to
//! obtain a response at all are `TransportError`s.

use std::time::Duration;

use search_core::{HttpMethod, HttpRequest, HttpResponse};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{host}: {message}")]
pub struct TransportError {
    pub host: String,
    pub message: String,
}

pub trait Transport: Send + Sync + 'static {
    fn send(&self, host: &str, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by a shared `ureq::Agent` (connection pool included).
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, host: &str, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = format!("{host}{}", request.path);
        let body = request.body.as_deref().unwrap_or_default();
        let failed = |e: ureq::Error| TransportError {
            host: host.to_string(),
            message: e.to_string(),
        };

        let mut response = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(&url), request).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), request).call(),
            HttpMethod::Post => with_headers(self.agent.post(&url), request).send(body.as_bytes()),
            HttpMethod::Put => with_headers(self.agent.put(&url), request).send(body.as_bytes()),
        }
        .map_err(failed)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string().map_err(failed)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

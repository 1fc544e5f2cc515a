//! Executing requests over the network.
//!
//! # Design
//! `Transport` is the single I/O seam. The default `UreqTransport` keeps one
//! agent with a global timeout and treats every HTTP status as data, so
//! status interpretation stays in `PhotoClient::parse`. There is no retry:
//! a timeout surfaces as `ApiError::Timeout`.

use std::time::Duration;

use tracing::debug;

use crate::config::DEFAULT_TIMEOUT;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one `HttpRequest` and returns the server's answer, whatever
/// its status.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
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

macro_rules! with_headers {
    ($builder:expr, $headers:expr) => {{
        let mut builder = $builder;
        for (name, value) in $headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }};
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let uri = request.uri();
        debug!(method = request.method.as_str(), %uri, "sending request");

        let body = request.body.as_deref();
        let result = match request.method {
            HttpMethod::Get => with_headers!(self.agent.get(&uri), &request.headers).call(),
            HttpMethod::Delete => with_headers!(self.agent.delete(&uri), &request.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers!(self.agent.post(&uri), &request.headers);
                match body {
                    Some(bytes) => builder.send(bytes),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers!(self.agent.put(&uri), &request.headers);
                match body {
                    Some(bytes) => builder.send(bytes),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(transport_error)?;

        debug!(status, %uri, "received response");
        Ok(HttpResponse { status, headers, body })
    }
}

fn transport_error(error: ureq::Error) -> ApiError {
    match error {
        ureq::Error::Timeout(_) => ApiError::Timeout,
        other => ApiError::Transport(other.to_string()),
    }
}

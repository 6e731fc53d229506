//! HTTP transport seam.
//!
//! - `Transport` is the only place network I/O happens; the executor in
//!   `crate::client` is generic over it.
//! - `UreqTransport` is the production adapter: blocking `ureq` agent with a global
//!   timeout, status codes returned as data rather than errors.
//! - `TransportObserver` receives request/response tracing hooks. The default
//!   `LogObserver` writes them through `log`.

use http::{HeaderMap, Method};
use log::{debug, log_enabled, trace, Level};
use serde_json::Value;
use std::time::Duration;

use crate::error::{FebosError, Result};

/// Upper bound on a response body read by `UreqTransport`. Installation lists are
/// requested with very large page sizes, so this is well above ureq's default.
const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

/// A fully composed request: absolute URL, final headers, unencoded query pairs and
/// an optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub trait Transport {
    /// Perform one request. Any HTTP status is a successful return; only failures
    /// to obtain a response at all (DNS, TLS, timeout, I/O) are errors.
    fn request(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

pub trait TransportObserver: Send + Sync {
    fn on_request(&self, _request: &HttpRequest) {}
    fn on_response(&self, _request: &HttpRequest, _response: &HttpResponse) {}
}

/// Logs request lines at `debug` and response bodies at `trace`. Request bodies are
/// never logged since the login body carries the password.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl TransportObserver for LogObserver {
    fn on_request(&self, request: &HttpRequest) {
        debug!(
            "Request: {} {} query={:?}",
            request.method.as_str(),
            request.url,
            request.query
        );
    }

    fn on_response(&self, request: &HttpRequest, response: &HttpResponse) {
        debug!("Response: {} {}", response.status, request.url);
        if log_enabled!(Level::Trace) {
            trace!("Response body: {}", response.body);
        }
    }
}

pub struct UreqTransport {
    agent: ureq::Agent,
    observer: Box<dyn TransportObserver>,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        Self::with_observer(timeout, Box::new(LogObserver))
    }

    pub fn with_observer(timeout: Duration, observer: Box<dyn TransportObserver>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        UreqTransport { agent, observer }
    }

    fn send(&self, request: &HttpRequest) -> std::result::Result<http::Response<ureq::Body>, ureq::Error> {
        if request.method == Method::POST {
            let mut req = self.agent.post(&request.url);
            for (name, value) in &request.headers {
                req = req.header(name.as_str(), value.as_bytes());
            }
            for (k, v) in &request.query {
                req = req.query(k, v);
            }
            match &request.body {
                Some(body) => req.send(body.to_string()),
                None => req.send_empty(),
            }
        } else {
            let mut req = self.agent.get(&request.url);
            for (name, value) in &request.headers {
                req = req.header(name.as_str(), value.as_bytes());
            }
            for (k, v) in &request.query {
                req = req.query(k, v);
            }
            req.call()
        }
    }
}

impl Transport for UreqTransport {
    fn request(&self, request: &HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::GET && request.method != Method::POST {
            return Err(FebosError::Transport(format!("unsupported method {}", request.method)));
        }
        self.observer.on_request(request);

        let mut res = self.send(request).map_err(|e| FebosError::Transport(e.to_string()))?;
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(|e| FebosError::Transport(format!("reading response body: {e}")))?;

        let response = HttpResponse { status, headers, body };
        self.observer.on_response(request, &response);
        Ok(response)
    }
}

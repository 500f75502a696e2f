//! Request/response middleware applied to every network exchange.
//!
//! A chain is an ordered list of [`Interceptor`]s. Each step either mutates
//! the outgoing request (user agent) or observes the exchange without
//! touching it (debug dump). Redirect hops run through the chain too.

use crate::base::neterror::NetError;
use crate::http::requestbody::RequestBody;
use http::{HeaderMap, HeaderValue, Method, StatusCode, Version};
use std::fmt::Write as _;
use std::sync::Arc;
use url::Url;

/// User agent sent when the caller does not configure one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible)";

/// A request about to be handed to the transport.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl OutgoingRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }
}

/// Response status line and headers, without the body.
#[derive(Debug, Clone, Copy)]
pub struct ResponseHead<'a> {
    pub status: StatusCode,
    pub version: Version,
    pub headers: &'a HeaderMap,
}

/// One step of the chain.
pub trait Interceptor: Send + Sync {
    /// Called before the request is sent. May edit headers.
    fn on_request(&self, _request: &mut OutgoingRequest) {}

    /// Called once the exchange finished, with the head or the failure.
    fn on_response(
        &self,
        _request: &OutgoingRequest,
        _response: Result<ResponseHead<'_>, &NetError>,
    ) {
    }
}

/// Sets `User-Agent` on requests that do not carry one.
#[derive(Debug, Clone)]
pub struct UserAgent {
    value: HeaderValue,
}

impl UserAgent {
    /// An invalid header value falls back to [`DEFAULT_USER_AGENT`].
    pub fn new(user_agent: Option<&str>) -> Self {
        let value = user_agent
            .filter(|ua| !ua.is_empty())
            .and_then(|ua| HeaderValue::from_str(ua).ok())
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_USER_AGENT));
        Self { value }
    }

    pub fn value(&self) -> &HeaderValue {
        &self.value
    }
}

impl Default for UserAgent {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Interceptor for UserAgent {
    fn on_request(&self, request: &mut OutgoingRequest) {
        if !request.headers.contains_key(http::header::USER_AGENT) {
            request
                .headers
                .insert(http::header::USER_AGENT, self.value.clone());
        }
    }
}

/// Writes full request dumps and header-only response dumps to the
/// `statebot::dump` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugDump;

impl DebugDump {
    /// Render the request as it goes on the wire, body included.
    pub fn dump_request(request: &OutgoingRequest) -> String {
        let mut out = String::new();
        let target = match request.url.query() {
            Some(q) => format!("{}?{}", request.url.path(), q),
            None => request.url.path().to_string(),
        };
        let _ = writeln!(out, "{} {} HTTP/1.1", request.method, target);
        if !request.headers.contains_key(http::header::HOST) {
            if let Some(host) = request.url.host_str() {
                let _ = writeln!(out, "Host: {}", host);
            }
        }
        write_headers(&mut out, &request.headers);
        out.push('\n');
        if let RequestBody::Bytes(body) = &request.body {
            out.push_str(&String::from_utf8_lossy(body));
        }
        out
    }

    /// Render the status line and headers only.
    pub fn dump_response(head: &ResponseHead<'_>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:?} {} {}",
            head.version,
            head.status.as_u16(),
            head.status.canonical_reason().unwrap_or("")
        );
        write_headers(&mut out, head.headers);
        out
    }
}

fn write_headers(out: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let _ = writeln!(
            out,
            "{}: {}",
            name,
            String::from_utf8_lossy(value.as_bytes())
        );
    }
}

impl Interceptor for DebugDump {
    fn on_request(&self, request: &mut OutgoingRequest) {
        tracing::info!(
            target: "statebot::dump",
            "> Dumped request: \n>>>\n{}\n>>>\n",
            Self::dump_request(request)
        );
    }

    fn on_response(
        &self,
        _request: &OutgoingRequest,
        response: Result<ResponseHead<'_>, &NetError>,
    ) {
        match response {
            Ok(head) => tracing::info!(
                target: "statebot::dump",
                "Dumped response: \n<<<\n{}\n<<<\n",
                Self::dump_response(&head)
            ),
            Err(e) => tracing::info!(
                target: "statebot::dump",
                "Dumped response: \n<<<\n(nil): err={}\n<<<\n",
                e
            ),
        }
    }
}

/// Ordered interceptor chain. Requests pass front to back.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    steps: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<I: Interceptor + 'static>(&mut self, step: I) {
        self.steps.push(Arc::new(step));
    }

    pub fn push_arc(&mut self, step: Arc<dyn Interceptor>) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn apply_request(&self, request: &mut OutgoingRequest) {
        for step in &self.steps {
            step.on_request(request);
        }
    }

    pub fn observe_response(
        &self,
        request: &OutgoingRequest,
        response: Result<ResponseHead<'_>, &NetError>,
    ) {
        for step in &self.steps {
            step.on_response(request, response);
        }
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("steps", &self.steps.len())
            .finish()
    }
}

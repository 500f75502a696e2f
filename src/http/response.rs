//! HTTP Response with body access.

use crate::http::ResponseBody;
use http::{HeaderMap, StatusCode, Version};
use hyper::body::Incoming;
use url::Url;

/// HTTP Response with accessible body.
/// This is the user-facing response type that owns the body.
#[derive(Debug)]
pub struct HttpResponse {
    url: Url,
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Option<ResponseBody>,
}

impl HttpResponse {
    /// Create from hyper Response<Incoming>, remembering the URL it answered.
    pub fn from_hyper(url: Url, resp: http::Response<Incoming>) -> Self {
        let (parts, body) = resp.into_parts();
        Self {
            url,
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body: Some(ResponseBody::new(body)),
        }
    }

    /// Create from parts. A `None` body models a response without a body stream.
    pub fn new(
        url: Url,
        status: StatusCode,
        headers: HeaderMap,
        body: Option<ResponseBody>,
    ) -> Self {
        Self {
            url,
            status,
            version: Version::HTTP_11,
            headers,
            body,
        }
    }

    /// URL that produced this response.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Get a reference to the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether a body stream is still attached.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Take the response body for consumption.
    /// Can only be called once - subsequent calls return None.
    pub fn take_body(&mut self) -> Option<ResponseBody> {
        self.body.take()
    }
}

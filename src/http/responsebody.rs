//! Response body streaming.
//! Mirrors Chromium's HttpStream::ReadResponseBody.

use crate::base::neterror::NetError;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};

/// Response body wrapper for streaming.
///
/// Wraps any `http_body::Body` producing `Bytes`, so a network stream and an
/// in-memory buffer look the same to the page layer.
pub struct ResponseBody {
    inner: BoxBody<Bytes, NetError>,
}

impl ResponseBody {
    /// Create a new response body wrapper.
    pub fn new<B>(body: B) -> Self
    where
        B: http_body::Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: std::fmt::Display,
    {
        let inner = body
            .map_err(|e| {
                tracing::debug!(error = %e, "response body read failed");
                NetError::HttpBodyError
            })
            .boxed();
        Self { inner }
    }

    /// Body backed by a fixed buffer.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(Full::new(bytes.into()))
    }

    /// Size hint reported by the underlying stream.
    pub fn size_hint(&self) -> http_body::SizeHint {
        http_body::Body::size_hint(&self.inner)
    }

    /// Read entire body as bytes. The stream is dropped, and its
    /// connection released, as soon as it is drained.
    pub async fn bytes(self) -> Result<Bytes, NetError> {
        let collected = self.inner.collect().await?;
        Ok(collected.to_bytes())
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBody")
            .field("size_hint", &self.size_hint())
            .finish()
    }
}

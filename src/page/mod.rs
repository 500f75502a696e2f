//! Response wrapper with lazy, one-time body materialization.

use crate::base::neterror::NetError;
use crate::html::{self, Form, Table};
use crate::http::{HttpResponse, ResponseBody};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use std::io::Cursor;
use url::Url;

/// Where the body is in its lifecycle.
enum BodyState {
    /// Still on the wire.
    Unread(ResponseBody),
    /// Drained and, if needed, transcoded.
    Materialized(Bytes),
    /// The read failed; every later access reports the same error.
    Failed(NetError),
    /// The response never had a body stream.
    Missing,
}

/// The outcome of a GET or POST.
///
/// The body is read on first access and cached; the network stream is
/// dropped as soon as it is drained.
pub struct Page {
    response: Option<HttpResponse>,
    body: BodyState,
}

impl Page {
    pub fn new(mut response: HttpResponse) -> Self {
        let body = match response.take_body() {
            Some(body) => BodyState::Unread(body),
            None => BodyState::Missing,
        };
        Self {
            response: Some(response),
            body,
        }
    }

    /// A page wrapping no response. Every body accessor reports
    /// [`NetError::NilResponse`].
    pub fn empty() -> Self {
        Self {
            response: None,
            body: BodyState::Missing,
        }
    }

    /// Final URL, after redirects.
    pub fn url(&self) -> Option<&Url> {
        self.response.as_ref().map(HttpResponse::url)
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response.as_ref().map(HttpResponse::status)
    }

    pub fn headers(&self) -> Option<&HeaderMap> {
        self.response.as_ref().map(HttpResponse::headers)
    }

    /// The response, with its body already drained into memory.
    pub async fn raw(&mut self) -> Result<&HttpResponse, NetError> {
        self.bytes().await?;
        self.response.as_ref().ok_or(NetError::NilResponse)
    }

    /// A fresh reader over the body; each call starts at offset 0.
    pub async fn body(&mut self) -> Result<Cursor<Bytes>, NetError> {
        Ok(Cursor::new(self.bytes().await?))
    }

    /// The body bytes. Reads the network stream on first call only.
    pub async fn bytes(&mut self) -> Result<Bytes, NetError> {
        let response = self.response.as_ref().ok_or(NetError::NilResponse)?;

        // Placeholder so a read that is cancelled midway is seen as failed.
        let state = std::mem::replace(&mut self.body, BodyState::Failed(NetError::HttpBodyError));
        let (next, result) = match state {
            BodyState::Unread(body) => match body.bytes().await {
                Ok(raw) => {
                    let bytes = if declares_latin1(response.headers()) {
                        latin1_to_utf8(&raw)
                    } else {
                        raw
                    };
                    (BodyState::Materialized(bytes.clone()), Ok(bytes))
                }
                Err(e) => {
                    tracing::debug!(url = %response.url(), error = %e, "failed to read body");
                    (BodyState::Failed(e), Err(e))
                }
            },
            BodyState::Materialized(bytes) => (BodyState::Materialized(bytes.clone()), Ok(bytes)),
            BodyState::Failed(e) => (BodyState::Failed(e), Err(e)),
            BodyState::Missing => (BodyState::Missing, Err(NetError::NilBody)),
        };
        self.body = next;
        result
    }

    /// The body as text, invalid UTF-8 replaced.
    pub async fn text(&mut self) -> Result<String, NetError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Every `<form>` on the page.
    pub async fn forms(&mut self) -> Result<Vec<Form>, NetError> {
        let bytes = self.bytes().await?;
        Ok(html::extract_forms(&bytes))
    }

    /// Every `<table>` on the page.
    pub async fn tables(&mut self) -> Result<Vec<Table>, NetError> {
        let bytes = self.bytes().await?;
        Ok(html::extract_tables(&bytes))
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = match &self.body {
            BodyState::Unread(_) => "unread".to_string(),
            BodyState::Materialized(b) => format!("{} bytes", b.len()),
            BodyState::Failed(e) => format!("failed: {}", e),
            BodyState::Missing => "missing".to_string(),
        };
        f.debug_struct("Page")
            .field("url", &self.url().map(Url::as_str))
            .field("status", &self.status())
            .field("body", &body)
            .finish()
    }
}

fn declares_latin1(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("charset=iso-8859-1"))
        .unwrap_or(false)
}

/// Each byte is the Latin-1 code point of the same value.
fn latin1_to_utf8(raw: &[u8]) -> Bytes {
    let text: String = raw.iter().map(|&b| char::from(b)).collect();
    Bytes::from(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use std::io::Read;

    fn page(content_type: Option<&'static str>, body: Option<&'static [u8]>) -> Page {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        Page::new(HttpResponse::new(
            Url::parse("http://example.com/").unwrap(),
            StatusCode::OK,
            headers,
            body.map(ResponseBody::from_bytes),
        ))
    }

    #[tokio::test]
    async fn test_bytes_idempotent() {
        let mut p = page(Some("text/html"), Some(b"<p>hi</p>"));
        let first = p.bytes().await.unwrap();
        let second = p.bytes().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(&first[..], b"<p>hi</p>");
    }

    #[tokio::test]
    async fn test_body_readers_are_independent() {
        let mut p = page(None, Some(b"abc"));
        let mut r1 = p.body().await.unwrap();
        let mut r2 = p.body().await.unwrap();

        let mut s1 = String::new();
        r1.read_to_string(&mut s1).unwrap();
        let mut s2 = String::new();
        r2.read_to_string(&mut s2).unwrap();
        assert_eq!(s1, "abc");
        assert_eq!(s2, "abc");
    }

    #[tokio::test]
    async fn test_raw_materializes() {
        let mut p = page(None, Some(b""));
        let resp = p.raw().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!resp.has_body());
    }

    #[tokio::test]
    async fn test_missing_body() {
        let mut p = page(None, None);
        assert_eq!(p.bytes().await.unwrap_err(), NetError::NilBody);
        assert_eq!(p.raw().await.unwrap_err(), NetError::NilBody);
        assert_eq!(p.status(), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_empty_page() {
        let mut p = Page::empty();
        assert_eq!(p.bytes().await.unwrap_err(), NetError::NilResponse);
        assert_eq!(p.forms().await.unwrap_err(), NetError::NilResponse);
        assert!(p.url().is_none());
    }

    #[tokio::test]
    async fn test_latin1_transcoded_once() {
        let mut p = page(Some("text/html; Charset=ISO-8859-1"), Some(b"caf\xe9"));
        assert_eq!(p.text().await.unwrap(), "caf\u{e9}");
        assert_eq!(p.bytes().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_other_charsets_untouched() {
        let mut p = page(Some("text/html; charset=windows-1252"), Some(b"caf\xe9"));
        assert_eq!(&p.bytes().await.unwrap()[..], b"caf\xe9");
    }

    #[tokio::test]
    async fn test_forms_and_tables() {
        let mut p = page(
            Some("text/html"),
            Some(b"<form id=a><input name=q value=1></form><table><tr><td>x</td></tr></table>"),
        );
        let forms = p.forms().await.unwrap();
        assert_eq!(forms[0].fields.get("q"), Some("1"));
        let tables = p.tables().await.unwrap();
        assert_eq!(tables[0].data, vec![vec!["x".to_string()]]);
    }
}

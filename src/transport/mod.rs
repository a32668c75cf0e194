//! HTTP transport boundary.
//!
//! The scraper never talks to the network directly. It resolves a
//! [`RequestContext`] and hands it, together with the target URL, to an
//! [`HttpTransport`]. [`ReqwestTransport`] is the default implementation.

pub mod reqwest_client;

use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use thiserror::Error;
use url::Url;

use crate::request::RequestContext;

pub use reqwest_client::ReqwestTransport;

/// Contract for the component that performs the actual GET request.
///
/// Implementations apply every header of the context and route through its
/// proxy when one is present. Failures are reported as-is; no retries.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn fetch(
        &self,
        url: &Url,
        context: &RequestContext,
    ) -> Result<FetchedContent, TransportError>;
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header '{0}'")]
    InvalidHeader(String),
    #[error("invalid proxy uri '{uri}': {source}")]
    InvalidProxy {
        uri: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Raw response content returned by a transport.
#[derive(Debug, Clone)]
pub struct FetchedContent {
    status: u16,
    url: Url,
    headers: HeaderMap,
    body: Bytes,
}

impl FetchedContent {
    pub fn new(status: u16, url: Url, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            url,
            headers,
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Final URL after redirects.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// `Content-Type` header value, when present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    pub fn bytes(&self) -> Bytes {
        self.body.clone()
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.to_vec())
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn exposes_content_type_and_text() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        let content = FetchedContent::new(
            200,
            Url::parse("http://example.com/").unwrap(),
            headers,
            Bytes::from_static(b"<p>hi</p>"),
        );

        assert_eq!(content.content_type(), Some("text/html; charset=utf-8"));
        assert_eq!(content.text().unwrap(), "<p>hi</p>");
        assert_eq!(content.bytes(), Bytes::from_static(b"<p>hi</p>"));
    }

    #[test]
    fn lossy_text_tolerates_invalid_utf8() {
        let content = FetchedContent::new(
            200,
            Url::parse("http://example.com/").unwrap(),
            HeaderMap::new(),
            Bytes::from_static(&[b'o', b'k', 0xff]),
        );

        assert!(content.text().is_err());
        assert_eq!(content.text_lossy(), "ok\u{fffd}");
    }
}

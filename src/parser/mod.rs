//! HTML parsing boundary.

use scraper::Html;
use thiserror::Error;

use crate::transport::FetchedContent;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response from {url} is not an HTML document ({content_type})")]
    NotHtml { url: String, content_type: String },
    #[error("document parsing failed: {0}")]
    Document(String),
}

/// Turns fetched content into a parsed HTML document.
pub trait PageParser: Send + Sync {
    fn parse(&self, content: &FetchedContent) -> Result<Html, ParseError>;
}

/// Default parser backed by `scraper`.
///
/// Invalid UTF-8 is replaced rather than rejected. The content type is not
/// checked unless [`HtmlPageParser::strict`] is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPageParser {
    require_html: bool,
}

impl HtmlPageParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject responses whose `Content-Type` is present but not HTML.
    pub fn strict() -> Self {
        Self { require_html: true }
    }
}

impl PageParser for HtmlPageParser {
    fn parse(&self, content: &FetchedContent) -> Result<Html, ParseError> {
        if self.require_html
            && let Some(content_type) = content.content_type()
            && !is_html(content_type)
        {
            return Err(ParseError::NotHtml {
                url: content.url().to_string(),
                content_type: content_type.to_string(),
            });
        }

        Ok(Html::parse_document(&content.text_lossy()))
    }
}

fn is_html(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "text/html" || mime == "application/xhtml+xml"
}

//! High level fetch orchestration.
//!
//! Resolves per-call options against the configured defaults, then hands the
//! resulting request context to the transport, the HTML parser, or a fresh
//! [`Session`]. The free functions at the bottom expose the same operations
//! on top of the process-wide [`shared`] configuration.

use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;
use scraper::Html;
use thiserror::Error;
use url::Url;

use crate::config::{ConfigError, ScraperConfig, shared};
use crate::events::{
	ErrorEvent, EventDispatcher, EventHandler, LoggingHandler, PostResponseEvent, PreRequestEvent,
	ScraperEvent, SessionCreatedEvent,
};
use crate::parser::{HtmlPageParser, PageParser, ParseError};
use crate::proxy::{ProxyConfig, ProxyUri, proxy_uri as build_proxy_uri};
use crate::request::{CallOptions, RequestContext, effective_proxy, resolve};
use crate::session::Session;
use crate::transport::{FetchedContent, HttpTransport, ReqwestTransport, TransportError};
use crate::user_agents::UserAgentRegistry;

/// Result alias used across the orchestration layer.
pub type GScraperResult<T> = Result<T, GScraperError>;

/// High-level error surfaced by the orchestrator.
///
/// Transport and parser failures are carried unchanged.
#[derive(Debug, Error)]
pub enum GScraperError {
	#[error("url parse error: {0}")]
	Url(#[from] url::ParseError),
	#[error(transparent)]
	Transport(#[from] TransportError),
	#[error(transparent)]
	Parse(#[from] ParseError),
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Fluent builder for [`GScraper`].
pub struct GScraperBuilder {
	config: ScraperConfig,
	user_agent_alias: Option<String>,
	transport: Option<Arc<dyn HttpTransport>>,
	parser: Option<Arc<dyn PageParser>>,
	handlers: Vec<Arc<dyn EventHandler>>,
	enable_logging: bool,
}

impl GScraperBuilder {
	pub fn new() -> Self {
		Self {
			config: ScraperConfig::default(),
			user_agent_alias: None,
			transport: None,
			parser: None,
			handlers: Vec::new(),
			enable_logging: true,
		}
	}

	pub fn with_config(mut self, config: ScraperConfig) -> Self {
		self.config = config;
		self
	}

	pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
		self.config.set_proxy(proxy);
		self
	}

	pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
		self.config.set_user_agent(agent);
		self.user_agent_alias = None;
		self
	}

	/// Default User-Agent by alias. Unknown aliases fail [`GScraperBuilder::build`].
	pub fn with_user_agent_alias(mut self, alias: impl Into<String>) -> Self {
		self.user_agent_alias = Some(alias.into());
		self
	}

	pub fn with_registry(mut self, registry: Arc<UserAgentRegistry>) -> Self {
		self.config = self.config.with_registry(registry);
		self
	}

	pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	pub fn with_parser(mut self, parser: Arc<dyn PageParser>) -> Self {
		self.parser = Some(parser);
		self
	}

	pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
		self.handlers.push(handler);
		self
	}

	pub fn disable_logging(mut self) -> Self {
		self.enable_logging = false;
		self
	}

	pub fn build(self) -> GScraperResult<GScraper> {
		let mut config = self.config;
		if let Some(alias) = self.user_agent_alias {
			config.try_set_user_agent_alias(&alias)?;
		}

		let mut events = EventDispatcher::new();
		if self.enable_logging {
			events.register_handler(Arc::new(LoggingHandler));
		}
		for handler in self.handlers {
			events.register_handler(handler);
		}

		Ok(GScraper {
			config,
			transport: self
				.transport
				.unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
			parser: self
				.parser
				.unwrap_or_else(|| Arc::new(HtmlPageParser::new())),
			events,
		})
	}
}

impl Default for GScraperBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Fetcher, page fetcher and session factory bound to one configuration.
pub struct GScraper {
	config: ScraperConfig,
	transport: Arc<dyn HttpTransport>,
	parser: Arc<dyn PageParser>,
	events: EventDispatcher,
}

impl GScraper {
	/// Scraper with default configuration and the reqwest transport.
	pub fn new() -> Self {
		GScraper::with_config(ScraperConfig::default())
	}

	pub fn with_config(config: ScraperConfig) -> Self {
		let mut events = EventDispatcher::new();
		events.register_handler(Arc::new(LoggingHandler));
		Self {
			config,
			transport: Arc::new(ReqwestTransport::new()),
			parser: Arc::new(HtmlPageParser::new()),
			events,
		}
	}

	/// Obtain a builder to customise the scraper instance.
	pub fn builder() -> GScraperBuilder {
		GScraperBuilder::new()
	}

	pub fn config(&self) -> &ScraperConfig {
		&self.config
	}

	pub fn config_mut(&mut self) -> &mut ScraperConfig {
		&mut self.config
	}

	/// Proxy URI for `proxy`, or for the configured default when `None`.
	pub fn proxy_uri(&self, proxy: Option<&ProxyConfig>) -> Option<ProxyUri> {
		build_proxy_uri(proxy.unwrap_or_else(|| self.config.proxy()))
	}

	/// Headers and proxy a fetch with `options` would use.
	pub fn request_context(&self, options: &CallOptions) -> RequestContext {
		resolve(options, &self.config)
	}

	/// Fetch the raw content at `uri`.
	pub async fn fetch(&self, uri: &str, options: &CallOptions) -> GScraperResult<FetchedContent> {
		let url = Url::parse(uri)?;
		let context = resolve(options, &self.config);

		self.events.dispatch(ScraperEvent::PreRequest(PreRequestEvent {
			url: url.clone(),
			user_agent: context.user_agent().map(str::to_owned),
			proxy: effective_proxy(options, &self.config).endpoint(),
			timestamp: chrono::Utc::now(),
		}));

		let started = Instant::now();
		let content = match self.transport.fetch(&url, &context).await {
			Ok(content) => content,
			Err(err) => {
				self.dispatch_error(&url, &err);
				return Err(err.into());
			}
		};

		self.events.dispatch(ScraperEvent::PostResponse(PostResponseEvent {
			url: content.url().clone(),
			status: content.status(),
			bytes: content.bytes().len(),
			latency: started.elapsed(),
			timestamp: chrono::Utc::now(),
		}));

		Ok(content)
	}

	/// Fetch `uri` and parse it as an HTML document.
	pub async fn fetch_page(&self, uri: &str, options: &CallOptions) -> GScraperResult<Html> {
		let content = self.fetch(uri, options).await?;
		match self.parser.parse(&content) {
			Ok(page) => Ok(page),
			Err(err) => {
				self.dispatch_error(content.url(), &err);
				Err(err.into())
			}
		}
	}

	/// New session configured from `options` and the defaults.
	pub fn create_session(&self, options: &CallOptions) -> Session {
		self.create_session_with(options, |_| {})
	}

	/// Like [`GScraper::create_session`], then runs `configure` once on the
	/// fully configured session before returning it.
	pub fn create_session_with<F>(&self, options: &CallOptions, configure: F) -> Session
	where
		F: FnOnce(&mut Session),
	{
		let mut session = Session::from_options(options, &self.config, self.parser.clone());
		configure(&mut session);

		self.events.dispatch(ScraperEvent::SessionCreated(SessionCreatedEvent {
			user_agent: session.user_agent().map(str::to_owned),
			proxy: session.proxy().and_then(ProxyConfig::endpoint),
			timestamp: chrono::Utc::now(),
		}));

		session
	}

	fn dispatch_error(&self, url: &Url, error: &dyn std::error::Error) {
		self.events.dispatch(ScraperEvent::Error(ErrorEvent {
			url: url.to_string(),
			error: error.to_string(),
			timestamp: chrono::Utc::now(),
		}));
	}
}

impl Default for GScraper {
	fn default() -> Self {
		Self::new()
	}
}

static SHARED_TRANSPORT: Lazy<Arc<dyn HttpTransport>> =
	Lazy::new(|| Arc::new(ReqwestTransport::new()));

fn shared_scraper() -> GScraper {
	GScraper {
		transport: SHARED_TRANSPORT.clone(),
		..GScraper::with_config(shared::snapshot())
	}
}

/// Proxy of the shared configuration.
pub fn proxy() -> ProxyConfig {
	shared::proxy()
}

pub fn set_proxy(proxy: ProxyConfig) {
	shared::set_proxy(proxy);
}

/// Proxy URI for `proxy`, or for the shared proxy when `None`.
pub fn proxy_uri(proxy: Option<&ProxyConfig>) -> Option<ProxyUri> {
	match proxy {
		Some(config) => build_proxy_uri(config),
		None => build_proxy_uri(&shared::proxy()),
	}
}

/// User-Agent of the shared configuration.
pub fn user_agent() -> Option<String> {
	shared::user_agent()
}

pub fn set_user_agent(agent: impl Into<String>) {
	shared::set_user_agent(agent);
}

/// Set the shared User-Agent by alias; an unknown alias unsets it.
pub fn set_user_agent_alias(alias: &str) {
	shared::set_user_agent_alias(alias);
}

/// [`GScraper::fetch`] using the shared configuration.
pub async fn fetch(uri: &str, options: &CallOptions) -> GScraperResult<FetchedContent> {
	shared_scraper().fetch(uri, options).await
}

/// [`GScraper::fetch_page`] using the shared configuration.
pub async fn fetch_page(uri: &str, options: &CallOptions) -> GScraperResult<Html> {
	shared_scraper().fetch_page(uri, options).await
}

/// [`GScraper::create_session`] using the shared configuration.
pub fn create_session(options: &CallOptions) -> Session {
	shared_scraper().create_session(options)
}

/// [`GScraper::create_session_with`] using the shared configuration.
pub fn create_session_with<F>(options: &CallOptions, configure: F) -> Session
where
	F: FnOnce(&mut Session),
{
	shared_scraper().create_session_with(options, configure)
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use bytes::Bytes;
	use http::HeaderMap;
	use std::sync::Mutex;

	#[derive(Default)]
	struct RecordingTransport {
		calls: Mutex<Vec<(Url, RequestContext)>>,
		fail: bool,
	}

	#[async_trait]
	impl HttpTransport for RecordingTransport {
		async fn fetch(
			&self,
			url: &Url,
			context: &RequestContext,
		) -> Result<FetchedContent, TransportError> {
			self.calls
				.lock()
				.unwrap()
				.push((url.clone(), context.clone()));
			if self.fail {
				return Err(TransportError::InvalidHeader("User-Agent".into()));
			}
			Ok(FetchedContent::new(
				200,
				url.clone(),
				HeaderMap::new(),
				Bytes::from_static(b"<html><title>ok</title></html>"),
			))
		}
	}

	#[derive(Default)]
	struct RecordingParser {
		calls: Mutex<Vec<Bytes>>,
	}

	impl PageParser for RecordingParser {
		fn parse(&self, content: &FetchedContent) -> Result<Html, ParseError> {
			self.calls.lock().unwrap().push(content.bytes());
			HtmlPageParser::new().parse(content)
		}
	}

	struct FailingParser;

	impl PageParser for FailingParser {
		fn parse(&self, _content: &FetchedContent) -> Result<Html, ParseError> {
			Err(ParseError::Document("broken".into()))
		}
	}

	fn registry() -> Arc<UserAgentRegistry> {
		Arc::new(UserAgentRegistry::new().with_alias("A", "UA-A"))
	}

	#[tokio::test]
	async fn fetch_page_calls_transport_then_parser_once() {
		let transport = Arc::new(RecordingTransport::default());
		let parser = Arc::new(RecordingParser::default());
		let scraper = GScraper::builder()
			.with_transport(transport.clone())
			.with_parser(parser.clone())
			.build()
			.unwrap();

		let page = scraper
			.fetch_page("http://example.com/", &CallOptions::new().with_user_agent("X"))
			.await
			.unwrap();

		let calls = transport.calls.lock().unwrap();
		assert_eq!(calls.len(), 1);
		let (url, context) = &calls[0];
		assert_eq!(url.as_str(), "http://example.com/");
		assert_eq!(context.user_agent(), Some("X"));
		assert!(!context.is_proxied());
		assert_eq!(context.headers().len(), 1);

		let parsed = parser.calls.lock().unwrap();
		assert_eq!(parsed.len(), 1);
		assert_eq!(parsed[0], Bytes::from_static(b"<html><title>ok</title></html>"));

		let selector = scraper::Selector::parse("title").unwrap();
		assert_eq!(page.select(&selector).count(), 1);
	}

	#[tokio::test]
	async fn fetch_uses_configured_defaults() {
		let transport = Arc::new(RecordingTransport::default());
		let scraper = GScraper::builder()
			.with_registry(registry())
			.with_user_agent("G")
			.with_proxy(
				ProxyConfig::new("proxy.example.com")
					.with_port(3128)
					.with_credentials("u", "p"),
			)
			.with_transport(transport.clone())
			.disable_logging()
			.build()
			.unwrap();

		scraper.fetch("http://example.com/", &CallOptions::new()).await.unwrap();
		scraper
			.fetch("http://example.com/", &CallOptions::new().with_user_agent_alias("A"))
			.await
			.unwrap();

		let calls = transport.calls.lock().unwrap();
		assert_eq!(calls[0].1.user_agent(), Some("G"));
		assert_eq!(
			calls[0].1.proxy().map(ProxyUri::as_str),
			Some("http://u:p@proxy.example.com:3128/")
		);
		assert_eq!(calls[1].1.user_agent(), Some("UA-A"));
	}

	#[tokio::test]
	async fn transport_errors_propagate_unchanged() {
		let transport = Arc::new(RecordingTransport {
			fail: true,
			..Default::default()
		});
		let parser = Arc::new(RecordingParser::default());
		let scraper = GScraper::builder()
			.with_transport(transport.clone())
			.with_parser(parser.clone())
			.build()
			.unwrap();

		let err = scraper
			.fetch_page("http://example.com/", &CallOptions::new())
			.await
			.unwrap_err();

		assert!(matches!(
			err,
			GScraperError::Transport(TransportError::InvalidHeader(ref name)) if name == "User-Agent"
		));
		assert_eq!(transport.calls.lock().unwrap().len(), 1);
		assert!(parser.calls.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn parse_errors_propagate_unchanged() {
		let scraper = GScraper::builder()
			.with_transport(Arc::new(RecordingTransport::default()))
			.with_parser(Arc::new(FailingParser))
			.build()
			.unwrap();

		let err = scraper
			.fetch_page("http://example.com/", &CallOptions::new())
			.await
			.unwrap_err();
		assert!(matches!(err, GScraperError::Parse(ParseError::Document(_))));
	}

	#[tokio::test]
	async fn invalid_uri_never_reaches_transport() {
		let transport = Arc::new(RecordingTransport::default());
		let scraper = GScraper::builder()
			.with_transport(transport.clone())
			.build()
			.unwrap();

		let err = scraper.fetch("not a url", &CallOptions::new()).await.unwrap_err();
		assert!(matches!(err, GScraperError::Url(_)));
		assert!(transport.calls.lock().unwrap().is_empty());
	}

	#[test]
	fn configure_hook_runs_once_after_defaults() {
		let scraper = GScraper::builder()
			.with_registry(registry())
			.with_user_agent("G")
			.build()
			.unwrap();
		let proxy = ProxyConfig::new("proxy.example.com")
			.with_port(3128)
			.with_credentials("u", "p");

		let mut seen = Vec::new();
		let session = scraper.create_session_with(
			&CallOptions::new().with_proxy(proxy.clone()),
			|session| {
				seen.push((
					session.user_agent().map(str::to_owned),
					session.proxy().cloned(),
				));
				session.insert_header("X-Hook", "1");
			},
		);

		assert_eq!(seen, vec![(Some("G".to_string()), Some(proxy.clone()))]);
		assert_eq!(session.proxy(), Some(&proxy));
		assert_eq!(session.headers().get("X-Hook").map(String::as_str), Some("1"));
	}

	#[test]
	fn builder_rejects_unknown_alias() {
		let result = GScraper::builder()
			.with_registry(registry())
			.with_user_agent_alias("missing")
			.build();
		assert!(matches!(
			result,
			Err(GScraperError::Config(ConfigError::UnknownAlias(ref alias))) if alias == "missing"
		));

		let scraper = GScraper::builder()
			.with_registry(registry())
			.with_user_agent_alias("A")
			.build()
			.unwrap();
		assert_eq!(scraper.config().user_agent(), Some("UA-A"));
	}

	#[test]
	fn proxy_uri_prefers_argument() {
		let scraper = GScraper::with_config(
			ScraperConfig::new().with_proxy(ProxyConfig::new("default.proxy")),
		);
		assert_eq!(
			scraper.proxy_uri(None).map(|uri| uri.to_string()).as_deref(),
			Some("http://:@default.proxy:8080/")
		);
		assert!(scraper.proxy_uri(Some(&ProxyConfig::default())).is_none());
	}
}

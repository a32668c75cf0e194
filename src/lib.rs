//! # gscraper-rs
//!
//! Request bootstrap layer for scraping toolkits: decides which proxy and
//! which User-Agent an outbound request uses, then hands the request to an
//! HTTP transport, an HTML parser, or a reusable session.
//!
//! ## Precedence
//!
//! - User-Agent: call alias > call literal > configured default > none
//! - Proxy: call proxy > configured proxy; only used when it has a host
//!
//! ## Example
//!
//! ```no_run
//! use gscraper_rs::{CallOptions, GScraper, ProxyConfig, ScraperConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScraperConfig::new()
//!         .with_user_agent("my-bot/1.0")
//!         .with_proxy(ProxyConfig::new("proxy.example.com").with_port(3128));
//!     let scraper = GScraper::with_config(config);
//!
//!     let page = scraper
//!         .fetch_page("https://example.com/", &CallOptions::new().with_user_agent_alias("Linux Firefox"))
//!         .await?;
//!     println!("{}", page.root_element().html());
//!
//!     let session = scraper.create_session_with(&CallOptions::new(), |session| {
//!         session.insert_header("Accept-Language", "en");
//!     });
//!     let content = session.get("https://example.com/").await?;
//!     println!("{}", content.status());
//!     Ok(())
//! }
//! ```

mod gscraper;

pub mod config;
pub mod events;
pub mod parser;
pub mod proxy;
pub mod request;
pub mod session;
pub mod transport;
pub mod user_agents;

pub use crate::gscraper::{
    GScraper,
    GScraperBuilder,
    GScraperError,
    GScraperResult,
    create_session,
    create_session_with,
    fetch,
    fetch_page,
    proxy,
    proxy_uri,
    set_proxy,
    set_user_agent,
    set_user_agent_alias,
    user_agent,
};

pub use crate::config::{ConfigError, ScraperConfig};

pub use crate::events::{
    ErrorEvent,
    EventDispatcher,
    EventHandler,
    LoggingHandler,
    PostResponseEvent,
    PreRequestEvent,
    ScraperEvent,
    SessionCreatedEvent,
};

pub use crate::parser::{HtmlPageParser, PageParser, ParseError};

pub use crate::proxy::{COMMON_PROXY_PORT, ProxyConfig, ProxyUri};

pub use crate::request::{CallOptions, RequestContext, USER_AGENT_HEADER, resolve};

pub use crate::session::Session;

pub use crate::transport::{FetchedContent, HttpTransport, ReqwestTransport, TransportError};

pub use crate::user_agents::{
    DEFAULT_ALIAS,
    DEFAULT_USER_AGENT,
    UserAgentRegistry,
    user_agent_aliases,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

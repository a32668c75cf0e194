//! Reusable, pre-configured HTTP sessions.
//!
//! A [`Session`] keeps its User-Agent, proxy and extra headers and builds a
//! cookie-enabled `reqwest::Client` on first use. Any setter drops the cached
//! client so the next request picks up the change.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::redirect::Policy;
use scraper::Html;
use tokio::sync::Mutex;
use url::Url;

use crate::config::{ConfigError, ScraperConfig};
use crate::gscraper::GScraperResult;
use crate::parser::PageParser;
use crate::proxy::{ProxyConfig, ProxyUri, proxy_uri};
use crate::request::{CallOptions, UserAgentChoice, effective_proxy, resolve_user_agent};
use crate::transport::reqwest_client::{convert_headers, reqwest_proxy};
use crate::transport::{FetchedContent, TransportError};
use crate::user_agents::{DEFAULT_USER_AGENT, UserAgentRegistry};

const DEFAULT_REDIRECT_LIMIT: usize = 10;

pub struct Session {
    user_agent: Option<String>,
    user_agent_alias: Option<String>,
    proxy: Option<ProxyConfig>,
    headers: HashMap<String, String>,
    redirect_limit: usize,
    registry: Arc<UserAgentRegistry>,
    parser: Arc<dyn PageParser>,
    client: Mutex<Option<reqwest::Client>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_agent", &self.user_agent)
            .field("user_agent_alias", &self.user_agent_alias)
            .field("proxy", &self.proxy.as_ref().and_then(ProxyConfig::endpoint))
            .field("headers", &self.headers)
            .field("redirect_limit", &self.redirect_limit)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(registry: Arc<UserAgentRegistry>, parser: Arc<dyn PageParser>) -> Self {
        Self {
            user_agent: None,
            user_agent_alias: None,
            proxy: None,
            headers: HashMap::new(),
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
            registry,
            parser,
            client: Mutex::new(None),
        }
    }

    /// Session configured from call options, falling back to `config`.
    pub(crate) fn from_options(
        options: &CallOptions,
        config: &ScraperConfig,
        parser: Arc<dyn PageParser>,
    ) -> Self {
        let mut session = Session::new(config.registry_handle(), parser);

        match resolve_user_agent(options, config) {
            UserAgentChoice::Alias {
                alias,
                agent: Some(agent),
            } => {
                session.user_agent_alias = Some(alias.to_string());
                session.user_agent = Some(agent.to_string());
            }
            UserAgentChoice::Literal(agent) => session.set_user_agent(agent),
            UserAgentChoice::Alias { agent: None, .. } | UserAgentChoice::Unset => {}
        }

        let proxy = effective_proxy(options, config);
        if proxy.is_enabled() {
            session.set_proxy(proxy.clone());
        }

        session
    }

    /// Explicitly configured User-Agent.
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Alias the current User-Agent was set from, if any.
    pub fn user_agent_alias(&self) -> Option<&str> {
        self.user_agent_alias.as_deref()
    }

    /// User-Agent sent on the wire.
    pub fn effective_user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn set_user_agent(&mut self, agent: impl Into<String>) {
        self.user_agent = Some(agent.into());
        self.user_agent_alias = None;
        self.invalidate();
    }

    pub fn set_user_agent_alias(&mut self, alias: &str) -> Result<(), ConfigError> {
        let agent = self
            .registry
            .lookup(alias)
            .ok_or_else(|| ConfigError::UnknownAlias(alias.to_string()))?;
        self.user_agent = Some(agent.to_string());
        self.user_agent_alias = Some(alias.to_string());
        self.invalidate();
        Ok(())
    }

    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    pub fn proxy_uri(&self) -> Option<ProxyUri> {
        self.proxy.as_ref().and_then(proxy_uri)
    }

    /// Route through `proxy`. A config without a host removes the proxy.
    pub fn set_proxy(&mut self, proxy: ProxyConfig) {
        self.proxy = proxy.is_enabled().then_some(proxy);
        self.invalidate();
    }

    pub fn clear_proxy(&mut self) {
        self.proxy = None;
        self.invalidate();
    }

    /// Extra headers sent with every request.
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
        self.invalidate();
    }

    pub fn redirect_limit(&self) -> usize {
        self.redirect_limit
    }

    pub fn set_redirect_limit(&mut self, limit: usize) {
        self.redirect_limit = limit;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        *self.client.get_mut() = None;
    }

    /// Underlying client, built on first use.
    pub async fn client(&self) -> Result<reqwest::Client, TransportError> {
        let mut guard = self.client.lock().await;
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(self.effective_user_agent())
            .redirect(Policy::limited(self.redirect_limit))
            .default_headers(convert_headers(&self.headers)?);

        builder = match self.proxy.as_ref() {
            Some(proxy) => builder.proxy(reqwest_proxy(proxy)?),
            None => builder.no_proxy(),
        };

        let client = builder.build()?;
        *guard = Some(client.clone());
        Ok(client)
    }

    /// GET `url` with the session's configuration and cookies.
    pub async fn get(&self, url: &str) -> GScraperResult<FetchedContent> {
        let url = Url::parse(url)?;
        let client = self.client().await?;

        let response = client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(TransportError::from)?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(TransportError::from)?;

        Ok(FetchedContent::new(status, final_url, headers, body))
    }

    /// GET `url` and parse the body as HTML.
    pub async fn get_page(&self, url: &str) -> GScraperResult<Html> {
        let content = self.get(url).await?;
        Ok(self.parser.parse(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::HtmlPageParser;

    fn config() -> ScraperConfig {
        ScraperConfig::new()
            .with_registry(Arc::new(UserAgentRegistry::new().with_alias("A", "UA-A")))
    }

    fn session(options: &CallOptions, config: &ScraperConfig) -> Session {
        Session::from_options(options, config, Arc::new(HtmlPageParser::new()))
    }

    #[test]
    fn proxy_fields_match_options() {
        let proxy = ProxyConfig::new("proxy.example.com")
            .with_port(3128)
            .with_credentials("u", "p");
        let session = session(&CallOptions::new().with_proxy(proxy.clone()), &config());

        assert_eq!(session.proxy(), Some(&proxy));
        assert_eq!(
            session.proxy_uri().map(|uri| uri.to_string()).as_deref(),
            Some("http://u:p@proxy.example.com:3128/")
        );
    }

    #[test]
    fn hostless_proxy_leaves_session_direct() {
        let config = config().with_proxy(ProxyConfig::new("default.proxy"));
        let session = session(&CallOptions::new().with_proxy(ProxyConfig::default()), &config);
        assert!(session.proxy().is_none());
    }

    #[test]
    fn default_proxy_applies_without_override() {
        let config = config().with_proxy(ProxyConfig::new("default.proxy").with_port(9000));
        let session = session(&CallOptions::new(), &config);
        assert_eq!(
            session.proxy().and_then(ProxyConfig::endpoint).as_deref(),
            Some("default.proxy:9000")
        );
    }

    #[test]
    fn user_agent_precedence_matches_requests() {
        let config = config().with_user_agent("G");

        let by_alias = session(
            &CallOptions::new().with_user_agent_alias("A").with_user_agent("X"),
            &config,
        );
        assert_eq!(by_alias.user_agent(), Some("UA-A"));
        assert_eq!(by_alias.user_agent_alias(), Some("A"));

        let by_literal = session(&CallOptions::new().with_user_agent("X"), &config);
        assert_eq!(by_literal.user_agent(), Some("X"));
        assert!(by_literal.user_agent_alias().is_none());

        let by_default = session(&CallOptions::new(), &config);
        assert_eq!(by_default.user_agent(), Some("G"));
    }

    #[test]
    fn falls_back_to_crate_user_agent() {
        let plain = session(&CallOptions::new(), &config());
        assert!(plain.user_agent().is_none());
        assert_eq!(plain.effective_user_agent(), DEFAULT_USER_AGENT);

        let unknown = session(&CallOptions::new().with_user_agent_alias("missing"), &config());
        assert_eq!(unknown.effective_user_agent(), DEFAULT_USER_AGENT);
    }

    #[test]
    fn strict_alias_setter() {
        let mut session = session(&CallOptions::new(), &config());
        assert_eq!(
            session.set_user_agent_alias("missing"),
            Err(ConfigError::UnknownAlias("missing".into()))
        );
        session.set_user_agent_alias("A").unwrap();
        assert_eq!(session.user_agent(), Some("UA-A"));

        session.set_user_agent("manual");
        assert!(session.user_agent_alias().is_none());
    }

    #[tokio::test]
    async fn setters_drop_cached_client() {
        let mut session = session(&CallOptions::new(), &config());
        session.client().await.unwrap();
        assert!(session.client.lock().await.is_some());

        session.insert_header("Accept-Language", "en");
        assert!(session.client.lock().await.is_none());

        session.client().await.unwrap();
        session.set_redirect_limit(0);
        assert!(session.client.lock().await.is_none());
    }

    #[tokio::test]
    async fn invalid_header_surfaces_on_build() {
        let mut session = session(&CallOptions::new(), &config());
        session.insert_header("X-Bad", "line\nbreak");
        assert!(matches!(
            session.client().await,
            Err(TransportError::InvalidHeader(name)) if name == "X-Bad"
        ));
    }
}

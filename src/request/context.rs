//! Resolution of per-call options against a [`ScraperConfig`].
//!
//! User-Agent precedence, first match wins:
//! 1. `user_agent_alias` from the call options (looked up in the registry)
//! 2. `user_agent` from the call options
//! 3. the configured default User-Agent
//!
//! The proxy comes from the call options when given, otherwise from the
//! configuration, and is only used when it has a host.

use std::collections::HashMap;

use super::CallOptions;
use crate::config::ScraperConfig;
use crate::proxy::{ProxyConfig, ProxyUri, proxy_uri};

pub const USER_AGENT_HEADER: &str = "User-Agent";

/// Headers and proxy resolved for exactly one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    headers: HashMap<String, String>,
    proxy: Option<ProxyUri>,
    proxy_config: Option<ProxyConfig>,
}

impl RequestContext {
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT_HEADER).map(String::as_str)
    }

    pub fn proxy(&self) -> Option<&ProxyUri> {
        self.proxy.as_ref()
    }

    /// Host, port and credentials of the proxy behind [`RequestContext::proxy`].
    pub fn proxy_config(&self) -> Option<&ProxyConfig> {
        self.proxy_config.as_ref()
    }

    pub fn is_proxied(&self) -> bool {
        self.proxy.is_some()
    }
}

/// Which rule supplied the User-Agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UserAgentChoice<'a> {
    /// Alias requested by the call; `agent` is `None` when the alias is unknown.
    Alias { alias: &'a str, agent: Option<&'a str> },
    Literal(&'a str),
    Unset,
}

impl<'a> UserAgentChoice<'a> {
    pub(crate) fn agent(&self) -> Option<&'a str> {
        match *self {
            UserAgentChoice::Alias { agent, .. } => agent,
            UserAgentChoice::Literal(agent) => Some(agent),
            UserAgentChoice::Unset => None,
        }
    }
}

pub(crate) fn resolve_user_agent<'a>(
    options: &'a CallOptions,
    config: &'a ScraperConfig,
) -> UserAgentChoice<'a> {
    if let Some(alias) = options.user_agent_alias.as_deref() {
        let agent = config.registry().lookup(alias);
        if agent.is_none() {
            log::warn!("unknown user-agent alias '{alias}', no user-agent will be sent");
        }
        return UserAgentChoice::Alias { alias, agent };
    }

    if let Some(agent) = options.user_agent.as_deref() {
        return UserAgentChoice::Literal(agent);
    }

    match config.user_agent() {
        Some(agent) => UserAgentChoice::Literal(agent),
        None => UserAgentChoice::Unset,
    }
}

pub(crate) fn effective_proxy<'a>(
    options: &'a CallOptions,
    config: &'a ScraperConfig,
) -> &'a ProxyConfig {
    options.proxy.as_ref().unwrap_or_else(|| config.proxy())
}

/// Combine call options with the configuration into a [`RequestContext`].
pub fn resolve(options: &CallOptions, config: &ScraperConfig) -> RequestContext {
    let mut headers = HashMap::new();
    if let Some(agent) = resolve_user_agent(options, config).agent() {
        headers.insert(USER_AGENT_HEADER.to_string(), agent.to_string());
    }

    let effective = effective_proxy(options, config);
    let proxy = proxy_uri(effective);
    let proxy_config = proxy.is_some().then(|| effective.clone());

    RequestContext {
        headers,
        proxy,
        proxy_config,
    }
}

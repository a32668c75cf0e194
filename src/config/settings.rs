use std::sync::Arc;

use thiserror::Error;

use crate::proxy::{ProxyConfig, ProxyUri, proxy_uri};
use crate::user_agents::UserAgentRegistry;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown user-agent alias '{0}'")]
    UnknownAlias(String),
}

/// Default proxy and User-Agent applied when a call does not override them.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    proxy: ProxyConfig,
    user_agent: Option<String>,
    registry: Arc<UserAgentRegistry>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            proxy: ProxyConfig::default(),
            user_agent: None,
            registry: UserAgentRegistry::builtin(),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the alias registry used for alias lookups.
    pub fn with_registry(mut self, registry: Arc<UserAgentRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn registry(&self) -> &UserAgentRegistry {
        &self.registry
    }

    pub(crate) fn registry_handle(&self) -> Arc<UserAgentRegistry> {
        self.registry.clone()
    }

    pub fn proxy(&self) -> &ProxyConfig {
        &self.proxy
    }

    pub fn set_proxy(&mut self, proxy: ProxyConfig) {
        self.proxy = proxy;
    }

    /// URI of the default proxy, if one is enabled.
    pub fn proxy_uri(&self) -> Option<ProxyUri> {
        proxy_uri(&self.proxy)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn set_user_agent(&mut self, agent: impl Into<String>) {
        self.user_agent = Some(agent.into());
    }

    pub fn clear_user_agent(&mut self) {
        self.user_agent = None;
    }

    /// Set the User-Agent from an alias. An unknown alias leaves the
    /// User-Agent unset.
    pub fn set_user_agent_alias(&mut self, alias: &str) {
        self.user_agent = self.registry.lookup(alias).map(str::to_owned);
        if self.user_agent.is_none() {
            log::warn!("unknown user-agent alias '{alias}', user-agent left unset");
        }
    }

    /// Like [`ScraperConfig::set_user_agent_alias`] but rejects unknown
    /// aliases and keeps the current value.
    pub fn try_set_user_agent_alias(&mut self, alias: &str) -> Result<(), ConfigError> {
        let agent = self
            .registry
            .lookup(alias)
            .ok_or_else(|| ConfigError::UnknownAlias(alias.to_string()))?;
        self.user_agent = Some(agent.to_string());
        Ok(())
    }
}

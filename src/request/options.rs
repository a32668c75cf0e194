use serde::{Deserialize, Serialize};

use crate::proxy::ProxyConfig;

/// Overrides for a single fetch or session creation.
///
/// Every field is optional; unset fields fall back to the
/// [`ScraperConfig`](crate::ScraperConfig) in use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallOptions {
    pub user_agent_alias: Option<String>,
    pub user_agent: Option<String>,
    pub proxy: Option<ProxyConfig>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent_alias(mut self, alias: impl Into<String>) -> Self {
        self.user_agent_alias = Some(alias.into());
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

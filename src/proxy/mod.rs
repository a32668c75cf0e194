//! Proxy descriptors and URI construction.
//!
//! A [`ProxyConfig`] without a host means "no proxy". [`proxy_uri`] turns an
//! enabled config into the HTTP URI handed to the transport.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Common proxy port.
pub const COMMON_PROXY_PORT: u16 = 8080;

fn default_port() -> u16 {
    COMMON_PROXY_PORT
}

/// Proxy host, port and optional credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: COMMON_PROXY_PORT,
            user: None,
            password: None,
        }
    }
}

impl ProxyConfig {
    /// Proxy on `host` using [`COMMON_PROXY_PORT`].
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// `true` when a non-empty host is configured.
    pub fn is_enabled(&self) -> bool {
        self.host.as_deref().is_some_and(|host| !host.is_empty())
    }

    /// `host:port`, without credentials. `None` when disabled.
    ///
    /// IPv6 hosts are bracketed (`[::1]:8080`).
    pub fn endpoint(&self) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        self.host.as_deref().map(|host| {
            if host.contains(':') && !host.starts_with('[') {
                format!("[{host}]:{}", self.port)
            } else {
                format!("{host}:{}", self.port)
            }
        })
    }

    /// `true` when a user or a password is configured.
    pub fn has_credentials(&self) -> bool {
        self.user.is_some() || self.password.is_some()
    }
}

/// HTTP URI of a proxy, kept exactly as built from its [`ProxyConfig`].
///
/// The host is not validated; use [`ProxyUri::to_url`] to parse it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyUri(String);

impl ProxyUri {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.0)
    }
}

impl fmt::Display for ProxyUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProxyUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds `http://{user}:{password}@{host}:{port}/` for an enabled config.
///
/// Missing credentials render as empty strings, so the userinfo separator
/// is always present.
pub fn proxy_uri(config: &ProxyConfig) -> Option<ProxyUri> {
    if !config.is_enabled() {
        return None;
    }
    let host = config.host.as_deref()?;
    let user = config.user.as_deref().unwrap_or_default();
    let password = config.password.as_deref().unwrap_or_default();

    Some(ProxyUri(format!(
        "http://{user}:{password}@{host}:{}/",
        config.port
    )))
}

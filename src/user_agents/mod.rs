//! User-Agent alias registry.
//!
//! Maps short, human readable alias names (`"Windows IE 6"`, `"Linux Firefox"`)
//! to literal User-Agent strings. The built-in table is created lazily on
//! first access and shared by every configuration that does not bring its
//! own registry.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Alias used as the process-wide default User-Agent.
pub const DEFAULT_ALIAS: &str = "Windows IE 6";

/// User-Agent sent by sessions when nothing else has been configured.
pub const DEFAULT_USER_AGENT: &str = concat!("gscraper-rs/", env!("CARGO_PKG_VERSION"));

const BUILTIN_ALIASES: &[(&str, &str)] = &[
    (
        "Linux Firefox",
        "Mozilla/5.0 (X11; Linux x86_64; rv:43.0) Gecko/20100101 Firefox/43.0",
    ),
    (
        "Linux Konqueror",
        "Mozilla/5.0 (compatible; Konqueror/3; Linux)",
    ),
    (
        "Linux Mozilla",
        "Mozilla/5.0 (X11; U; Linux i686; en-US; rv:1.4) Gecko/20030624",
    ),
    (
        "Mac Firefox",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.11; rv:43.0) Gecko/20100101 Firefox/43.0",
    ),
    (
        "Mac Mozilla",
        "Mozilla/5.0 (Macintosh; U; PPC Mac OS X Mach-O; en-US; rv:1.4a) Gecko/20030401",
    ),
    (
        "Mac Safari 4",
        "Mozilla/5.0 (Macintosh; U; Intel Mac OS X 10_6_2; de-at) AppleWebKit/531.21.8 (KHTML, like Gecko) Version/4.0.4 Safari/531.21.10",
    ),
    (
        "Mac Safari",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_1) AppleWebKit/601.3.9 (KHTML, like Gecko) Version/9.0.2 Safari/601.3.9",
    ),
    (
        "Windows Chrome",
        "Mozilla/5.0 (Windows NT 6.3; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/43.0.2357.125 Safari/537.36",
    ),
    (
        "Windows Edge",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/51.0.2704.79 Safari/537.36 Edge/14.14393",
    ),
    (
        "Windows Firefox",
        "Mozilla/5.0 (Windows NT 6.3; WOW64; rv:43.0) Gecko/20100101 Firefox/43.0",
    ),
    (
        "Windows IE 6",
        "Mozilla/4.0 (compatible; MSIE 6.0; Windows NT 5.1; SV1)",
    ),
    (
        "Windows IE 7",
        "Mozilla/4.0 (compatible; MSIE 7.0; Windows NT 5.1; SV1; .NET CLR 1.1.4322; .NET CLR 2.0.50727)",
    ),
    (
        "Windows IE 8",
        "Mozilla/5.0 (compatible; MSIE 8.0; Windows NT 6.1; Trident/4.0; SLCC2; .NET CLR 2.0.50727; .NET CLR 3.5.30729; .NET CLR 3.0.30729; Media Center PC 6.0)",
    ),
    (
        "Windows IE 9",
        "Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; Trident/5.0)",
    ),
    (
        "Windows IE 10",
        "Mozilla/5.0 (compatible; MSIE 10.0; Windows NT 6.2; Trident/6.0)",
    ),
    (
        "Windows IE 11",
        "Mozilla/5.0 (Windows NT 6.3; WOW64; Trident/7.0; rv:11.0) like Gecko",
    ),
    (
        "Windows Mozilla",
        "Mozilla/5.0 (Windows; U; Windows NT 5.0; en-US; rv:1.4b) Gecko/20030516 Mozilla Firebird/0.6",
    ),
    (
        "iPhone",
        "Mozilla/5.0 (iPhone; CPU iPhone OS 9_3 like Mac OS X) AppleWebKit/601.1.46 (KHTML, like Gecko) Version/9.0 Mobile/13E188a Safari/601.1",
    ),
    (
        "iPad",
        "Mozilla/5.0 (iPad; CPU OS 9_3 like Mac OS X) AppleWebKit/601.1.46 (KHTML, like Gecko) Version/9.0 Mobile/13E188a Safari/601.1",
    ),
    (
        "Android",
        "Mozilla/5.0 (Linux; Android 5.1.1; Nexus 7 Build/LMY47V) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/47.0.2526.76 Safari/537.36",
    ),
];

static BUILTIN_REGISTRY: Lazy<Arc<UserAgentRegistry>> = Lazy::new(|| {
    let mut registry = UserAgentRegistry::new();
    for (alias, agent) in BUILTIN_ALIASES {
        registry.insert(*alias, *agent);
    }
    Arc::new(registry)
});

/// Read-only lookup table from alias names to User-Agent strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAgentRegistry {
    aliases: HashMap<String, String>,
}

impl UserAgentRegistry {
    /// Empty registry, mostly useful for tests and custom tables.
    pub fn new() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Shared built-in alias table.
    pub fn builtin() -> Arc<UserAgentRegistry> {
        BUILTIN_REGISTRY.clone()
    }

    pub fn with_alias(mut self, alias: impl Into<String>, agent: impl Into<String>) -> Self {
        self.insert(alias, agent);
        self
    }

    pub fn insert(&mut self, alias: impl Into<String>, agent: impl Into<String>) {
        self.aliases.insert(alias.into(), agent.into());
    }

    /// Exact-match lookup of an alias.
    pub fn lookup(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    /// The whole alias table.
    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    /// Alias names in lexical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.aliases.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Alias table of the built-in registry.
pub fn user_agent_aliases() -> &'static HashMap<String, String> {
    BUILTIN_REGISTRY.aliases()
}

//! Process-wide default configuration.
//!
//! Initialised lazily with the default proxy and the [`DEFAULT_ALIAS`]
//! User-Agent. Every access goes through an `RwLock`; a poisoned lock is
//! recovered since the guarded value is always left consistent.

use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::ScraperConfig;
use crate::proxy::ProxyConfig;
use crate::user_agents::DEFAULT_ALIAS;

static SHARED_CONFIG: Lazy<RwLock<ScraperConfig>> = Lazy::new(|| RwLock::new(initial_config()));

fn initial_config() -> ScraperConfig {
    let mut config = ScraperConfig::default();
    config.set_user_agent_alias(DEFAULT_ALIAS);
    config
}

fn read() -> RwLockReadGuard<'static, ScraperConfig> {
    SHARED_CONFIG.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, ScraperConfig> {
    SHARED_CONFIG.write().unwrap_or_else(PoisonError::into_inner)
}

/// Copy of the current shared configuration.
pub fn snapshot() -> ScraperConfig {
    read().clone()
}

/// Mutate the shared configuration under the write lock.
pub fn update<F, R>(f: F) -> R
where
    F: FnOnce(&mut ScraperConfig) -> R,
{
    f(&mut *write())
}

/// Restore the initial shared configuration.
pub fn reset() {
    *write() = initial_config();
}

pub fn proxy() -> ProxyConfig {
    read().proxy().clone()
}

pub fn set_proxy(proxy: ProxyConfig) {
    write().set_proxy(proxy);
}

pub fn user_agent() -> Option<String> {
    read().user_agent().map(str::to_owned)
}

pub fn set_user_agent(agent: impl Into<String>) {
    write().set_user_agent(agent);
}

pub fn clear_user_agent() {
    write().clear_user_agent();
}

pub fn set_user_agent_alias(alias: &str) {
    write().set_user_agent_alias(alias);
}

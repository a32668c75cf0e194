//! Event hooks around fetches and session creation.
//!
//! Events never carry proxy credentials; proxies are reported as
//! `host:port` endpoints.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Emitted right before the transport is called.
#[derive(Debug, Clone)]
pub struct PreRequestEvent {
    pub url: Url,
    pub user_agent: Option<String>,
    pub proxy: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Emitted after the transport returned content.
#[derive(Debug, Clone)]
pub struct PostResponseEvent {
    pub url: Url,
    pub status: u16,
    pub bytes: usize,
    pub latency: Duration,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionCreatedEvent {
    pub user_agent: Option<String>,
    pub proxy: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub url: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum ScraperEvent {
    PreRequest(PreRequestEvent),
    PostResponse(PostResponseEvent),
    SessionCreated(SessionCreatedEvent),
    Error(ErrorEvent),
}

/// Trait implemented by event handlers.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &ScraperEvent);
}

/// Dispatcher that broadcasts events to registered handlers.
#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn dispatch(&self, event: ScraperEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

/// Logs events using the `log` crate.
#[derive(Debug)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle(&self, event: &ScraperEvent) {
        match event {
            ScraperEvent::PreRequest(pre) => {
                log::debug!(
                    "-> GET {} (user-agent: {}, proxy: {})",
                    pre.url,
                    pre.user_agent.as_deref().unwrap_or("<none>"),
                    pre.proxy.as_deref().unwrap_or("direct")
                );
            }
            ScraperEvent::PostResponse(post) => {
                log::debug!(
                    "<- {} -> {} ({} bytes, {:.2}s)",
                    post.url,
                    post.status,
                    post.bytes,
                    post.latency.as_secs_f64()
                );
            }
            ScraperEvent::SessionCreated(session) => {
                log::info!(
                    "session created (user-agent: {}, proxy: {})",
                    session.user_agent.as_deref().unwrap_or("<default>"),
                    session.proxy.as_deref().unwrap_or("direct")
                );
            }
            ScraperEvent::Error(error) => {
                log::warn!("fetch {} failed -> {}", error.url, error.error);
            }
        }
    }
}

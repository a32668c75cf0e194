//! Scraper configuration.
//!
//! Provides:
//! - [`ScraperConfig`], an explicit value holding the default proxy and
//!   User-Agent that requests and sessions fall back to
//! - [`shared`], a lock-guarded process-wide default for callers that use
//!   the free-function API

mod settings;
pub mod shared;

pub use settings::{ConfigError, ScraperConfig};

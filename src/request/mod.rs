//! Per-call options and request context resolution.

pub mod context;
pub mod options;

pub use context::{RequestContext, USER_AGENT_HEADER, resolve};
pub use options::CallOptions;
pub(crate) use context::{UserAgentChoice, effective_proxy, resolve_user_agent};

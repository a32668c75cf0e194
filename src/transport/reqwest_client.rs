//! Reqwest-based implementation of the [`HttpTransport`] trait.
//!
//! Keeps one `reqwest::Client` per proxy so repeated fetches through the
//! same proxy reuse connections. At most [`MAX_POOLED_CLIENTS`] clients are
//! kept; the oldest is dropped first.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio::sync::Mutex;
use url::Url;

use super::{FetchedContent, HttpTransport, TransportError};
use crate::proxy::ProxyConfig;
use crate::request::RequestContext;

/// Default number of clients kept by a [`ReqwestTransport`].
pub const MAX_POOLED_CLIENTS: usize = 32;

type PoolKey = Option<ProxyConfig>;

struct ClientPool {
    clients: HashMap<PoolKey, reqwest::Client>,
    order: VecDeque<PoolKey>,
    capacity: usize,
}

impl ClientPool {
    fn new(capacity: usize) -> Self {
        Self {
            clients: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&self, key: &PoolKey) -> Option<&reqwest::Client> {
        self.clients.get(key)
    }

    fn insert(&mut self, key: PoolKey, client: reqwest::Client) {
        while self.clients.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.clients.remove(&oldest);
        }
        if self.clients.insert(key.clone(), client).is_none() {
            self.order.push_back(key);
        }
    }

    fn len(&self) -> usize {
        self.clients.len()
    }
}

/// Reqwest-backed transport used for one-off fetches.
pub struct ReqwestTransport {
    pool: Mutex<ClientPool>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_capacity(MAX_POOLED_CLIENTS)
    }

    /// Keep at most `capacity` clients (minimum one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: Mutex::new(ClientPool::new(capacity)),
        }
    }

    /// Use `client` for every request that is not proxied.
    ///
    /// Proxied requests still get their own client since reqwest binds the
    /// proxy at build time.
    pub fn from_client(client: reqwest::Client) -> Self {
        let mut pool = ClientPool::new(MAX_POOLED_CLIENTS);
        pool.insert(None, client);
        Self {
            pool: Mutex::new(pool),
        }
    }

    async fn client(&self, proxy: Option<&ProxyConfig>) -> Result<reqwest::Client, TransportError> {
        let mut pool = self.pool.lock().await;
        let key = proxy.cloned();
        if let Some(client) = pool.get(&key) {
            return Ok(client.clone());
        }

        let builder = match proxy {
            Some(config) => reqwest::Client::builder().proxy(reqwest_proxy(config)?),
            None => reqwest::Client::builder().no_proxy(),
        };

        let client = builder.build()?;
        pool.insert(key, client.clone());
        Ok(client)
    }
}

/// Wire-level proxy for `config`.
///
/// Credentials go through `basic_auth` rather than the URI userinfo, so
/// reserved characters in user or password are sent unaltered.
pub(crate) fn reqwest_proxy(config: &ProxyConfig) -> Result<reqwest::Proxy, TransportError> {
    let endpoint = config.endpoint().unwrap_or_default();
    let uri = format!("http://{endpoint}");
    let mut proxy = reqwest::Proxy::all(uri.as_str())
        .map_err(|source| TransportError::InvalidProxy { uri, source })?;

    if config.has_credentials() {
        proxy = proxy.basic_auth(
            config.user.as_deref().unwrap_or_default(),
            config.password.as_deref().unwrap_or_default(),
        );
    }
    Ok(proxy)
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn fetch(
        &self,
        url: &Url,
        context: &RequestContext,
    ) -> Result<FetchedContent, TransportError> {
        let client = self.client(context.proxy_config()).await?;
        let headers = convert_headers(context.headers())?;

        let response = client
            .get(url.clone())
            .headers(headers)
            .send()
            .await?
            .error_for_status()?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(FetchedContent::new(status, final_url, headers, body))
    }
}

pub(crate) fn convert_headers(
    headers: &HashMap<String, String>,
) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

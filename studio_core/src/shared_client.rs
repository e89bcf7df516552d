//! Shared reqwest clients.
//!
//! One pooled client backs every transport built with
//! [`ReqwestTransport::shared`](crate::http::ReqwestTransport::shared), so
//! short API calls and long-lived event streams reuse connections. Neither
//! client sets an overall request timeout: an event stream stays open for
//! the lifetime of a session.

use crate::config::ClientConfig;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Default pool size for idle connections per host.
pub const DEFAULT_POOL_SIZE: usize = 32;

/// Shared pooled HTTP client.
pub static SHARED_CLIENT: Lazy<Client> = Lazy::new(|| build_client(&ClientConfig::default()));

/// Build a pooled client from a [`ClientConfig`].
pub fn build_client(config: &ClientConfig) -> Client {
    try_build_client(config).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "falling back to default reqwest client");
        Client::new()
    })
}

/// Build a pooled client, surfacing builder failures.
pub fn try_build_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(DEFAULT_POOL_SIZE)
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(config.connect_timeout())
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true);
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

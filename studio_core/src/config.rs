//! Client configuration and the credential/address source.
//!
//! Settings are read on every request and never written by the transport.
//! Nothing here is persisted; `from_env` is the only loader.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base URL used when `STUDIO_BASE_URL` is unset or blank.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4020";

pub const ENV_API_TOKEN: &str = "STUDIO_API_TOKEN";
pub const ENV_BASE_URL: &str = "STUDIO_BASE_URL";
pub const ENV_FALLBACK_URL: &str = "STUDIO_FALLBACK_URL";

/// Where the transport reads its credential and addresses from.
///
/// Implementations must be cheap to query; the client calls these once per
/// request so that updated values apply to the next call.
pub trait CredentialSource: Send + Sync {
    /// Bearer token, if one is held. Empty strings are treated as absent.
    fn token(&self) -> Option<String>;

    /// Primary API base URL.
    fn base_url(&self) -> String;

    /// Alternate base URL tried once when the primary is unreachable.
    fn fallback_base_url(&self) -> Option<String> {
        None
    }
}

/// Plain snapshot of the client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    pub token: Option<String>,
    pub base_url: String,
    pub fallback_base_url: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            fallback_base_url: None,
        }
    }
}

impl ClientSettings {
    /// Load from `STUDIO_API_TOKEN`, `STUDIO_BASE_URL` and `STUDIO_FALLBACK_URL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            token: read(ENV_API_TOKEN),
            base_url: read(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            fallback_base_url: read(ENV_FALLBACK_URL),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_fallback_base_url(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_base_url = Some(fallback.into());
        self
    }
}

/// In-memory, mutable settings shared between the UI layer and the client.
#[derive(Debug, Default)]
pub struct Settings {
    inner: RwLock<ClientSettings>,
}

impl Settings {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    pub fn from_env() -> Self {
        Self::new(ClientSettings::from_env())
    }

    pub fn set_token(&self, token: Option<String>) {
        self.inner.write().token = token.filter(|t| !t.is_empty());
    }

    pub fn set_base_url(&self, base_url: impl Into<String>) {
        self.inner.write().base_url = base_url.into();
    }

    pub fn set_fallback_base_url(&self, fallback: Option<String>) {
        self.inner.write().fallback_base_url = fallback;
    }

    /// Forget the credential. Addresses are kept.
    pub fn clear(&self) {
        self.inner.write().token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn snapshot(&self) -> ClientSettings {
        self.inner.read().clone()
    }
}

impl CredentialSource for Settings {
    fn token(&self) -> Option<String> {
        self.inner.read().token.clone().filter(|t| !t.is_empty())
    }

    fn base_url(&self) -> String {
        self.inner.read().base_url.clone()
    }

    fn fallback_base_url(&self) -> Option<String> {
        self.inner.read().fallback_base_url.clone()
    }
}

impl CredentialSource for ClientSettings {
    fn token(&self) -> Option<String> {
        self.token.clone().filter(|t| !t.is_empty())
    }

    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    fn fallback_base_url(&self) -> Option<String> {
        self.fallback_base_url.clone()
    }
}

/// Tuning for the reqwest-backed transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub user_agent: String,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Whole-request timeout in milliseconds; `None` leaves it unbounded.
    pub request_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("studio-core/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_ms: 10_000,
            request_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let settings = ClientSettings::from_lookup(lookup(&[]));
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.base_url, "http://localhost:4020");
    }

    #[test]
    fn test_from_lookup_ignores_blank_values() {
        let settings = ClientSettings::from_lookup(lookup(&[
            (ENV_API_TOKEN, "  "),
            (ENV_BASE_URL, ""),
            (ENV_FALLBACK_URL, " http://127.0.0.1:4020 "),
        ]));
        assert_eq!(settings.token, None);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.fallback_base_url.as_deref(), Some("http://127.0.0.1:4020"));
    }

    #[test]
    fn test_settings_updates_apply_to_next_read() {
        let settings = Settings::new(ClientSettings::default().with_token("tok"));
        assert!(settings.is_authenticated());
        assert_eq!(CredentialSource::token(&settings).as_deref(), Some("tok"));

        settings.set_base_url("https://studio.internal");
        settings.clear();
        assert!(!settings.is_authenticated());
        assert_eq!(CredentialSource::token(&settings), None);
        assert_eq!(CredentialSource::base_url(&settings), "https://studio.internal");
    }

    #[test]
    fn test_empty_token_is_absent() {
        let settings = Settings::default();
        settings.set_token(Some(String::new()));
        assert!(!settings.is_authenticated());
        let plain = ClientSettings::default().with_token("");
        assert_eq!(CredentialSource::token(&plain), None);
    }
}

//! Client configuration.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::CatApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.thecatapi.com/v1/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_KEY: &str = "CATAPI_API_KEY";
pub const ENV_BASE_URL: &str = "CATAPI_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "CATAPI_TIMEOUT_SECS";
pub const ENV_KEY_TIER: &str = "CATAPI_KEY_TIER";

/// Capability level of the configured API key.
///
/// The client cannot ask the service which tier a key has. `Premium` lets
/// premium-only requests through and leaves the verdict to the server;
/// `Free` rejects them locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyTier {
    Free,
    #[default]
    Premium,
}

impl KeyTier {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Some(KeyTier::Free),
            "premium" => Some(KeyTier::Premium),
            _ => None,
        }
    }
}

/// Immutable settings shared by every request a client makes.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: Url,
    api_key: Option<String>,
    key_tier: KeyTier,
    timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            api_key: None,
            key_tier: KeyTier::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("key_tier", &self.key_tier)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `CATAPI_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    /// Empty or unparsable values are ignored.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            config = config.with_api_key(key);
        }
        if let Some(url) = get(ENV_BASE_URL) {
            match parse_base_url(&url) {
                Ok(url) => config.base_url = url,
                Err(e) => tracing::warn!(error = %e, "ignoring invalid {ENV_BASE_URL}"),
            }
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config = config.with_timeout(Duration::from_secs(secs)),
                Err(_) => tracing::warn!(value = %secs, "ignoring invalid {ENV_TIMEOUT_SECS}"),
            }
        }
        if let Some(tier) = get(ENV_KEY_TIER) {
            match KeyTier::parse(&tier) {
                Some(tier) => config = config.with_key_tier(tier),
                None => tracing::warn!(value = %tier, "ignoring invalid {ENV_KEY_TIER}"),
            }
        }
        config
    }

    /// A blank key counts as no key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into()).filter(|key| !key.trim().is_empty());
        self
    }

    /// Set the service root, an absolute `http` or `https` URL. A trailing
    /// slash is added to its path when missing so that endpoint paths join
    /// onto it.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, CatApiError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_key_tier(mut self, key_tier: KeyTier) -> Self {
        self.key_tier = key_tier;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn key_tier(&self) -> KeyTier {
        self.key_tier
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, CatApiError> {
    let invalid = |reason: String| CatApiError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    let mut url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_public_service() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url().as_str(), DEFAULT_BASE_URL);
        assert!(config.api_key().is_none());
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.key_tier(), KeyTier::Premium);
    }

    #[test]
    fn base_url_path_ends_with_slash() {
        let config = ClientConfig::new().with_base_url("http://localhost:3000").unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:3000/");

        let config = ClientConfig::new()
            .with_base_url("https://api.thecatapi.com/v1")
            .unwrap();
        assert_eq!(config.base_url().as_str(), "https://api.thecatapi.com/v1/");
    }

    #[test]
    fn base_url_must_be_absolute_http() {
        for bad in ["api.thecatapi.com/v1", "localhost:3000", "ftp://example.com/", ""] {
            let err = ClientConfig::new().with_base_url(bad).unwrap_err();
            assert!(
                matches!(err, CatApiError::InvalidBaseUrl { ref url, .. } if url == bad),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn blank_api_key_is_no_key() {
        assert!(ClientConfig::new().with_api_key("").api_key().is_none());
        assert!(ClientConfig::new().with_api_key("  ").api_key().is_none());
        assert_eq!(ClientConfig::new().with_api_key("live_x").api_key(), Some("live_x"));
    }

    #[test]
    fn from_vars_reads_every_setting() {
        let config = ClientConfig::from_vars(vars(&[
            (ENV_API_KEY, "live_abc"),
            (ENV_BASE_URL, "http://127.0.0.1:8080/v1"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_KEY_TIER, "Free"),
        ]));
        assert_eq!(config.api_key(), Some("live_abc"));
        assert_eq!(config.base_url().as_str(), "http://127.0.0.1:8080/v1/");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.key_tier(), KeyTier::Free);
    }

    #[test]
    fn from_vars_ignores_empty_and_invalid_values() {
        let config = ClientConfig::from_vars(vars(&[
            (ENV_API_KEY, "  "),
            (ENV_BASE_URL, "api.thecatapi.com/v1"),
            (ENV_TIMEOUT_SECS, "soon"),
            (ENV_KEY_TIER, "gold"),
        ]));
        assert!(config.api_key().is_none());
        assert_eq!(config.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.key_tier(), KeyTier::Premium);
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", ClientConfig::new().with_api_key("live_secret"));
        assert!(!rendered.contains("live_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}

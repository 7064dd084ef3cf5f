use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::messages::Locale;

/// Origin used when no base URL is configured
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";
/// Environment variable holding the API base URL
pub const ENV_API_BASE_URL: &str = "STORESIM_API_BASE_URL";
/// Environment variable selecting the message locale (`en` or `ko`)
pub const ENV_LOCALE: &str = "STORESIM_LOCALE";
/// Default bound on a single request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Bound used by long-running creation endpoints
pub const LONG_TIMEOUT: Duration = Duration::from_millis(180_000);

/// Configuration for the storesim client
#[derive(Debug, Clone)]
pub struct StoresimConfig {
    api_base: String,
    locale: Locale,
    timeout: Duration,
}

impl Default for StoresimConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl StoresimConfig {
    /// Creates a configuration from the process environment
    ///
    /// Reads:
    /// - `STORESIM_API_BASE_URL` for the API base URL (defaults to [`DEFAULT_ORIGIN`])
    /// - `STORESIM_LOCALE` for user-facing messages (defaults to English)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base = non_empty(ENV_API_BASE_URL).unwrap_or_else(|| DEFAULT_ORIGIN.into());
        let locale = non_empty(ENV_LOCALE)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            api_base,
            locale,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the API base URL
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Sets the locale used for user-facing error messages
    #[must_use]
    pub const fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Sets the default per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured base URL as given
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

/// Seam between the client and its configuration source
pub trait Config: Send + Sync {
    /// Headers attached to every request
    fn headers(&self) -> HeaderMap;
    /// Absolute URL for an API path
    fn url(&self, path: &str) -> String;
    /// Locale for classifier messages
    fn locale(&self) -> Locale;
    /// Default request timeout
    fn timeout(&self) -> Duration;
}

impl Config for StoresimConfig {
    fn headers(&self) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        h.insert(ACCEPT, HeaderValue::from_static("application/json"));
        h
    }

    fn url(&self, path: &str) -> String {
        let base = self.api_base.trim_end_matches('/');
        let base = if base.is_empty() { DEFAULT_ORIGIN } else { base };
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    fn locale(&self) -> Locale {
        self.locale
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn base_url_from_lookup() {
        let cfg = StoresimConfig::from_lookup(vars(&[(ENV_API_BASE_URL, "https://api.example.com")]));
        assert_eq!(cfg.api_base(), "https://api.example.com");
    }

    #[test]
    fn missing_base_url_falls_back_to_origin() {
        let cfg = StoresimConfig::from_lookup(vars(&[]));
        assert_eq!(cfg.api_base(), DEFAULT_ORIGIN);

        let blank = StoresimConfig::from_lookup(vars(&[(ENV_API_BASE_URL, "  ")]));
        assert_eq!(blank.api_base(), DEFAULT_ORIGIN);
    }

    #[test]
    fn builder_overrides_lookup() {
        let cfg = StoresimConfig::from_lookup(vars(&[(ENV_API_BASE_URL, "https://env.example.com")]))
            .with_api_base("https://builder.example.com");
        assert_eq!(cfg.api_base(), "https://builder.example.com");
    }

    #[test]
    fn locale_from_lookup() {
        let cfg = StoresimConfig::from_lookup(vars(&[(ENV_LOCALE, "ko")]));
        assert_eq!(cfg.locale(), Locale::Ko);

        let unknown = StoresimConfig::from_lookup(vars(&[(ENV_LOCALE, "fr")]));
        assert_eq!(unknown.locale(), Locale::En);
    }

    #[test]
    fn url_joins_without_double_slash() {
        let cfg = StoresimConfig::from_lookup(vars(&[])).with_api_base("https://x.test/api/");
        assert_eq!(cfg.url("/stores"), "https://x.test/api/stores");
        assert_eq!(cfg.url("jobs/1"), "https://x.test/api/jobs/1");
    }

    #[test]
    fn json_headers_present() {
        let h = StoresimConfig::from_lookup(vars(&[])).headers();
        assert_eq!(h.get(CONTENT_TYPE).map(HeaderValue::as_bytes), Some(&b"application/json"[..]));
    }
}

use std::time::Duration;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::cancel::{Abort, AbortSignal};
use crate::classify;
use crate::config::{Config, LONG_TIMEOUT, StoresimConfig};
use crate::error::StoresimError;
use crate::messages::Locale;

/// Per-call knobs for [`Client::request`]
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Query parameters; `None` and empty values are not sent
    pub query: Vec<(String, Option<String>)>,
    /// Caller-side cancellation
    pub cancel: Option<CancellationToken>,
    /// Overrides the configured timeout
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query parameter, skipped at send time when absent or empty
    #[must_use]
    pub fn param<V: ToString>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query
            .push((key.into(), value.map(|v| v.to_string())));
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, token: Option<CancellationToken>) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.query
            .iter()
            .filter_map(|(k, v)| {
                v.as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| (k.as_str(), v))
            })
            .collect()
    }
}

/// Storesim API client
///
/// The client is generic over a [`Config`] implementation that provides the
/// base URL, headers, locale and default timeout.
#[derive(Debug, Clone)]
pub struct Client<C: Config> {
    http: reqwest::Client,
    config: C,
}

impl Client<StoresimConfig> {
    /// Creates a new client configured from the environment
    ///
    /// See [`StoresimConfig::new`] for the variables read.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoresimConfig::new())
    }
}

impl<C: Config + Default> Default for Client<C> {
    fn default() -> Self {
        Self::with_config(C::default())
    }
}

impl<C: Config> Client<C> {
    /// Creates a new client with the given configuration.
    ///
    /// Per-request deadlines are enforced by the client itself, so the
    /// underlying HTTP client only bounds connection setup.
    #[must_use]
    pub fn with_config(config: C) -> Self {
        Self {
            http: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Replaces the HTTP client with a custom one
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Returns a reference to the client's configuration
    #[must_use]
    pub const fn config(&self) -> &C {
        &self.config
    }

    /// Locale used for error messages
    #[must_use]
    pub fn locale(&self) -> Locale {
        self.config.locale()
    }

    /// Performs one bounded HTTP exchange.
    ///
    /// The deadline covers sending the request and reading the whole body.
    /// A 2xx response yields its JSON body, or `None` when the body is absent
    /// or not JSON. Any other status becomes [`StoresimError::Api`].
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOptions,
    ) -> Result<Option<Value>, StoresimError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.config.url(path);
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .headers(self.config.headers());

        let query = opts.query_pairs();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let timeout = opts.timeout.unwrap_or_else(|| self.config.timeout());
        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let is_json = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.contains("application/json"));
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, is_json, bytes))
        };

        let (status, is_json, bytes) = match AbortSignal::timeout(timeout)
            .with_caller(opts.cancel)
            .run(exchange)
            .await
        {
            Ok(settled) => settled?,
            Err(Abort::TimedOut(after)) => return Err(StoresimError::Timeout { after }),
            Err(Abort::Cancelled) => return Err(StoresimError::Cancelled),
        };

        let data = if is_json {
            serde_json::from_slice::<Value>(&bytes)
                .ok()
                .filter(|v| !v.is_null())
        } else {
            None
        };

        if status.is_success() {
            return Ok(data);
        }

        let err = classify::standard_error(status.as_u16(), data, self.config.locale());
        tracing::debug!(
            %method,
            %url,
            status = status.as_u16(),
            code = err.code.as_deref().unwrap_or("-"),
            message = %err.message,
            "API request failed"
        );
        Err(StoresimError::Api(err))
    }

    /// `GET path`
    pub async fn get(&self, path: &str, opts: RequestOptions) -> Result<Option<Value>, StoresimError> {
        self.request::<Value>(Method::GET, path, None, opts).await
    }

    /// `POST path` with a JSON body
    pub async fn post<B>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOptions,
    ) -> Result<Option<Value>, StoresimError>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body), opts).await
    }

    /// `POST path` for endpoints that do heavy work inline.
    ///
    /// Uses [`LONG_TIMEOUT`] unless the options carry their own timeout.
    pub async fn post_long<B>(
        &self,
        path: &str,
        body: &B,
        mut opts: RequestOptions,
    ) -> Result<Option<Value>, StoresimError>
    where
        B: Serialize + ?Sized,
    {
        opts.timeout.get_or_insert(LONG_TIMEOUT);
        self.post(path, body, opts).await
    }
}

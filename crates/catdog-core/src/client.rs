//! HTTP client, builder, and request dispatch.
//!
//! [`ApiClient`] is the shared transport used by every provider client: it
//! holds the credential and base URL, restricts the verb set, injects the
//! API key according to the provider's profile, and classifies non-success
//! status codes into the error taxonomy.

use std::env;
use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::provider::{CredentialMode, Provider, API_KEY_HEADER, API_KEY_PARAM};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for upload requests in seconds.
pub const UPLOAD_TIMEOUT: u64 = 60;

/// Default idle timeout for connection pools in seconds.
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host.
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// HTTP client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Timeout for multipart upload requests, which move more data
    pub upload_timeout: Duration,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            upload_timeout: Duration::from_secs(UPLOAD_TIMEOUT),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout applied to multipart upload requests.
    #[must_use]
    pub const fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the API key comes from at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeySource {
    Explicit(String),
    Environment,
    Anonymous,
}

/// Builder for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientBuilder {
    provider: Provider,
    base_url: String,
    key: KeySource,
    config: ClientConfig,
    user_agent: Option<String>,
}

impl ApiClientBuilder {
    /// Create a builder for the given provider.
    ///
    /// Unless overridden, the API key is resolved from the provider's
    /// environment variable when the client is built.
    #[must_use]
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            base_url: provider.base_url().to_string(),
            key: KeySource::Environment,
            config: ClientConfig::new(),
            user_agent: None,
        }
    }

    /// Supply the API key explicitly instead of reading the environment.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.key = KeySource::Explicit(api_key.into());
        self
    }

    /// Build a client without any credential.
    ///
    /// Read operations work anonymously; operations that need a key fail
    /// with [`Error::MissingApiKey`] when called.
    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.key = KeySource::Anonymous;
        self
    }

    /// Override the base URL, mainly useful for tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the User-Agent header for all requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] when the key should come from the
    /// environment but the provider's variable is unset, and
    /// [`Error::InvalidUrl`] when the base URL does not parse.
    pub fn build(self) -> Result<ApiClient> {
        let api_key = match self.key {
            KeySource::Explicit(key) => Some(key),
            KeySource::Environment => {
                Some(env::var(self.provider.env_var()).map_err(|_| Error::MissingApiKey)?)
            }
            KeySource::Anonymous => None,
        };

        // A trailing slash keeps Url::join from replacing the version prefix.
        let mut base = self.base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        let mut builder = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .pool_idle_timeout(self.config.pool_idle_timeout)
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let http = builder.build().map_err(Error::from)?;

        Ok(ApiClient {
            http,
            base_url,
            provider: self.provider,
            api_key,
            upload_timeout: self.config.upload_timeout,
        })
    }
}

/// Shared HTTP client for one provider.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    provider: Provider,
    api_key: Option<String>,
    upload_timeout: Duration,
}

impl ApiClient {
    /// Construct a client for the provider, resolving the key from its
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] when the variable is unset.
    pub fn from_env(provider: Provider) -> Result<Self> {
        ApiClientBuilder::new(provider).build()
    }

    /// Return the provider this client talks to.
    #[must_use]
    pub const fn provider(&self) -> Provider {
        self.provider
    }

    /// Return the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns true when the client holds an API key.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Guard for operations that require a credential.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingApiKey`] for anonymous clients.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(Error::MissingApiKey)
    }

    /// Dispatch a request and classify the response status.
    ///
    /// Only GET, POST, and DELETE are allowed; any other verb fails with
    /// [`Error::UnsupportedRequestType`] before anything is sent. When a key
    /// is configured it is attached per the provider's credential mode.
    ///
    /// # Errors
    ///
    /// Returns the mapped transport error for any non-success status.
    pub async fn execute<F>(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        customize: F,
    ) -> Result<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        if method != Method::GET && method != Method::POST && method != Method::DELETE {
            return Err(Error::UnsupportedRequestType(method.to_string()));
        }

        let url = self.base_url.join(path.trim_start_matches('/'))?;
        let mut request = self.http.request(method.clone(), url);

        if !params.is_empty() {
            request = request.query(params);
        }

        if let Some(key) = &self.api_key {
            request = match self.provider.credential_mode() {
                CredentialMode::Header => request.header(API_KEY_HEADER, key),
                CredentialMode::Query => request.query(&[(API_KEY_PARAM, key.as_str())]),
            };
        }

        debug!(provider = %self.provider, %method, path, "dispatching request");
        let response = customize(request).send().await?;
        let status = response.status();
        debug!(provider = %self.provider, path, status = status.as_u16(), "received response");

        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::from_status(status, body))
        }
    }

    /// GET a JSON resource.
    pub async fn get_json<R>(&self, path: &str, params: &[(&'static str, String)]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        self.send_json::<(), R>(Method::GET, path, None, params)
            .await
    }

    /// Dispatch a request with an optional JSON body and decode the JSON
    /// response.
    pub async fn send_json<B, R>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        params: &[(&'static str, String)],
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .execute(method, path, params, |mut request| {
                request = request.header("Accept", "application/json");
                if let Some(payload) = body {
                    request = request.json(payload);
                }
                request
            })
            .await?;

        response.json::<R>().await.map_err(Error::from)
    }

    /// POST a multipart form and decode the JSON response.
    ///
    /// Uploads run under the configured upload timeout rather than the
    /// shorter general request timeout.
    pub async fn post_multipart<R>(&self, path: &str, form: Form) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self
            .execute(Method::POST, path, &[], |request| {
                request.multipart(form).timeout(self.upload_timeout)
            })
            .await?;

        response.json::<R>().await.map_err(Error::from)
    }

    /// Fetch binary content from an absolute URL, such as an image's source
    /// URL on the provider's CDN. No credential is attached.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes> {
        let url = Url::parse(url)?;
        debug!(%url, "fetching binary content");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(status, body));
        }
        response.bytes().await.map_err(Error::from)
    }
}

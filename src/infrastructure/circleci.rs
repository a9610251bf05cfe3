//! CircleCI v1.1 project environment variable client
//!
//! Each operation derives its request URL from a private clone of the
//! authenticated base URL, so the client can be shared across threads.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::domain::{EnvironmentVariable, ProjectSlug};
use crate::infrastructure::traits::EnvVarApi;
use crate::infrastructure::{ApiError, ApiResult};

/// Public CircleCI API root.
pub const CIRCLE_BASE_URL: &str = "https://circleci.com/api/v1.1";

/// Default connect and request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const TOKEN_PARAM: &str = "circle-token";
const JSON: &str = "application/json";

/// Transport settings for [`CircleClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// API root, without the token
    pub base_url: String,
    /// Overall per-request timeout
    pub timeout: Duration,
    /// TCP connect and TLS handshake timeout
    pub connect_timeout: Duration,
    /// Honour `HTTP(S)_PROXY`/`NO_PROXY` from the environment
    pub use_system_proxy: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: CIRCLE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_TIMEOUT,
            use_system_proxy: true,
        }
    }
}

/// Blocking client bound to one token and one API root.
///
/// Holds no mutable state: the base URL (with the token already in its
/// query string) is only ever cloned.
pub struct CircleClient {
    http: Client,
    base_url: Url,
    base: String,
}

impl fmt::Debug for CircleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the token lives in base_url's query, keep it out of logs
        f.debug_struct("CircleClient")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl CircleClient {
    /// Client against the public API with default timeouts.
    pub fn new(token: &str) -> ApiResult<Self> {
        Self::with_options(token, ClientOptions::default())
    }

    /// Client with an explicit API root and timeouts.
    pub fn with_options(token: &str, options: ClientOptions) -> ApiResult<Self> {
        let mut base_url =
            Url::parse(&options.base_url).map_err(|e| ApiError::InvalidBaseUrl {
                url: options.base_url.clone(),
                reason: e.to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: options.base_url,
                reason: "URL cannot carry path segments".to_string(),
            });
        }
        base_url.query_pairs_mut().append_pair(TOKEN_PARAM, token);

        let mut builder = Client::builder();
        if !options.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::ClientBuild)?;

        debug!("CircleClient: base={}", options.base_url);
        Ok(Self {
            http,
            base_url,
            base: options.base_url,
        })
    }

    /// API root this client talks to (token not included).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `{base}/project/{vcs}/{account}/{project}/envvar[/{key}]?circle-token=...`
    fn endpoint(&self, slug: &ProjectSlug, key: Option<&str>) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|_| ApiError::InvalidBaseUrl {
                        url: self.base.clone(),
                        reason: "URL cannot carry path segments".to_string(),
                    })?;
            segments.pop_if_empty().extend(slug.envvar_segments());
            if let Some(key) = key {
                segments.push(key);
            }
        }
        Ok(url)
    }

    fn execute(&self, request: RequestBuilder, method: &str, url: &Url) -> ApiResult<Response> {
        debug!("{} {}", method, url.path());
        let response = request.send().map_err(ApiError::send)?;
        debug!("{} {} -> {}", method, url.path(), response.status());
        Ok(response)
    }
}

/// Read the whole body, then decode it; a body that does not match `T` is an error.
fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let body = response.bytes().map_err(ApiError::read_body)?;
    serde_json::from_slice(&body).map_err(ApiError::Decode)
}

impl EnvVarApi for CircleClient {
    #[instrument(level = "debug", skip(self, slug), fields(slug = %slug))]
    fn list(&self, slug: &ProjectSlug) -> ApiResult<Vec<EnvironmentVariable>> {
        let url = self.endpoint(slug, None)?;
        let request = self.http.get(url.clone()).header(ACCEPT, JSON);
        let response = self.execute(request, "GET", &url)?;

        match response.status() {
            StatusCode::OK => decode(response),
            status => Err(ApiError::UnexpectedStatus {
                action: "list keys".to_string(),
                status,
            }),
        }
    }

    #[instrument(level = "debug", skip(self, slug), fields(slug = %slug))]
    fn get(&self, slug: &ProjectSlug, key: &str) -> ApiResult<EnvironmentVariable> {
        EnvironmentVariable::validate_key(key)?;
        let url = self.endpoint(slug, Some(key))?;
        let request = self.http.get(url.clone()).header(ACCEPT, JSON);
        let response = self.execute(request, "GET", &url)?;

        match response.status() {
            StatusCode::OK => decode(response),
            StatusCode::NOT_FOUND => Err(ApiError::KeyNotFound(key.to_string())),
            status => Err(ApiError::UnexpectedStatus {
                action: format!("get {key:?} key"),
                status,
            }),
        }
    }

    /// POST is not idempotent on the service side: after a timeout the
    /// variable may or may not have been written. Callers decide whether to retry.
    #[instrument(level = "debug", skip(self, slug, value), fields(slug = %slug))]
    fn set(&self, slug: &ProjectSlug, key: &str, value: &str) -> ApiResult<()> {
        EnvironmentVariable::validate_key(key)?;
        let url = self.endpoint(slug, None)?;
        let body = serde_json::to_vec(&EnvironmentVariable::new(key, value))
            .map_err(ApiError::Encode)?;
        let request = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, JSON)
            .body(body);
        let response = self.execute(request, "POST", &url)?;

        match response.status() {
            StatusCode::CREATED => Ok(()),
            // 404 here means the project path is unknown; message kept as the service's contract
            StatusCode::NOT_FOUND => Err(ApiError::KeyNotFound(key.to_string())),
            status => Err(ApiError::UnexpectedStatus {
                action: format!("create {key:?} key"),
                status,
            }),
        }
    }

    #[instrument(level = "debug", skip(self, slug), fields(slug = %slug))]
    fn delete(&self, slug: &ProjectSlug, key: &str) -> ApiResult<()> {
        EnvironmentVariable::validate_key(key)?;
        let url = self.endpoint(slug, Some(key))?;
        let request = self.http.delete(url.clone()).header(CONTENT_TYPE, JSON);
        let response = self.execute(request, "DELETE", &url)?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(ApiError::KeyNotFound(key.to_string())),
            status => Err(ApiError::UnexpectedStatus {
                action: format!("delete {key:?} key"),
                status,
            }),
        }
    }
}

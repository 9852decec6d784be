//! The HTTP client every backend call goes through.
//!
//! Two cross-cutting stages wrap each call so that endpoint methods never
//! repeat them:
//!
//! 1. **Request stage**: the persisted token is read from storage (fresh, for
//!    every request) and attached as a bearer credential.
//! 2. **Response stage**: a 401 removes the persisted token and forces the
//!    host back to the login screen, whoever issued the call; any other
//!    non-success status is returned to the caller as [`Error::Api`].
//!
//! Nothing is retried, cached or batched. Each call is one round trip and
//! its failure is always surfaced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::hooks::{LoginRedirect, TracingRedirect, LOGIN_PATH};
use crate::storage::{ClientStorage, TOKEN_KEY};

/// Configured client for the signage backend.
///
/// Cloning is cheap and clones share the connection pool, the storage and
/// the redirect hook. Calls may run concurrently; responses are handled
/// independently in whatever order they arrive.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use signage_console_client::{ApiClient, ApiConfig, MemoryStorage};
///
/// # async fn example() -> Result<(), signage_console_client::Error> {
/// let client = ApiClient::new(ApiConfig::from_env()?, Arc::new(MemoryStorage::new()))?;
///
/// let (devices, sites) = tokio::join!(client.list_devices(), client.list_sites());
/// println!("{} devices on {} sites", devices?.len(), sites?.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    storage: Arc<dyn ClientStorage>,
    redirect: Arc<dyn LoginRedirect>,
    /// Bumped on every 401, shared by all clones.
    invalidations: Arc<AtomicU64>,
}

impl ApiClient {
    /// Creates a client sending JSON by default and reading its bearer token
    /// from `storage`.
    pub fn new(config: ApiConfig, storage: Arc<dyn ClientStorage>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            config,
            storage,
            redirect: Arc::new(TracingRedirect),
            invalidations: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Replaces the hook invoked when the backend answers 401.
    pub fn with_login_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn ClientStorage> {
        &self.storage
    }

    /// Number of credential rejections seen so far by this client and its
    /// clones. A session held since an earlier value is no longer valid.
    pub(crate) fn invalidation_epoch(&self) -> u64 {
        self.invalidations.load(Ordering::SeqCst)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.http.request(method, self.config.endpoint(path)?))
    }

    /// Runs `request` through both pipeline stages and parses the JSON body.
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.dispatch(request).await?;
        let body = response.bytes().await?;

        serde_json::from_slice(&body).map_err(|e| Error::Decode(e.to_string()))
    }

    async fn dispatch(&self, request: RequestBuilder) -> Result<Response> {
        let request = self.authorize(request).await.build()?;
        debug!(method = %request.method(), url = %request.url(), "dispatching request");

        let response = self.http.execute(request).await?;
        self.intercept(response).await
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.storage.get(TOKEN_KEY).await {
            Ok(Some(token)) => request.bearer_auth(token),
            Ok(None) => request,
            Err(err) => {
                warn!(%err, "cannot read persisted token, sending request without credentials");
                request
            }
        }
    }

    async fn intercept(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let detail = match response.bytes().await {
            Ok(body) => extract_detail(&body),
            Err(_) => None,
        };

        if status == StatusCode::UNAUTHORIZED {
            warn!(%url, "credentials rejected, clearing persisted token");
            if let Err(err) = self.storage.remove(TOKEN_KEY).await {
                warn!(%err, "failed to remove persisted token");
            }
            self.invalidations.fetch_add(1, Ordering::SeqCst);
            self.redirect.redirect_to_login(LOGIN_PATH);
        } else {
            debug!(%url, %status, ?detail, "request failed");
        }

        Err(Error::Api { status, detail })
    }
}

/// Pulls the `detail` field out of an error body.
fn extract_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::Null => None,
        Value::String(detail) if detail.is_empty() => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

//! HTTP client facade with auth header injection and busy-gate bookkeeping.
//!
//! Every verb runs the same pipeline: begin a gate ticket, inject the bearer
//! token from the session store, send, accept only 200/201/204, end the
//! ticket, then run the failure hook (401 logs out) or decode the body.

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::error::ApiError;
use super::types::{ApiResponse, RequestOptions, ResponseKind};
use crate::config::ClientConfig;
use crate::loading::BusyGate;
use crate::session::{self, SessionStore};

/// Statuses treated as success. Everything else, including other 2xx and 3xx, is an error.
pub const ACCEPTED_STATUSES: [StatusCode; 3] =
    [StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT];

/// Side effect run after the session token is cleared (e.g. navigate to login).
pub type LogoutHook = Arc<dyn Fn() + Send + Sync>;

/// Returns `true` when `status` passes response validation.
pub fn is_accepted(status: StatusCode) -> bool {
    ACCEPTED_STATUSES.contains(&status)
}

/// A response that passed validation, with the body fully read.
struct RawResponse {
    status: StatusCode,
    headers: reqwest::header::HeaderMap,
    body: Vec<u8>,
}

/// HTTP client wrapper for the portal API.
///
/// Holds the base URL, a shared session store for the bearer token and the
/// busy gate every request reports to.
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    gate: BusyGate,
    on_logout: Option<LogoutHook>,
}

impl ApiClient {
    /// Create a client for `config.base_url` with the config's timeout.
    ///
    /// Redirects are not followed so 3xx responses fail validation.
    pub fn new(
        config: &ClientConfig,
        session: Arc<dyn SessionStore>,
        gate: BusyGate,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            gate,
            on_logout: None,
        })
    }

    /// Install the side effect run on logout, after the token is removed.
    pub fn with_logout_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_logout = Some(Arc::new(hook));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn gate(&self) -> &BusyGate {
        &self.gate
    }

    /// GET `endpoint` with `params` serialized into the query string.
    /// Returns the decoded body.
    pub async fn fetch<T, P>(
        &self,
        endpoint: &str,
        params: Option<&P>,
        options: &RequestOptions,
        show_loader: bool,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let res = self
            .execute(Method::GET, endpoint, options, show_loader, |b| match params {
                Some(p) => b.query(p),
                None => b,
            })
            .await?;
        Ok(res.data)
    }

    /// POST `data` as JSON to `endpoint`. Returns the full response envelope.
    pub async fn create<T, D>(
        &self,
        endpoint: &str,
        data: Option<&D>,
        options: &RequestOptions,
        show_loader: bool,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.execute(Method::POST, endpoint, options, show_loader, |b| match data {
            Some(d) => b.json(d),
            None => b,
        })
        .await
    }

    /// PUT `data` as JSON to `endpoint`. Returns the decoded body.
    pub async fn update<T, D>(
        &self,
        endpoint: &str,
        data: &D,
        options: &RequestOptions,
        show_loader: bool,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        let res = self
            .execute(Method::PUT, endpoint, options, show_loader, |b| b.json(data))
            .await?;
        Ok(res.data)
    }

    /// DELETE `endpoint` with `data` as a JSON body. Returns the decoded body.
    pub async fn remove<T, D>(
        &self,
        endpoint: &str,
        data: &D,
        options: &RequestOptions,
        show_loader: bool,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        let res = self
            .execute(Method::DELETE, endpoint, options, show_loader, |b| b.json(data))
            .await?;
        Ok(res.data)
    }

    /// Remove the session token and run the logout hook.
    pub fn logout(&self) {
        match session::clear_token(self.session.as_ref()) {
            Ok(()) => log::info!("Session token cleared"),
            Err(e) => log::warn!("Failed to clear session token: {}", e),
        }
        if let Some(hook) = &self.on_logout {
            hook();
        }
    }

    async fn execute<T, F>(
        &self,
        method: Method,
        endpoint: &str,
        options: &RequestOptions,
        show_loader: bool,
        prepare: F,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let ticket = self.gate.begin(show_loader);

        let url = self.url_for(endpoint)?;
        log::debug!("{} {}", method, url);
        let builder = prepare(self.client.request(method, url));
        let builder = self.authorize(builder, endpoint, options)?;
        let builder = builder.headers(options.headers.clone());

        let outcome = Self::transmit(builder).await;
        ticket.finish();

        let raw = match outcome {
            Ok(raw) => raw,
            Err(e) => {
                self.on_failure(endpoint, &e);
                return Err(e);
            }
        };

        let data = decode(&raw.body, options.response_kind)?;
        Ok(ApiResponse {
            status: raw.status,
            headers: raw.headers,
            data,
        })
    }

    /// Join `endpoint` onto the base URL. Absolute URLs are used as-is.
    fn url_for(&self, endpoint: &str) -> Result<Url, ApiError> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Ok(Url::parse(endpoint)?);
        }
        let path = endpoint.trim_start_matches('/');
        if path.is_empty() {
            Ok(Url::parse(&self.base_url)?)
        } else {
            Ok(Url::parse(&format!("{}/{}", self.base_url, path))?)
        }
    }

    /// Request hook: basic auth when supplied, otherwise the session bearer token.
    ///
    /// The token is read fresh for every request with a non-empty endpoint.
    fn authorize(
        &self,
        builder: RequestBuilder,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<RequestBuilder, ApiError> {
        if let Some(auth) = &options.basic_auth {
            return Ok(builder.basic_auth(&auth.username, Some(&auth.password)));
        }
        if endpoint.is_empty() {
            return Ok(builder);
        }
        match session::read_token(self.session.as_ref())? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    async fn transmit(builder: RequestBuilder) -> Result<RawResponse, ApiError> {
        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?.to_vec();

        if !is_accepted(status) {
            return Err(ApiError::from_status(status, &body));
        }
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Failure hook. Runs after the gate ticket has ended.
    fn on_failure(&self, endpoint: &str, err: &ApiError) {
        log::warn!("Request to {} failed: {}", endpoint, err);
        match err.status() {
            Some(StatusCode::UNAUTHORIZED) => self.logout(),
            // 403 is left to the caller.
            Some(StatusCode::FORBIDDEN) => log::debug!("Forbidden: {}", endpoint),
            _ => {}
        }
    }
}

/// Decode a body that passed validation. Empty bodies decode as JSON `null`.
fn decode<T: DeserializeOwned>(body: &[u8], kind: ResponseKind) -> Result<T, ApiError> {
    if body.is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    match kind {
        ResponseKind::Json => Ok(serde_json::from_slice(body)?),
        ResponseKind::Text => {
            let text = String::from_utf8_lossy(body).into_owned();
            Ok(serde_json::from_value(serde_json::Value::String(text))?)
        }
    }
}

//! Per-call request options and the response envelope returned by `create`.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;

/// Username/password pair sent as HTTP basic auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// How the response body is handed to the target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Parse the body as JSON.
    #[default]
    Json,
    /// Pass the body through as a JSON string (for `String` targets).
    Text,
}

/// Options accepted by every verb. Constructed per call, never persisted.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers, applied last so they override injected ones.
    pub headers: HeaderMap,
    /// Basic-auth credentials; replace the bearer header when set.
    pub basic_auth: Option<BasicAuth>,
    pub response_kind: ResponseKind,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some(BasicAuth {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    pub fn with_response_kind(mut self, kind: ResponseKind) -> Self {
        self.response_kind = kind;
        self
    }
}

/// Full response returned by `ApiClient::create`.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub data: T,
}

/// Placeholder for `fetch` calls without query parameters.
pub const NO_QUERY: Option<&()> = None;

/// Placeholder for `create` calls without a body.
pub const NO_BODY: Option<&()> = None;

//! Errors surfaced by the HTTP client facade.

use reqwest::StatusCode;
use thiserror::Error;

use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized (401): {body}")]
    Unauthorized { body: String },

    #[error("Forbidden (403): {body}")]
    Forbidden { body: String },

    #[error("Request failed ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    Transport(reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Transport(err)
        }
    }
}

impl ApiError {
    /// Build the error for a response whose status was not accepted.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let body = String::from_utf8_lossy(body).into_owned();
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized { body },
            StatusCode::FORBIDDEN => ApiError::Forbidden { body },
            _ => ApiError::Status { status, body },
        }
    }

    /// HTTP status of the rejected response, if the server answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::Forbidden { .. } => Some(StatusCode::FORBIDDEN),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

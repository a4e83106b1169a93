//! HTTP client facade for the portal API.
//!
//! Provides the verb functions (`fetch`, `create`, `update`, `remove`),
//! bearer token injection from the session store, and 401/403 handling.

pub mod client;
pub mod error;
pub mod types;


pub use client::{is_accepted, ApiClient, LogoutHook, ACCEPTED_STATUSES};
pub use error::ApiError;
pub use types::{ApiResponse, BasicAuth, RequestOptions, ResponseKind, NO_BODY, NO_QUERY};

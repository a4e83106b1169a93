//! Client-side utilities for the portal API.
//!
//! - [`api`]: HTTP client facade with bearer token injection, response
//!   validation and 401 logout handling.
//! - [`loading`]: busy gate counting in-flight requests for a loading indicator.
//! - [`session`]: session-scoped token storage.
//! - [`export`]: records to styled `.xlsx` or `.csv` files.

pub mod api;
pub mod config;
pub mod export;
pub mod loading;
pub mod session;

pub use api::{ApiClient, ApiError, ApiResponse, RequestOptions, ResponseKind};
pub use config::ClientConfig;
pub use export::{export_table_data, render_table, ExportError, ExportFormat, HeaderMapping, Record};
pub use loading::{BusyGate, GateSnapshot};
pub use session::{MemorySessionStore, SessionStore};

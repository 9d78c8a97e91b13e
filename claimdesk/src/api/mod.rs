//! HTTP API module.
//!
//! The typed client used by the upload wizard, the in-memory backend that
//! serves the same endpoints, and the shared activity log.

pub mod client;
pub mod logs;
pub mod server;
pub mod types;

pub use client::ClaimsClient;
pub use logs::*;
pub use server::{router, serve, start_server, AppState};
pub use types::*;

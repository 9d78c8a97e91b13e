//! Application configuration.
//!
//! Fixed UI constants live here as `const`s. Connection settings for the
//! claim-access API are read from the environment (a `.env` file is loaded
//! first when present).

use std::env;

use crate::models::Role;

/// Default claim-access API base URL (the bundled mock server).
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Maximum accepted upload size in bytes.
///
/// 5 MiB, inclusive.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// MIME types an upload slot accepts.
pub const ACCEPTED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "application/pdf"];

/// Rows per page in every collection view.
pub const PAGE_SIZE: usize = 10;

/// Numbered page buttons shown at once.
pub const PAGE_BUTTON_WINDOW: usize = 5;

/// Above this many pages the pager collapses into ellipses.
pub const ELLIPSIS_THRESHOLD: usize = 7;

/// Seconds the success modal counts down before continuing.
pub const SUCCESS_COUNTDOWN_SECS: u32 = 10;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "CLAIMDESK_API_URL";

/// Environment variable holding the acting role.
pub const ROLE_VAR: &str = "CLAIMDESK_ROLE";

/// Connection settings for [`crate::api::ClaimsClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub role: Role,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            role: Role::Workshop,
        }
    }
}

impl ClientConfig {
    /// Build from `CLAIMDESK_API_URL` / `CLAIMDESK_ROLE`, falling back to defaults.
    ///
    /// An unrecognised role keeps the default rather than failing.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Ok(url) = env::var(API_URL_VAR) {
            if !url.trim().is_empty() {
                config.api_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        if let Some(role) = env::var(ROLE_VAR).ok().and_then(|r| r.parse().ok()) {
            config.role = role;
        }
        config
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

//! Client configuration.
//!
//! Values come from the environment with fixed defaults:
//! - `PHOTO_API_ORIGIN` — server origin, default `http://127.0.0.1:8000`
//! - `PHOTO_API_ROOT` — API prefix shared by both instances, default `/api`
//! - `PHOTO_API_TIMEOUT_SECS` — per-request timeout, default 10

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8000";
pub const DEFAULT_API_ROOT: &str = "/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub origin: String,
    pub api_root: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            api_root: DEFAULT_API_ROOT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout = match lookup("PHOTO_API_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(value = %raw, "invalid PHOTO_API_TIMEOUT_SECS, using default");
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };
        Self {
            origin: lookup("PHOTO_API_ORIGIN").unwrap_or(defaults.origin),
            api_root: lookup("PHOTO_API_ROOT").unwrap_or(defaults.api_root),
            timeout,
        }
    }

    /// Origin joined with the API root, without a trailing slash.
    pub fn base_url(&self) -> String {
        let origin = self.origin.trim_end_matches('/');
        let root = self.api_root.trim_matches('/');
        if root.is_empty() {
            origin.to_string()
        } else {
            format!("{origin}/{root}")
        }
    }
}

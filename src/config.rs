//! Runtime configuration parsed from environment variables.
//!
//! Optional (all have defaults):
//! - `POLL_MAX_ATTEMPTS`: default 30, clamped to at least 1
//! - `POLL_INITIAL_DELAY_MS`: default 15000
//! - `POLL_FIXED_INTERVAL_MS`: fixed retry delay; tiered schedule when unset
//! - `DRONEMAP_API_URL`: default `http://localhost:8000`
//! - `DRONEMAP_REQUEST_TIMEOUT_SECS`: default 30
//! - `DRONEMAP_CONNECT_TIMEOUT_SECS`: default 10
//! - `DRONEMAP_STATE_FILE`: default `dronemap-state.json`
//!
//! Values that fail to parse fall back to the default.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::poll::{Interval, PollConfig};
use crate::poll::schedule::{DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATE_FILE: &str = "dronemap-state.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend base URL without a trailing slash.
    pub base_url: String,
    pub timeouts: ApiTimeouts,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts: ApiTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub poll: PollConfig,
    pub api: ApiConfig,
    pub state_file: PathBuf,
}

impl AppConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let initial_delay = lookup_parse::<u64, _>(&lookup, "POLL_INITIAL_DELAY_MS")
            .map_or(DEFAULT_INITIAL_DELAY, Duration::from_millis);
        let interval = lookup_parse::<u64, _>(&lookup, "POLL_FIXED_INTERVAL_MS")
            .map_or(Interval::Tiered, |ms| Interval::Fixed(Duration::from_millis(ms)));
        let poll = PollConfig::default()
            .with_max_attempts(lookup_parse(&lookup, "POLL_MAX_ATTEMPTS").unwrap_or(DEFAULT_MAX_ATTEMPTS))
            .with_initial_delay(initial_delay)
            .with_interval(interval);

        let base_url = lookup("DRONEMAP_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut api = ApiConfig::new(&base_url);
        api.timeouts = ApiTimeouts {
            request_secs: lookup_parse(&lookup, "DRONEMAP_REQUEST_TIMEOUT_SECS").unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: lookup_parse(&lookup, "DRONEMAP_CONNECT_TIMEOUT_SECS").unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        let state_file = lookup("DRONEMAP_STATE_FILE").map_or_else(|| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from);

        Self { poll, api, state_file }
    }
}

fn lookup_parse<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse::<T>().ok())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

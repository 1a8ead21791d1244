//! Runtime settings, read from the environment (and `.env` when present).

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Language code the description is picked in.
    pub language: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Where tracing output goes; the terminal itself is taken by the UI.
    pub log_file: String,
    /// `RUST_LOG`-style filter.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "es".to_string(),
            timeout: Duration::from_secs(10),
            log_file: "data/pokedex.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup so tests don't have to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let timeout_secs: u64 = match lookup("POKEDEX_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid POKEDEX_TIMEOUT_SECS `{}`", raw))?,
            None => defaults.timeout.as_secs(),
        };
        if timeout_secs == 0 {
            anyhow::bail!("POKEDEX_TIMEOUT_SECS must be at least 1");
        }

        Ok(Self {
            base_url: lookup("POKEAPI_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            language: lookup("POKEDEX_LANGUAGE").unwrap_or(defaults.language),
            timeout: Duration::from_secs(timeout_secs),
            log_file: lookup("POKEDEX_LOG_FILE").unwrap_or(defaults.log_file),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        })
    }
}

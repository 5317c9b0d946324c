//! Client configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! YAML file, and `MATSYA_*` environment variables. Unparseable environment
//! values are ignored.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Prefix for every REST path.
pub const API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub proxy_url: Option<String>,
    pub poll: PollConfig,
    /// Capacity of the channel between the socket reader and the subscriber.
    pub stream_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            pool_max_idle_per_host: 32,
            proxy_url: None,
            poll: PollConfig::default(),
            stream_buffer: 64,
        }
    }
}

/// Job status polling schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub initial_delay_ms: u64,
    pub interval_ms: u64,
    pub max_attempts: u32,
    /// Whether a status check that failed still uses up one attempt. Off by
    /// default: only successful checks count.
    pub count_failed_polls: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 5_000,
            interval_ms: 10_000,
            max_attempts: 30,
            count_failed_polls: false,
        }
    }
}

impl PollConfig {
    pub fn new(initial_delay: Duration, interval: Duration, max_attempts: u32) -> Self {
        Self {
            initial_delay_ms: initial_delay.as_millis() as u64,
            interval_ms: interval.as_millis() as u64,
            max_attempts,
            count_failed_polls: false,
        }
    }

    pub fn with_count_failed_polls(mut self, count: bool) -> Self {
        self.count_failed_polls = count;
        self
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl ClientConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load a YAML file, then apply environment overrides on top.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut config: ClientConfig = serde_yaml::from_str(&raw).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid config file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config"),
            )
        })?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `MATSYA_*` overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|s| s.trim().parse::<T>().ok())
        }

        if let Some(url) = lookup("MATSYA_API_URL").filter(|s| !s.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(v) = parsed(&lookup, "MATSYA_HTTP_TIMEOUT_SECS") {
            self.timeout_secs = v;
        }
        if let Some(v) = parsed(&lookup, "MATSYA_HTTP_POOL_MAX_IDLE_PER_HOST") {
            self.pool_max_idle_per_host = v;
        }
        if let Some(proxy) = lookup("MATSYA_PROXY_URL").filter(|s| !s.trim().is_empty()) {
            self.proxy_url = Some(proxy);
        }
        if let Some(v) = parsed(&lookup, "MATSYA_POLL_INITIAL_DELAY_MS") {
            self.poll.initial_delay_ms = v;
        }
        if let Some(v) = parsed(&lookup, "MATSYA_POLL_INTERVAL_MS") {
            self.poll.interval_ms = v;
        }
        if let Some(v) = parsed(&lookup, "MATSYA_POLL_MAX_ATTEMPTS") {
            self.poll.max_attempts = v;
        }
        if let Some(v) = parsed::<usize>(&lookup, "MATSYA_STREAM_BUFFER") {
            self.stream_buffer = v.max(1);
        }
    }

    /// Parse and check the base URL.
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(self.base_url.trim()).map_err(|e| {
            Error::configuration_with_context(
                format!("Invalid base URL: {}", e),
                ErrorContext::new()
                    .with_field_path("base_url")
                    .with_details(self.base_url.clone()),
            )
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::configuration_with_context(
                format!("Unsupported base URL scheme '{}'", other),
                ErrorContext::new().with_field_path("base_url"),
            )),
        }
    }
}

use crate::client::core::MatsyaClient;
use crate::config::{ClientConfig, PollConfig};
use crate::Result;
use std::path::Path;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Starts from [`ClientConfig::default`]; call [`MatsyaClientBuilder::from_env`]
/// to start from the `MATSYA_*` environment instead.
#[derive(Debug, Clone, Default)]
pub struct MatsyaClientBuilder {
    config: ClientConfig,
}

impl MatsyaClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Self {
            config: ClientConfig::from_env(),
        }
    }

    /// Start from a YAML config file (environment overrides applied).
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            config: ClientConfig::from_yaml_file(path)?,
        })
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Override base URL (primarily for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn pool_max_idle_per_host(mut self, n: usize) -> Self {
        self.config.pool_max_idle_per_host = n;
        self
    }

    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.config.proxy_url = Some(url.into());
        self
    }

    /// Schedule used by [`MatsyaClient::ingest_and_track`].
    pub fn poll_config(mut self, poll: PollConfig) -> Self {
        self.config.poll = poll;
        self
    }

    /// Capacity of the channel between the socket reader and the consumer.
    pub fn stream_buffer(mut self, capacity: usize) -> Self {
        self.config.stream_buffer = capacity.max(1);
        self
    }

    pub fn build(self) -> Result<MatsyaClient> {
        MatsyaClient::new(self.config)
    }
}

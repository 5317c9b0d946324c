use crate::client::builder::MatsyaClientBuilder;
use crate::client::polling::JobStatusSource;
use crate::config::ClientConfig;
use crate::envelope::ApiResponse;
use crate::transport::{websocket_url, HttpTransport, StreamSubscription};
use crate::types::{HealthStatus, IngestionJob};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Client for the MATSYA backend.
///
/// Cheap to clone; clones share one connection pool. REST methods always
/// resolve to an [`ApiResponse`], client-side problems included.
#[derive(Debug, Clone)]
pub struct MatsyaClient {
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) config: Arc<ClientConfig>,
}

impl MatsyaClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        info!(base_url = %transport.base_url(), "MATSYA client ready");
        Ok(Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
        })
    }

    pub fn builder() -> MatsyaClientBuilder {
        MatsyaClientBuilder::new()
    }

    /// Defaults plus `MATSYA_*` environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    pub async fn health(&self) -> ApiResponse<HealthStatus> {
        self.transport.get(&["health"], None).await
    }

    /// Open the live update socket at `{base}/ws`.
    ///
    /// Unlike the REST methods this returns `Err` when the connection cannot
    /// be established, since there is no envelope to carry the failure.
    pub async fn subscribe(&self) -> Result<StreamSubscription> {
        let url = websocket_url(self.transport.base_url())?;
        StreamSubscription::connect(&url, self.config.stream_buffer).await
    }
}

#[async_trait]
impl JobStatusSource for MatsyaClient {
    async fn job_status(&self, job_id: &str) -> ApiResponse<IngestionJob> {
        self.ingestion_status(job_id).await
    }
}

/// Failure envelope for a request that never left the client.
pub(crate) fn rejected<T>(err: Error) -> ApiResponse<T> {
    debug!(error = %err, "request rejected before sending");
    ApiResponse::failure(err.into())
}

pub(crate) fn require_id(field: &str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::invalid_field(field, format!("{} must not be empty", field)));
    }
    Ok(())
}

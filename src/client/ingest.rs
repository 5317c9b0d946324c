//! Dataset ingestion endpoints.

use super::core::{rejected, require_id, MatsyaClient};
use super::polling::JobTracker;
use crate::envelope::ApiResponse;
use crate::types::{IngestionJob, IngestionRequest};
use std::sync::Arc;
use tracing::info;

impl MatsyaClient {
    /// Upload a dataset. The returned job is usually `queued` or `processing`.
    pub async fn ingest_data(&self, request: &IngestionRequest) -> ApiResponse<IngestionJob> {
        if let Err(e) = request.validate() {
            return rejected(e);
        }
        let form = match request.to_form() {
            Ok(form) => form,
            Err(e) => return rejected(e),
        };
        let response: ApiResponse<IngestionJob> =
            self.transport.post_multipart(&["data", "ingest"], form).await;
        if let Some(job) = response.data() {
            info!(
                job_id = %job.job_id,
                status = %job.status,
                format = request.format.as_str(),
                source = %request.metadata.source,
                "ingestion submitted"
            );
        }
        response
    }

    pub async fn ingestion_status(&self, job_id: &str) -> ApiResponse<IngestionJob> {
        if let Err(e) = require_id("jobId", job_id) {
            return rejected(e);
        }
        self.transport
            .get(&["data", "ingest", job_id, "status"], None)
            .await
    }

    /// Submit an ingestion and keep its status current in the background
    /// using the client's [`PollConfig`](crate::config::PollConfig).
    pub async fn ingest_and_track(&self, request: &IngestionRequest) -> ApiResponse<JobTracker> {
        let poll = self.config.poll.clone();
        let source = Arc::new(self.clone());
        self.ingest_data(request)
            .await
            .map(|job| JobTracker::spawn(source, job, poll))
    }
}

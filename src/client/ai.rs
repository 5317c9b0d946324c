//! Identification and analysis endpoints.

use super::core::{rejected, MatsyaClient};
use crate::envelope::ApiResponse;
use crate::types::{
    CorrelationRequest, CorrelationResult, EcosystemAnalysis, EcosystemAnalysisRequest,
    EdnaAnalysisRequest, IdentificationResult, SequenceMatchResult, SpeciesIdentificationRequest,
};
use tracing::debug;

impl MatsyaClient {
    /// Identify species in a base64-encoded image.
    pub async fn identify_species(
        &self,
        request: &SpeciesIdentificationRequest,
    ) -> ApiResponse<IdentificationResult> {
        if let Err(e) = request.validate() {
            return rejected(e);
        }
        let response: ApiResponse<IdentificationResult> = self
            .transport
            .post_json(&["ai", "identify-species"], request)
            .await;
        if let Some(result) = response.data() {
            debug!(
                image_type = %request.image_type,
                predictions = result.predictions.len(),
                "species identification finished"
            );
        }
        response
    }

    /// Match eDNA sequences against the reference database for their marker.
    pub async fn analyze_edna(
        &self,
        request: &EdnaAnalysisRequest,
    ) -> ApiResponse<SequenceMatchResult> {
        if let Err(e) = request.validate() {
            return rejected(e);
        }
        self.transport
            .post_json(&["ai", "edna-analysis"], request)
            .await
    }

    pub async fn correlate(&self, request: &CorrelationRequest) -> ApiResponse<CorrelationResult> {
        if let Err(e) = request.validate() {
            return rejected(e);
        }
        self.transport.post_json(&["ai", "correlate"], request).await
    }

    pub async fn analyze_ecosystem(
        &self,
        request: &EcosystemAnalysisRequest,
    ) -> ApiResponse<EcosystemAnalysis> {
        if let Err(e) = request.validate() {
            return rejected(e);
        }
        self.transport
            .post_json(&["analysis", "ecosystem"], request)
            .await
    }
}

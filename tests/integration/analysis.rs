//! Species identification, eDNA, correlation and ecosystem analysis

use crate::mock_server::MockServerFixture;
use matsya::types::{
    CorrelationMethod, CorrelationRequest, EcosystemAnalysisRequest, EcosystemAnalysisType,
    EdnaAnalysisRequest, ImageType, LocationFilter, Marker, SpeciesIdentificationRequest,
};
use matsya::{ApiResponse, API_ERROR_CODE};
use serde_json::json;

// 1x1 transparent PNG
const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

#[tokio::test]
async fn test_identify_species_with_no_predictions() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_post(
            "/api/v1/ai/identify-species",
            json!({"image": PIXEL, "imageType": "specimen"}),
            json!({"predictions": [], "modelVersion": "fishnet-3"}),
        )
        .await;

    let request = SpeciesIdentificationRequest::new(PIXEL, ImageType::Specimen);
    let response = fixture.client().identify_species(&request).await;

    mock.assert_async().await;
    assert!(response.is_success());
    let result = response.into_result().unwrap();
    assert_eq!(result.predictions.len(), 0);
    assert!(result.top_prediction().is_none());
}

#[tokio::test]
async fn test_identify_species_picks_top_prediction() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_post(
            "/api/v1/ai/identify-species",
            json!({"imageType": "otolith", "depth": 40.0}),
            json!({"predictions": [
                {"species": "Lutjanus argentimaculatus", "confidence": 0.41},
                {"species": "Epinephelus malabaricus", "confidence": 0.87,
                 "taxonomy": {"family": "Serranidae"}}
            ]}),
        )
        .await;

    let request =
        SpeciesIdentificationRequest::new(PIXEL, ImageType::Otolith).with_depth(40.0);
    let result = fixture
        .client()
        .identify_species(&request)
        .await
        .into_result()
        .unwrap();

    assert_eq!(
        result.top_prediction().unwrap().species,
        "Epinephelus malabaricus"
    );
}

#[tokio::test]
async fn test_empty_image_never_reaches_backend() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_unreachable("POST", "/api/v1/ai/identify-species")
        .await;

    let request = SpeciesIdentificationRequest::new("", ImageType::Underwater);
    match fixture.client().identify_species(&request).await {
        ApiResponse::Failure { error, .. } => assert_eq!(error.code, API_ERROR_CODE),
        other => panic!("expected rejection, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_edna_sequences_are_normalized_before_sending() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_post(
            "/api/v1/ai/edna-analysis",
            json!({
                "marker": "COI",
                "sequences": [{"id": "seq-1", "sequence": "ACGTNACGT"}]
            }),
            json!({
                "matches": [{
                    "sequenceId": "seq-1",
                    "species": "Sardinella longiceps",
                    "similarity": 0.98
                }]
            }),
        )
        .await;

    let request = EdnaAnalysisRequest::from_raw(Marker::Coi, &["acgt nacgt"]);
    let result = fixture
        .client()
        .analyze_edna(&request)
        .await
        .into_result()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.best_match().unwrap().similarity, 0.98);
    assert_eq!(result.matches_for("seq-1").len(), 1);
}

#[tokio::test]
async fn test_non_iupac_sequence_is_rejected() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_unreachable("POST", "/api/v1/ai/edna-analysis").await;

    let request = EdnaAnalysisRequest::from_raw(Marker::S12, &["ACGTXACGT"]);
    let error = fixture
        .client()
        .analyze_edna(&request)
        .await
        .into_result()
        .unwrap_err();

    assert_eq!(error.code, API_ERROR_CODE);
    assert!(error.message.contains('X'));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_correlation_request_body() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_post(
            "/api/v1/ai/correlate",
            json!({"variables": ["temperature", "abundance"], "method": "spearman"}),
            json!({
                "correlations": [
                    {"variableA": "temperature", "variableB": "abundance",
                     "coefficient": -0.62, "pValue": 0.003}
                ],
                "insights": ["Abundance drops as surface temperature rises"]
            }),
        )
        .await;

    let request = CorrelationRequest::new(["temperature", "abundance"])
        .with_method(CorrelationMethod::Spearman);
    let result = fixture
        .client()
        .correlate(&request)
        .await
        .into_result()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.significant(0.05).len(), 1);
}

#[tokio::test]
async fn test_ecosystem_analysis_posts_region() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_post(
            "/api/v1/analysis/ecosystem",
            json!({
                "analysisType": "biodiversity",
                "region": {"lat": 10.5, "lng": 72.6, "radius": 50.0}
            }),
            json!({"summary": "Lakshadweep reef diversity stable", "shannonIndex": 3.1}),
        )
        .await;

    let request = EcosystemAnalysisRequest::new(EcosystemAnalysisType::Biodiversity)
        .in_region(LocationFilter::new(10.5, 72.6, 50.0));
    let response = fixture.client().analyze_ecosystem(&request).await;

    mock.assert_async().await;
    assert!(response.is_success());
}

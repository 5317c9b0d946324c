//! Record, sensor, vessel, export and health endpoints

use crate::mock_server::MockServerFixture;
use matsya::types::{
    DateRange, ExportFormat, ExportRequest, MarineDataQuery, OceanographicQuery, VesselQuery,
};
use mockito::Matcher;
use serde_json::{json, Value};

#[tokio::test]
async fn test_location_filter_travels_as_one_json_string() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_query(
            "/api/v1/data/marine",
            Matcher::AllOf(vec![
                Matcher::UrlEncoded(
                    "location".into(),
                    r#"{"lat":1.0,"lng":2.0,"radius":5.0}"#.into(),
                ),
                Matcher::UrlEncoded("species".into(), "Sardinella longiceps".into()),
                Matcher::UrlEncoded("limit".into(), "20".into()),
                Matcher::UrlEncoded("offset".into(), "40".into()),
            ]),
            json!({
                "records": [
                    {"id": "occ-1", "scientificName": "Sardinella longiceps", "depth": 12.0},
                    {"id": "occ-2", "scientificName": "Sardinella longiceps", "habitat": "pelagic"}
                ],
                "total": 62,
                "limit": 20,
                "offset": 40
            }),
        )
        .await;

    let query = MarineDataQuery::new()
        .near(1.0, 2.0, 5.0)
        .species("Sardinella longiceps")
        .page(20, 40);
    let page = fixture
        .client()
        .marine_data(&query)
        .await
        .into_result()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.total, Some(62));
    assert!(page.has_more());
    assert_eq!(page.records[1].extra.get("habitat"), Some(&json!("pelagic")));
}

#[tokio::test]
async fn test_marine_data_accepts_bare_array() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_query(
            "/api/v1/data/marine",
            Matcher::UrlEncoded(
                "dateRange".into(),
                r#"{"end":"2023-12-31","start":"2023-01-01"}"#.into(),
            ),
            json!([{"id": "occ-9", "species": "Rastrelliger kanagurta"}]),
        )
        .await;

    let query = MarineDataQuery::new().between(DateRange::new("2023-01-01", "2023-12-31"));
    let page = fixture
        .client()
        .marine_data(&query)
        .await
        .into_result()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.records[0].id, "occ-9");
    assert!(!page.has_more());
}

#[tokio::test]
async fn test_oceanographic_parameters_are_json_encoded() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_query(
            "/api/v1/oceanographic",
            Matcher::UrlEncoded("parameters".into(), r#"["temperature","salinity"]"#.into()),
            json!([{"sensorId": "buoy-7", "temperature": 28.1, "salinity": 35.2}]),
        )
        .await;

    let query = OceanographicQuery::new()
        .parameter("temperature")
        .parameter("salinity");
    let readings = fixture
        .client()
        .oceanographic_data(&query)
        .await
        .into_result()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(readings[0].sensor_id.as_deref(), Some("buoy-7"));
    assert_eq!(readings[0].salinity, Some(35.2));
}

#[tokio::test]
async fn test_realtime_with_and_without_sensor() {
    let fixture = MockServerFixture::new().await;
    let all = fixture
        .mock_success_times(
            "GET",
            "/api/v1/oceanographic/realtime",
            json!([{"sensorId": "buoy-1"}, {"sensorId": "buoy-7"}]),
            1,
        )
        .await;
    let one = fixture
        .mock_success_times(
            "GET",
            "/api/v1/oceanographic/realtime/buoy-7",
            json!([{"sensorId": "buoy-7", "temperature": 27.9}]),
            1,
        )
        .await;

    let client = fixture.client();
    let every = client.realtime_oceanographic(None).await.into_result().unwrap();
    let single = client
        .realtime_oceanographic(Some("buoy-7"))
        .await
        .into_result()
        .unwrap();

    all.assert_async().await;
    one.assert_async().await;
    assert_eq!(every.len(), 2);
    assert_eq!(single[0].temperature, Some(27.9));
}

#[tokio::test]
async fn test_vessel_id_is_percent_encoded() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_success_times(
            "GET",
            "/api/v1/vessels/INS%20Sagar",
            json!({"id": "INS Sagar", "name": "INS Sagar", "status": "at-sea"}),
            1,
        )
        .await;

    let vessel = fixture
        .client()
        .vessel("INS Sagar")
        .await
        .into_result()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(vessel.status.as_deref(), Some("at-sea"));
}

#[tokio::test]
async fn test_vessel_listing_sends_filters() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_query(
            "/api/v1/vessels",
            Matcher::UrlEncoded("status".into(), "active".into()),
            json!([{"id": "v1", "name": "Sagar Sampada"}]),
        )
        .await;

    let query = VesselQuery {
        status: Some("active".into()),
        ..Default::default()
    };
    let vessels = fixture.client().vessels(&query).await.into_result().unwrap();

    mock.assert_async().await;
    assert_eq!(vessels[0].name, "Sagar Sampada");
}

#[tokio::test]
async fn test_export_filters_are_nested_json() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_post(
            "/api/v1/data/export",
            json!({
                "format": "dwc-a",
                "includeMetadata": true,
                "filters": {"species": "Thunnus albacares"}
            }),
            json!({"exportId": "exp-1", "downloadUrl": "https://files.example/exp-1.zip"}),
        )
        .await;

    let request = ExportRequest::new(ExportFormat::DwcA)
        .with_filters(MarineDataQuery::new().species("Thunnus albacares"));
    let export = fixture
        .client()
        .export_data(&request)
        .await
        .into_result()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        export.download_url.as_deref(),
        Some("https://files.example/exp-1.zip")
    );
}

#[tokio::test]
async fn test_health_reports_degraded_services() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_success(
            "GET",
            "/api/v1/health",
            json!({
                "status": "healthy",
                "version": "2.1.0",
                "services": {"database": "healthy", "ml": {"status": "degraded"}}
            }),
        )
        .await;

    let response = fixture.client().health().await;
    let metadata = response.metadata().cloned().unwrap();
    let health = response.into_result().unwrap();

    assert!(health.is_healthy());
    assert_eq!(health.degraded_services(), vec!["ml"]);
    assert_eq!(metadata.request_id.as_deref(), Some("req-1"));
}

#[tokio::test]
async fn test_envelope_without_data_is_accepted_for_unit_like_types() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_raw("GET", "/api/v1/health", 200, r#"{"success": true}"#)
        .await;

    let client = fixture.client();
    let response = client.health().await;
    assert!(!response.is_success());

    let raw: matsya::ApiResponse<Option<Value>> =
        matsya::ApiResponse::from_http(200, r#"{"success": true}"#);
    assert_eq!(raw.into_result().unwrap(), None);
}

//! Ingestion upload and job tracking

use crate::mock_server::{fast_poll, job, success_body, MockServerFixture};
use matsya::types::{DataFormat, IngestionMetadata, IngestionRequest, JobStatus};
use matsya::{ApiResponse, PollOutcome, API_ERROR_CODE};
use mockito::Matcher;

const INGEST_PATH: &str = "/api/v1/data/ingest";
const STATUS_PATH: &str = "/api/v1/data/ingest/job-42/status";

fn ten_row_csv() -> Vec<u8> {
    let mut csv = String::from("species,latitude,longitude,date\n");
    for i in 0..10 {
        csv.push_str(&format!(
            "Sardinella longiceps,{:.2},76.20,2024-01-{:02}\n",
            9.0 + i as f64 / 10.0,
            i + 1
        ));
    }
    csv.into_bytes()
}

fn csv_request() -> IngestionRequest {
    IngestionRequest::file(
        "survey.csv",
        ten_row_csv(),
        DataFormat::Csv,
        IngestionMetadata::new("Test", "Lab"),
    )
}

#[tokio::test]
async fn test_csv_upload_is_multipart_without_json_content_type() {
    let fixture = MockServerFixture::new().await;
    let upload = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", INGEST_PATH)
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_header("x-request-id", Matcher::Regex("^[0-9a-f-]{36}$".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="survey.csv""#.to_string()),
                Matcher::Regex(r#"name="format"\r\n\r\ncsv"#.to_string()),
                Matcher::Regex(r#""source":"Test""#.to_string()),
                Matcher::Regex("Sardinella longiceps,9.90".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(success_body(job("job-42", "queued", 0)))
            .expect(1)
            .create_async()
            .await
    };

    let client = fixture.client();
    let response = client.ingest_data(&csv_request()).await;

    upload.assert_async().await;
    let submitted = response.into_result().unwrap();
    assert_eq!(submitted.job_id, "job-42");
    assert_eq!(submitted.status, JobStatus::Queued);
}

#[tokio::test]
async fn test_tracking_stops_at_completed() {
    let fixture = MockServerFixture::new().await;
    let _upload = fixture
        .mock_success("POST", INGEST_PATH, job("job-42", "processing", 0))
        .await;
    let processing = fixture
        .mock_success_times("GET", STATUS_PATH, job("job-42", "processing", 4), 2)
        .await;
    let completed = fixture
        .mock_success_times("GET", STATUS_PATH, job("job-42", "completed", 10), 1)
        .await;

    let client = fixture.client();
    let tracker = client.ingest_and_track(&csv_request()).await.into_result().unwrap();
    assert_eq!(tracker.job_id(), "job-42");

    match tracker.wait().await {
        PollOutcome::Completed(job) => {
            assert_eq!(job.records_processed, 10);
            assert_eq!(job.status, JobStatus::Completed);
        }
        other => panic!("expected completion, got {:?}", other),
    }
    processing.assert_async().await;
    completed.assert_async().await;
}

#[tokio::test]
async fn test_tracking_stops_after_max_attempts() {
    let fixture = MockServerFixture::new().await;
    let _upload = fixture
        .mock_success("POST", INGEST_PATH, job("job-42", "queued", 0))
        .await;
    let status = fixture
        .mock_success_times("GET", STATUS_PATH, job("job-42", "processing", 1), 3)
        .await;

    let client = fixture.client_with_poll(fast_poll(3));
    let tracker = client.ingest_and_track(&csv_request()).await.into_result().unwrap();

    match tracker.wait().await {
        PollOutcome::Exhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            assert_eq!(last.unwrap().status, JobStatus::Processing);
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
    status.assert_async().await;
}

#[tokio::test]
async fn test_failed_status_check_does_not_end_tracking() {
    let fixture = MockServerFixture::new().await;
    let _upload = fixture
        .mock_success("POST", INGEST_PATH, job("job-42", "processing", 0))
        .await;
    let broken = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", STATUS_PATH)
            .with_status(503)
            .with_body("upstream unavailable")
            .expect(1)
            .create_async()
            .await
    };
    let failed = fixture
        .mock_success_times("GET", STATUS_PATH, job("job-42", "failed", 3), 1)
        .await;

    let client = fixture.client();
    let tracker = client.ingest_and_track(&csv_request()).await.into_result().unwrap();

    assert!(matches!(tracker.wait().await, PollOutcome::Failed(ref j) if j.records_processed == 3));
    broken.assert_async().await;
    failed.assert_async().await;
}

#[tokio::test]
async fn test_already_terminal_job_is_not_polled() {
    let fixture = MockServerFixture::new().await;
    let _upload = fixture
        .mock_success("POST", INGEST_PATH, job("job-42", "completed", 10))
        .await;
    let status = fixture.mock_unreachable("GET", STATUS_PATH).await;

    let client = fixture.client();
    let tracker = client.ingest_and_track(&csv_request()).await.into_result().unwrap();

    assert!(matches!(tracker.wait().await, PollOutcome::Completed(_)));
    status.assert_async().await;
}

#[tokio::test]
async fn test_invalid_metadata_is_rejected_before_upload() {
    let fixture = MockServerFixture::new().await;
    let upload = fixture.mock_unreachable("POST", INGEST_PATH).await;

    let request = IngestionRequest::file(
        "survey.csv",
        ten_row_csv(),
        DataFormat::Csv,
        IngestionMetadata::new("", "Lab"),
    );
    let response = fixture.client().ingest_data(&request).await;

    match response {
        ApiResponse::Failure { error, .. } => {
            assert_eq!(error.code, API_ERROR_CODE);
            assert!(error.message.contains("source"));
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
    upload.assert_async().await;
}

#[tokio::test]
async fn test_status_lookup_passes_backend_error_through() {
    let fixture = MockServerFixture::new().await;
    let _missing = fixture
        .mock_failure(
            "GET",
            "/api/v1/data/ingest/job-404/status",
            404,
            "JOB_NOT_FOUND",
            "No such job",
        )
        .await;

    let error = fixture
        .client()
        .ingestion_status("job-404")
        .await
        .into_result()
        .unwrap_err();
    assert_eq!(error.code, "JOB_NOT_FOUND");
    assert_eq!(error.message, "No such job");
}

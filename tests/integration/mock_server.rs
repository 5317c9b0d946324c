//! Mock HTTP server setup for integration tests

use matsya::{MatsyaClient, MatsyaClientBuilder, PollConfig};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Client pointed at the mock server, polling every few milliseconds
    pub fn client(&self) -> MatsyaClient {
        self.client_with_poll(fast_poll(10))
    }

    pub fn client_with_poll(&self, poll: PollConfig) -> MatsyaClient {
        MatsyaClientBuilder::new()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(5))
            .poll_config(poll)
            .build()
            .expect("client should build against mock server")
    }

    /// Mock answering with a success envelope wrapping `data`
    pub async fn mock_success(&self, method: &str, path: &str, data: Value) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(success_body(data))
            .create_async()
            .await
    }

    /// Mock answering with a success envelope, called exactly `hits` times
    pub async fn mock_success_times(
        &self,
        method: &str,
        path: &str,
        data: Value,
        hits: usize,
    ) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(success_body(data))
            .expect(hits)
            .create_async()
            .await
    }

    /// Mock answering with a backend failure envelope
    pub async fn mock_failure(
        &self,
        method: &str,
        path: &str,
        status: usize,
        code: &str,
        message: &str,
    ) -> Mock {
        let mut server = self.server.lock().await;
        let body = json!({
            "success": false,
            "error": {"code": code, "message": message},
            "metadata": {"timestamp": "2024-03-01T10:00:00Z", "version": "1.0.0"}
        });
        server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Mock with an arbitrary status and raw body
    pub async fn mock_raw(&self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(status)
            .with_body(body)
            .create_async()
            .await
    }

    /// Mock matching `matcher` against the query string
    pub async fn mock_query(&self, path: &str, matcher: Matcher, data: Value) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("GET", path)
            .match_query(matcher)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(success_body(data))
            .expect(1)
            .create_async()
            .await
    }

    /// Mock matching a JSON request body that contains `partial`
    pub async fn mock_json_post(&self, path: &str, partial: Value, data: Value) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(partial))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(success_body(data))
            .expect(1)
            .create_async()
            .await
    }

    /// Mock that must never be hit
    pub async fn mock_unreachable(&self, method: &str, path: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .with_status(500)
            .expect(0)
            .create_async()
            .await
    }
}

pub fn fast_poll(max_attempts: u32) -> PollConfig {
    PollConfig::new(Duration::from_millis(10), Duration::from_millis(10), max_attempts)
}

pub fn success_body(data: Value) -> String {
    json!({
        "success": true,
        "data": data,
        "metadata": {
            "timestamp": "2024-03-01T10:00:00Z",
            "version": "1.0.0",
            "requestId": "req-1",
            "processingTime": 12.5
        }
    })
    .to_string()
}

pub fn job(job_id: &str, status: &str, processed: u64) -> Value {
    json!({
        "jobId": job_id,
        "status": status,
        "recordsProcessed": processed,
        "recordsValid": processed,
        "recordsInvalid": 0,
        "errors": []
    })
}

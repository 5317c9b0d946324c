//! HTTP transport.

use super::query::QueryParams;
use super::TransportError;
use crate::config::ClientConfig;
use crate::envelope::ApiResponse;
use crate::{Error, ErrorContext, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, Proxy, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

const JSON: &str = "application/json";

/// Correlation header attached to every request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP layer: one pooled reqwest client bound to `{base}/api/v1`.
///
/// Every call resolves to an [`ApiResponse`]; nothing here returns `Err`
/// once the transport is built.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    api_base: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.parsed_base_url()?;
        let api_base = join_segments(&base_url, &["api", "v1"])?;

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Some(proxy_url) = &config.proxy_url {
            let proxy = Proxy::all(proxy_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("Invalid proxy URL: {}", e),
                    ErrorContext::new().with_field_path("proxy_url"),
                )
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            base_url,
            api_base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/v1/<segments...>`, each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.api_base, segments)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: Option<&QueryParams>,
    ) -> ApiResponse<T> {
        let url = match self.endpoint(segments) {
            Ok(url) => url,
            Err(e) => return ApiResponse::failure(e.into()),
        };
        let mut request = self
            .client
            .get(url.clone())
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON);
        if let Some(params) = query.filter(|q| !q.is_empty()) {
            request = request.query(params.as_pairs());
        }
        self.execute(Method::GET, url, request).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> ApiResponse<T> {
        let url = match self.endpoint(segments) {
            Ok(url) => url,
            Err(e) => return ApiResponse::failure(e.into()),
        };
        // Headers go first: `json()` only fills Content-Type when absent.
        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .json(body);
        self.execute(Method::POST, url, request).await
    }

    /// Multipart upload. No Content-Type is set here so reqwest can add the
    /// boundary itself.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        form: Form,
    ) -> ApiResponse<T> {
        let url = match self.endpoint(segments) {
            Ok(url) => url,
            Err(e) => return ApiResponse::failure(e.into()),
        };
        let request = self
            .client
            .post(url.clone())
            .header(ACCEPT, JSON)
            .multipart(form);
        self.execute(Method::POST, url, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        request: RequestBuilder,
    ) -> ApiResponse<T> {
        let request_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        debug!(%method, path = url.path(), request_id = %request_id, "sending request");

        let response = match request
            .header(REQUEST_ID_HEADER, request_id.as_str())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(%method, path = url.path(), request_id = %request_id, error = %e, "request failed");
                return ApiResponse::failure(Error::Transport(TransportError::Http(e)).into());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(%method, path = url.path(), request_id = %request_id, error = %e, "failed to read response body");
                return ApiResponse::failure(Error::Transport(TransportError::Http(e)).into());
            }
        };

        let parsed = ApiResponse::from_http(status.as_u16(), &body);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match parsed.error() {
            None => debug!(
                %method,
                path = url.path(),
                request_id = %request_id,
                status = status.as_u16(),
                elapsed_ms,
                "request succeeded"
            ),
            Some(err) => warn!(
                %method,
                path = url.path(),
                request_id = %request_id,
                status = status.as_u16(),
                elapsed_ms,
                code = %err.code,
                message = %err.message,
                "request returned failure"
            ),
        }
        parsed
    }
}

pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            Error::configuration_with_context(
                "base URL cannot carry a path",
                ErrorContext::new().with_details(base.to_string()),
            )
        })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

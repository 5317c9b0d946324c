//! Uniform response envelope returned by every backend call.
//!
//! On the wire the backend answers with
//! `{ success, data?, error?: { code, message, details? }, metadata? }`.
//! The client parses that shape once and hands callers a tagged
//! [`ApiResponse`], so "success without data" and "failure without error"
//! can no longer be represented.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The single code the client uses for failures it produces itself
/// (network errors, non-success statuses, malformed bodies, invalid requests).
pub const API_ERROR_CODE: &str = "API_ERROR";

const BODY_SNIPPET_LIMIT: usize = 200;

/// Error payload of a failed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// A client-side failure with the generic `API_ERROR` code.
    ///
    /// The message is never empty.
    pub fn api_error(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        };
        Self::new(API_ERROR_CODE, message)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_client_side(&self) -> bool {
        self.code == API_ERROR_CODE
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        ApiError::api_error(err.to_string())
    }
}

/// Server-side bookkeeping attached to a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Milliseconds spent by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

/// Result of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success {
        data: T,
        metadata: Option<ResponseMetadata>,
    },
    Failure {
        error: ApiError,
        metadata: Option<ResponseMetadata>,
    },
}

#[derive(Deserialize)]
struct WireEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default)]
    metadata: Option<ResponseMetadata>,
}

#[derive(Serialize)]
struct WireEnvelopeRef<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ApiError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a ResponseMetadata>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse::Success {
            data,
            metadata: None,
        }
    }

    pub fn failure(error: ApiError) -> Self {
        ApiResponse::Failure {
            error,
            metadata: None,
        }
    }

    /// Failure with the generic `API_ERROR` code.
    pub fn api_error(message: impl Into<String>) -> Self {
        Self::failure(ApiError::api_error(message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success { data, .. } => Some(data),
            ApiResponse::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            ApiResponse::Success { .. } => None,
            ApiResponse::Failure { error, .. } => Some(error),
        }
    }

    pub fn metadata(&self) -> Option<&ResponseMetadata> {
        match self {
            ApiResponse::Success { metadata, .. } | ApiResponse::Failure { metadata, .. } => {
                metadata.as_ref()
            }
        }
    }

    pub fn into_result(self) -> std::result::Result<T, ApiError> {
        match self {
            ApiResponse::Success { data, .. } => Ok(data),
            ApiResponse::Failure { error, .. } => Err(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            ApiResponse::Success { data, metadata } => ApiResponse::Success {
                data: f(data),
                metadata,
            },
            ApiResponse::Failure { error, metadata } => ApiResponse::Failure { error, metadata },
        }
    }
}

impl<T> From<crate::Result<T>> for ApiResponse<T> {
    fn from(result: crate::Result<T>) -> Self {
        match result {
            Ok(data) => ApiResponse::success(data),
            Err(e) => ApiResponse::failure(e.into()),
        }
    }
}

impl<T: serde::de::DeserializeOwned> ApiResponse<T> {
    /// Interpret an HTTP status and raw body as an envelope.
    ///
    /// A well-formed failure envelope is passed through unchanged whatever the
    /// status; everything else that is not a 2xx success envelope becomes an
    /// `API_ERROR` failure.
    pub fn from_http(status: u16, body: &str) -> Self {
        let ok_status = (200..300).contains(&status);
        let wire = match serde_json::from_str::<WireEnvelope>(body) {
            Ok(wire) => wire,
            Err(e) if ok_status => {
                return Self::api_error(format!("Malformed response body: {}", e));
            }
            Err(_) => {
                return Self::api_error(format!(
                    "HTTP error {}: {}",
                    status,
                    snippet(body)
                ));
            }
        };

        if !wire.success {
            let error = wire
                .error
                .unwrap_or_else(|| ApiError::api_error(format!("Request failed (HTTP {})", status)));
            return ApiResponse::Failure {
                error,
                metadata: wire.metadata,
            };
        }

        if !ok_status {
            return ApiResponse::Failure {
                error: ApiError::api_error(format!("HTTP error {}: {}", status, snippet(body))),
                metadata: wire.metadata,
            };
        }

        match serde_json::from_value::<T>(wire.data.unwrap_or(Value::Null)) {
            Ok(data) => ApiResponse::Success {
                data,
                metadata: wire.metadata,
            },
            Err(e) => ApiResponse::Failure {
                error: ApiError::api_error(format!("Malformed response data: {}", e)),
                metadata: wire.metadata,
            },
        }
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            ApiResponse::Success { data, metadata } => WireEnvelopeRef {
                success: true,
                data: Some(data),
                error: None,
                metadata: metadata.as_ref(),
            },
            ApiResponse::Failure { error, metadata } => WireEnvelopeRef {
                success: false,
                data: None,
                error: Some(error),
                metadata: metadata.as_ref(),
            },
        };
        wire.serialize(serializer)
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    match trimmed.char_indices().nth(BODY_SNIPPET_LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

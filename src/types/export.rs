//! Dataset export and service health.

use super::marine::MarineDataQuery;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "dwc-a")]
    DwcA,
    #[serde(rename = "netcdf")]
    NetCdf,
}

impl std::str::FromStr for ExportFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "dwc-a" | "dwca" => Ok(ExportFormat::DwcA),
            "netcdf" | "nc" => Ok(ExportFormat::NetCdf),
            other => Err(crate::Error::invalid_field(
                "format",
                format!("unknown export format '{}'", other),
            )),
        }
    }
}

/// Body of `POST /data/export`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Sent as a nested JSON object, not query-encoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<MarineDataQuery>,
    pub include_metadata: bool,
}

impl ExportRequest {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            data_type: None,
            filters: None,
            include_metadata: true,
        }
    }

    pub fn with_filters(mut self, filters: MarineDataQuery) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn validate(&self) -> crate::Result<()> {
        match &self.filters {
            Some(filters) => filters.validate(),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
    /// Per-dependency status as reported by the backend.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(
            self.status.to_ascii_lowercase().as_str(),
            "healthy" | "ok" | "up"
        )
    }

    /// Dependencies whose status is not healthy. A service entry may be a bare
    /// status string or an object with a `status` field.
    pub fn degraded_services(&self) -> Vec<&str> {
        self.services
            .iter()
            .filter(|(_, v)| {
                let status = v
                    .as_str()
                    .or_else(|| v.get("status").and_then(|s| s.as_str()))
                    .unwrap_or("");
                !matches!(status.to_ascii_lowercase().as_str(), "healthy" | "ok" | "up")
            })
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

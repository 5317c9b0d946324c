//! Data ingestion requests and job snapshots.

use super::common::Coordinates;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Format discriminator of an uploaded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFormat {
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "json")]
    Json,
    /// Darwin Core Archive.
    #[serde(rename = "dwc-a")]
    DwcA,
    /// OBIS event/occurrence/extended-measurement package.
    #[serde(rename = "obis-env")]
    ObisEnv,
}

impl DataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Json => "json",
            DataFormat::DwcA => "dwc-a",
            DataFormat::ObisEnv => "obis-env",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            DataFormat::Csv => "text/csv",
            DataFormat::Json => "application/json",
            DataFormat::DwcA => "application/zip",
            DataFormat::ObisEnv => "application/octet-stream",
        }
    }

    /// Guess from a file extension; archives are assumed to be Darwin Core.
    pub fn from_extension(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "tsv" => Some(DataFormat::Csv),
            "json" | "geojson" => Some(DataFormat::Json),
            "zip" => Some(DataFormat::DwcA),
            _ => None,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(DataFormat::Csv),
            "json" => Ok(DataFormat::Json),
            "dwc-a" | "dwca" => Ok(DataFormat::DwcA),
            "obis-env" | "obis" => Ok(DataFormat::ObisEnv),
            other => Err(Error::invalid_field(
                "format",
                format!("unknown data format '{}' (expected csv, json, dwc-a or obis-env)", other),
            )),
        }
    }
}

/// Provenance attached to an upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionMetadata {
    pub source: String,
    pub contributor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl IngestionMetadata {
    pub fn new(source: impl Into<String>, contributor: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            contributor: contributor.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: Coordinates) -> Self {
        self.location = Some(location);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(Error::invalid_field("metadata.source", "must not be empty"));
        }
        if self.contributor.trim().is_empty() {
            return Err(Error::invalid_field("metadata.contributor", "must not be empty"));
        }
        if let Some(location) = &self.location {
            location.validate()?;
        }
        Ok(())
    }
}

/// Source column -> target (Darwin Core) term.
pub type FieldMapping = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOptions {
    #[serde(default)]
    pub strict_mode: bool,
    #[serde(default)]
    pub skip_invalid_rows: bool,
    #[serde(default)]
    pub require_coordinates: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_errors: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngestionPayload {
    File { file_name: String, content: Bytes },
    Inline(String),
}

/// A dataset upload, sent as multipart form data.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionRequest {
    pub payload: IngestionPayload,
    pub format: DataFormat,
    pub metadata: IngestionMetadata,
    pub field_mapping: Option<FieldMapping>,
    pub validation_options: Option<ValidationOptions>,
}

impl IngestionRequest {
    pub fn file(
        file_name: impl Into<String>,
        content: impl Into<Bytes>,
        format: DataFormat,
        metadata: IngestionMetadata,
    ) -> Self {
        Self {
            payload: IngestionPayload::File {
                file_name: file_name.into(),
                content: content.into(),
            },
            format,
            metadata,
            field_mapping: None,
            validation_options: None,
        }
    }

    pub fn inline(data: impl Into<String>, format: DataFormat, metadata: IngestionMetadata) -> Self {
        Self {
            payload: IngestionPayload::Inline(data.into()),
            format,
            metadata,
            field_mapping: None,
            validation_options: None,
        }
    }

    /// Read a dataset from disk. The format is taken from `format` or guessed
    /// from the extension.
    pub async fn from_path(
        path: impl AsRef<Path>,
        format: Option<DataFormat>,
        metadata: IngestionMetadata,
    ) -> Result<Self> {
        let path = path.as_ref();
        let format = match format.or_else(|| DataFormat::from_extension(path)) {
            Some(f) => f,
            None => {
                return Err(Error::validation_with_context(
                    "cannot infer data format from file extension",
                    ErrorContext::new()
                        .with_field_path("format")
                        .with_details(path.display().to_string()),
                ))
            }
        };
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(Self::file(file_name, content, format, metadata))
    }

    pub fn with_field_mapping(mut self, mapping: FieldMapping) -> Self {
        self.field_mapping = Some(mapping);
        self
    }

    pub fn with_validation_options(mut self, options: ValidationOptions) -> Self {
        self.validation_options = Some(options);
        self
    }

    pub fn validate(&self) -> Result<()> {
        match &self.payload {
            IngestionPayload::File { file_name, content } => {
                if file_name.trim().is_empty() {
                    return Err(Error::invalid_field("file", "file name must not be empty"));
                }
                if content.is_empty() {
                    return Err(Error::invalid_field("file", "file is empty"));
                }
            }
            IngestionPayload::Inline(data) => {
                if data.trim().is_empty() {
                    return Err(Error::invalid_field("data", "inline data must not be empty"));
                }
            }
        }
        self.metadata.validate()
    }

    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut form = match &self.payload {
            IngestionPayload::File { file_name, content } => {
                let part = Part::bytes(content.to_vec())
                    .file_name(file_name.clone())
                    .mime_str(self.format.mime_type())
                    .map_err(|e| Error::configuration(format!("Invalid mime: {}", e)))?;
                Form::new().part("file", part)
            }
            IngestionPayload::Inline(data) => Form::new().text("data", data.clone()),
        };
        form = form
            .text("format", self.format.as_str())
            .text("metadata", serde_json::to_string(&self.metadata)?);
        if let Some(mapping) = &self.field_mapping {
            form = form.text("fieldMapping", serde_json::to_string(mapping)?);
        }
        if let Some(options) = &self.validation_options {
            form = form.text("validationOptions", serde_json::to_string(options)?);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One row-level problem reported by the backend validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(default)]
    pub row: u64,
    #[serde(default)]
    pub field: String,
    pub message: String,
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

fn default_severity() -> Severity {
    Severity::Error
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completeness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Server-side snapshot of an ingestion job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionJob {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub records_processed: u64,
    #[serde(default)]
    pub records_valid: u64,
    #[serde(default)]
    pub records_invalid: u64,
    #[serde(default)]
    pub errors: Vec<ValidationIssue>,
    /// Milliseconds spent so far.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality_report: Option<DataQualityReport>,
}

impl IngestionJob {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn error_count(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .count()
    }
}

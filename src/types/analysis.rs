//! Cross-dataset correlation and ecosystem analysis.

use super::common::{DateRange, LocationFilter};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
    Kendall,
}

/// Body of `POST /ai/correlate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationRequest {
    #[serde(default)]
    pub datasets: Vec<String>,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<CorrelationMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<LocationFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl CorrelationRequest {
    pub fn new(variables: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_datasets(mut self, datasets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.datasets = datasets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_method(mut self, method: CorrelationMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(region) = &self.region {
            region.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    pub variable_a: String,
    pub variable_b: String,
    pub coefficient: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    #[serde(default)]
    pub correlations: Vec<Correlation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CorrelationResult {
    /// Pairs whose p-value is below `alpha`, strongest first.
    pub fn significant(&self, alpha: f64) -> Vec<&Correlation> {
        let mut out: Vec<&Correlation> = self
            .correlations
            .iter()
            .filter(|c| c.p_value.map(|p| p < alpha).unwrap_or(false))
            .collect();
        out.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EcosystemAnalysisType {
    Biodiversity,
    FoodWeb,
    HealthIndex,
    Trends,
}

/// Body of `POST /analysis/ecosystem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemAnalysisRequest {
    pub analysis_type: EcosystemAnalysisType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<LocationFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub species: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl EcosystemAnalysisRequest {
    pub fn new(analysis_type: EcosystemAnalysisType) -> Self {
        Self {
            analysis_type,
            region: None,
            date_range: None,
            species: Vec::new(),
            parameters: None,
        }
    }

    pub fn in_region(mut self, region: LocationFilter) -> Self {
        self.region = Some(region);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(region) = &self.region {
            region.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcosystemAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biodiversity_index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species_richness: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub findings: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

//! Oceanographic sensor readings.

use super::common::{Coordinates, DateRange, DepthRange, LocationFilter};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OceanographicQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_range: Option<DepthRange>,
    /// Measured variables to return, e.g. `temperature`, `salinity`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl OceanographicQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn near(mut self, lat: f64, lng: f64, radius_km: f64) -> Self {
        self.location = Some(LocationFilter::new(lat, lng, radius_km));
        self
    }

    pub fn parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(location) = &self.location {
            location.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OceanographicReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    /// Degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// PSU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salinity: Option<f64>,
    /// mg/L.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dissolved_oxygen: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chlorophyll: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

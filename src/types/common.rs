//! Shared filter and location types.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from two optional form values.
    ///
    /// Both absent is fine (`Ok(None)`); exactly one present is rejected.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Result<Option<Self>> {
        match (latitude, longitude) {
            (None, None) => Ok(None),
            (Some(lat), Some(lng)) => {
                let coords = Self::new(lat, lng);
                coords.validate()?;
                Ok(Some(coords))
            }
            (Some(_), None) => Err(Error::invalid_field(
                "longitude",
                "latitude and longitude must be provided together",
            )),
            (None, Some(_)) => Err(Error::invalid_field(
                "latitude",
                "latitude and longitude must be provided together",
            )),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() {
            return Err(Error::invalid_field("latitude", "must be a finite number"));
        }
        if !self.longitude.is_finite() {
            return Err(Error::invalid_field("longitude", "must be a finite number"));
        }
        Ok(())
    }
}

/// Circular search area; `radius` is in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFilter {
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
}

impl LocationFilter {
    pub fn new(lat: f64, lng: f64, radius: f64) -> Self {
        Self { lat, lng, radius }
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    pub fn validate(&self) -> Result<()> {
        self.center().validate()
    }
}

/// Inclusive date window, ISO-8601 dates as the backend expects them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}

/// Depth window in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl DepthRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

//! Image-based species identification.

use super::common::Coordinates;
use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Specimen,
    Underwater,
    Otolith,
    Plankton,
    Microscopy,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Specimen => "specimen",
            ImageType::Underwater => "underwater",
            ImageType::Otolith => "otolith",
            ImageType::Plankton => "plankton",
            ImageType::Microscopy => "microscopy",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "specimen" => Ok(ImageType::Specimen),
            "underwater" => Ok(ImageType::Underwater),
            "otolith" => Ok(ImageType::Otolith),
            "plankton" => Ok(ImageType::Plankton),
            "microscopy" => Ok(ImageType::Microscopy),
            other => Err(Error::invalid_field(
                "imageType",
                format!("unknown image type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesIdentificationRequest {
    /// Base64 image, optionally as a `data:` URL.
    pub image: String,
    pub image_type: ImageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl SpeciesIdentificationRequest {
    pub fn new(image_base64: impl Into<String>, image_type: ImageType) -> Self {
        Self {
            image: image_base64.into(),
            image_type,
            location: None,
            depth: None,
            max_results: None,
            metadata: None,
        }
    }

    pub fn from_image_bytes(bytes: &[u8], image_type: ImageType) -> Self {
        Self::new(STANDARD.encode(bytes), image_type)
    }

    pub fn with_location(mut self, location: Coordinates) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_depth(mut self, depth: f64) -> Self {
        self.depth = Some(depth);
        self
    }

    /// The base64 payload without any `data:<mime>;base64,` prefix.
    pub fn image_payload(&self) -> &str {
        let image = self.image.trim();
        if image.starts_with("data:") {
            if let Some((_, payload)) = image.split_once(',') {
                return payload;
            }
        }
        image
    }

    pub fn validate(&self) -> Result<()> {
        let payload = self.image_payload();
        if payload.is_empty() {
            return Err(Error::invalid_field("image", "image must not be empty"));
        }
        let decoded = STANDARD
            .decode(payload)
            .map_err(|e| Error::invalid_field("image", format!("image is not valid base64: {}", e)))?;
        if decoded.is_empty() {
            return Err(Error::invalid_field("image", "image must not be empty"));
        }
        if let Some(location) = &self.location {
            location.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kingdom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phylum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesPrediction {
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    /// In [0, 1].
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy: Option<Taxonomy>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationResult {
    #[serde(default)]
    pub predictions: Vec<SpeciesPrediction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl IdentificationResult {
    pub fn top_prediction(&self) -> Option<&SpeciesPrediction> {
        self.predictions
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }
}

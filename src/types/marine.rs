//! Marine occurrence records.

use super::common::{Coordinates, DateRange, DepthRange, LocationFilter};
use crate::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Filters for `GET /data/marine`.
///
/// Object-valued fields (`location`, `dateRange`, `depthRange`, and anything in
/// `extra` that is not a primitive) travel as JSON strings in the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarineDataQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth_range: Option<DepthRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MarineDataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn near(mut self, lat: f64, lng: f64, radius_km: f64) -> Self {
        self.location = Some(LocationFilter::new(lat, lng, radius_km));
        self
    }

    pub fn species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn between(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn depth(mut self, range: DepthRange) -> Self {
        self.depth_range = Some(range);
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Any extra backend parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(location) = &self.location {
            location.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarineRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abundance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One page of records. The backend may answer with a bare array or with
/// `{ records | items, total?, limit?, offset? }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarineDataPage {
    pub records: Vec<MarineRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr {
    Bare(Vec<MarineRecord>),
    Paged {
        #[serde(alias = "items")]
        records: Vec<MarineRecord>,
        #[serde(default)]
        total: Option<u64>,
        #[serde(default)]
        limit: Option<u32>,
        #[serde(default)]
        offset: Option<u32>,
    },
}

impl<'de> Deserialize<'de> for MarineDataPage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match PageRepr::deserialize(deserializer)? {
            PageRepr::Bare(records) => MarineDataPage {
                records,
                ..Default::default()
            },
            PageRepr::Paged {
                records,
                total,
                limit,
                offset,
            } => MarineDataPage {
                records,
                total,
                limit,
                offset,
            },
        })
    }
}

impl MarineDataPage {
    pub fn has_more(&self) -> bool {
        match (self.total, self.offset) {
            (Some(total), Some(offset)) => (offset as u64 + self.records.len() as u64) < total,
            (Some(total), None) => (self.records.len() as u64) < total,
            _ => false,
        }
    }
}

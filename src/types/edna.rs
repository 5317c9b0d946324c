//! Environmental DNA sequence matching.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// IUPAC nucleotide codes accepted in a sequence (case-insensitive).
const IUPAC_CODES: &str = "ACGTURYSWKMBDHVN";

/// Genetic locus selecting the reference database comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marker {
    #[serde(rename = "12S")]
    S12,
    #[serde(rename = "16S")]
    S16,
    #[serde(rename = "18S")]
    S18,
    #[serde(rename = "COI")]
    Coi,
    #[serde(rename = "ITS")]
    Its,
    #[serde(rename = "cytb")]
    CytB,
}

impl Marker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::S12 => "12S",
            Marker::S16 => "16S",
            Marker::S18 => "18S",
            Marker::Coi => "COI",
            Marker::Its => "ITS",
            Marker::CytB => "cytb",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Marker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "12S" => Ok(Marker::S12),
            "16S" => Ok(Marker::S16),
            "18S" => Ok(Marker::S18),
            "COI" | "CO1" => Ok(Marker::Coi),
            "ITS" => Ok(Marker::Its),
            "CYTB" => Ok(Marker::CytB),
            other => Err(Error::invalid_field("marker", format!("unknown marker '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnaSequence {
    pub id: String,
    pub sequence: String,
}

impl DnaSequence {
    /// Whitespace is removed and bases upper-cased.
    pub fn new(id: impl Into<String>, sequence: &str) -> Self {
        Self {
            id: id.into(),
            sequence: normalize_sequence(sequence),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

pub fn normalize_sequence(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdnaAnalysisRequest {
    pub sequences: Vec<DnaSequence>,
    pub marker: Marker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_metadata: Option<Value>,
}

impl EdnaAnalysisRequest {
    pub fn new(marker: Marker) -> Self {
        Self {
            sequences: Vec::new(),
            marker,
            min_similarity: None,
            max_results: None,
            database: None,
            sample_metadata: None,
        }
    }

    /// Sequences get ids `seq-1`, `seq-2`, ...
    pub fn from_raw<S: AsRef<str>>(marker: Marker, raw: &[S]) -> Self {
        let mut req = Self::new(marker);
        for (i, s) in raw.iter().enumerate() {
            req.sequences
                .push(DnaSequence::new(format!("seq-{}", i + 1), s.as_ref()));
        }
        req
    }

    pub fn add_sequence(mut self, id: impl Into<String>, sequence: &str) -> Self {
        self.sequences.push(DnaSequence::new(id, sequence));
        self
    }

    pub fn with_min_similarity(mut self, min: f64) -> Self {
        self.min_similarity = Some(min);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sequences.is_empty() {
            return Err(Error::invalid_field("sequences", "at least one sequence is required"));
        }
        for (i, seq) in self.sequences.iter().enumerate() {
            let field = format!("sequences[{}]", i);
            let normalized = normalize_sequence(&seq.sequence);
            if normalized.is_empty() {
                return Err(Error::invalid_field(field, "sequence must not be empty"));
            }
            if let Some((pos, bad)) = normalized
                .char_indices()
                .find(|(_, c)| !IUPAC_CODES.contains(*c))
            {
                return Err(Error::invalid_field(
                    field,
                    format!("invalid nucleotide '{}' at position {}", bad, pos + 1),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceMatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<String>,
    pub species: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    /// In [0, 1].
    pub similarity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceMatchResult {
    #[serde(default)]
    pub matches: Vec<SequenceMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequences_analyzed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SequenceMatchResult {
    pub fn best_match(&self) -> Option<&SequenceMatch> {
        self.matches
            .iter()
            .max_by(|a, b| a.similarity.total_cmp(&b.similarity))
    }

    /// Matches for one submitted sequence, best first.
    pub fn matches_for(&self, sequence_id: &str) -> Vec<&SequenceMatch> {
        let mut out: Vec<&SequenceMatch> = self
            .matches
            .iter()
            .filter(|m| m.sequence_id.as_deref() == Some(sequence_id))
            .collect();
        out.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        out
    }
}

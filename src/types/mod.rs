//! # Types Module
//!
//! Request and result records exchanged with the MATSYA backend. Everything is
//! camelCase on the wire. Result records keep fields they do not model in a
//! flattened `extra` map, so backend additions never break parsing.
//!
//! Requests carry a `validate()` method implementing the client-side form
//! checks; the client runs it before anything is sent.
//!
//! | Module | Endpoint family |
//! |--------|-----------------|
//! | [`common`] | shared location, date and depth filters |
//! | [`ingest`] | `/data/ingest` uploads and job snapshots |
//! | [`marine`] | `/data/marine` occurrence records |
//! | [`species`] | `/ai/identify-species` |
//! | [`edna`] | `/ai/edna-analysis` |
//! | [`analysis`] | `/ai/correlate`, `/analysis/ecosystem` |
//! | [`oceanographic`] | `/oceanographic` |
//! | [`vessel`] | `/vessels` |
//! | [`export`] | `/data/export`, `/health` |

pub mod analysis;
pub mod common;
pub mod edna;
pub mod export;
pub mod ingest;
pub mod marine;
pub mod oceanographic;
pub mod species;
pub mod vessel;

pub use analysis::{
    Correlation, CorrelationMethod, CorrelationRequest, CorrelationResult, EcosystemAnalysis,
    EcosystemAnalysisRequest, EcosystemAnalysisType,
};
pub use common::{Coordinates, DateRange, DepthRange, LocationFilter};
pub use edna::{DnaSequence, EdnaAnalysisRequest, Marker, SequenceMatch, SequenceMatchResult};
pub use export::{ExportFormat, ExportRequest, ExportResult, HealthStatus};
pub use ingest::{
    DataFormat, DataQualityReport, FieldMapping, IngestionJob, IngestionMetadata,
    IngestionPayload, IngestionRequest, JobStatus, Severity, ValidationIssue, ValidationOptions,
};
pub use marine::{MarineDataPage, MarineDataQuery, MarineRecord};
pub use oceanographic::{OceanographicQuery, OceanographicReading};
pub use species::{IdentificationResult, ImageType, SpeciesIdentificationRequest, SpeciesPrediction, Taxonomy};
pub use vessel::{Vessel, VesselQuery};

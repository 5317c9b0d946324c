//! # matsya-client
//!
//! Async client for the MATSYA marine biodiversity platform: dataset
//! ingestion with job tracking, occurrence and oceanographic queries, species
//! identification from images, eDNA sequence matching, correlation and
//! ecosystem analysis, vessel tracking, exports, and the live update socket.
//!
//! ## Overview
//!
//! Every backend call answers with the same envelope. Here that envelope is
//! [`ApiResponse`]: either `Success { data, metadata }` or
//! `Failure { error, metadata }`. REST methods never return `Err`; transport
//! failures, non-2xx statuses and client-side validation failures all come
//! back as a `Failure` carrying the generic `API_ERROR` code, while codes set
//! by the backend pass through untouched.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use matsya::types::{DataFormat, IngestionMetadata, IngestionRequest};
//! use matsya::{MatsyaClient, PollOutcome};
//!
//! #[tokio::main]
//! async fn main() -> matsya::Result<()> {
//!     let client = MatsyaClient::builder()
//!         .base_url("http://localhost:8000")
//!         .build()?;
//!
//!     let request = IngestionRequest::from_path(
//!         "survey.csv",
//!         Some(DataFormat::Csv),
//!         IngestionMetadata::new("CMFRI", "Survey team"),
//!     )
//!     .await?;
//!
//!     match client.ingest_and_track(&request).await.into_result() {
//!         Ok(tracker) => {
//!             if let PollOutcome::Completed(job) = tracker.wait().await {
//!                 println!("{} records processed", job.records_processed);
//!             }
//!         }
//!         Err(e) => eprintln!("{}: {}", e.code, e.message),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | `MatsyaClient`, its builder and job polling |
//! | [`config`] | `ClientConfig` from defaults, YAML and `MATSYA_*` env |
//! | [`envelope`] | `ApiResponse`, `ApiError`, response metadata |
//! | [`transport`] | reqwest HTTP layer, query encoding, WebSocket feed |
//! | [`types`] | request and result records per endpoint family |

pub mod client;
pub mod config;
pub mod envelope;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{JobStatusSource, JobTracker, MatsyaClient, MatsyaClientBuilder, PollOutcome};
pub use config::{ClientConfig, PollConfig};
pub use envelope::{ApiError, ApiResponse, ResponseMetadata, API_ERROR_CODE};
pub use transport::{StreamMessage, StreamSubscription};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};

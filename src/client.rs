//! MATSYA API client.
//!
//! Keep the public surface small: one cloneable [`MatsyaClient`] with a method
//! per backend endpoint. Endpoint groups live in submodules under
//! `src/client/`; job polling is in [`polling`].

mod ai;
pub mod builder;
pub mod core;
mod data;
mod ingest;
pub mod polling;

pub use builder::MatsyaClientBuilder;
pub use core::MatsyaClient;
pub use polling::{poll_job, JobStatusSource, JobTracker, PollOutcome};

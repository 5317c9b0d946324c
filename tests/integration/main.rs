//! Integration tests driving `MatsyaClient` against a mock HTTP server

mod analysis;
mod ingest;
mod mock_server;
mod queries;
mod stream;

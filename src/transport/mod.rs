//! Wire layer: HTTP (reqwest) and WebSocket (tokio-tungstenite).

pub mod http;
pub mod query;
pub mod ws;

pub use http::HttpTransport;
pub use query::QueryParams;
pub use ws::{websocket_url, StreamMessage, StreamSubscription};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("Transport error: {0}")]
    Other(String),
}

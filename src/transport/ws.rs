//! WebSocket subscription to the backend's live update feed.
//!
//! One connection per subscription, read on its own task and forwarded through a
//! bounded channel. Frames that are not JSON are logged and dropped; the
//! connection stays up. There is no reconnection.

use super::http::join_segments;
use super::TransportError;
use crate::{Error, ErrorContext, Result};
use futures::{SinkExt, Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};
use url::Url;

/// A JSON message received on the socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamMessage(pub Value);

impl StreamMessage {
    /// The `type` discriminator, when the backend sends one.
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(|t| t.as_str())
    }

    /// The `data` field, or the whole message when there is none.
    pub fn payload(&self) -> &Value {
        self.0.get("data").unwrap_or(&self.0)
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.payload().clone())?)
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// `http(s)://host/base` -> `ws(s)://host/base/ws`.
pub fn websocket_url(base: &Url) -> Result<Url> {
    let mut url = join_segments(base, &["ws"])?;
    let scheme = match base.scheme() {
        "http" => "ws",
        "https" => "wss",
        "ws" | "wss" => base.scheme(),
        other => {
            return Err(Error::configuration_with_context(
                format!("cannot derive a socket URL from scheme '{}'", other),
                ErrorContext::new().with_source("stream"),
            ))
        }
    };
    let scheme = scheme.to_string();
    url.set_scheme(&scheme).map_err(|_| {
        Error::configuration_with_context(
            "failed to switch URL scheme",
            ErrorContext::new()
                .with_details(base.to_string())
                .with_source("stream"),
        )
    })?;
    Ok(url)
}

/// Aborts the reader task when the subscription goes away.
struct ReaderGuard(JoinHandle<()>);

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Live message feed. Dropping it closes the connection.
pub struct StreamSubscription {
    receiver: mpsc::Receiver<StreamMessage>,
    guard: ReaderGuard,
}

impl StreamSubscription {
    /// Connect to `url` and start forwarding messages.
    pub async fn connect(url: &Url, buffer: usize) -> Result<Self> {
        debug!(url = %url, "opening socket");
        let (ws_stream, _) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::Transport(TransportError::WebSocket(Box::new(e))))?;

        let (tx, rx) = mpsc::channel(buffer.max(1));
        let task = tokio::spawn(read_loop(ws_stream, tx));
        Ok(Self {
            receiver: rx,
            guard: ReaderGuard(task),
        })
    }

    /// Next message, or `None` once the socket is closed.
    pub async fn recv(&mut self) -> Option<StreamMessage> {
        self.receiver.recv().await
    }

    pub fn close(self) {
        drop(self);
    }

    pub fn into_stream(self) -> impl Stream<Item = StreamMessage> + Send + Unpin {
        let guard = self.guard;
        ReceiverStream::new(self.receiver).map(move |msg| {
            let _keep_alive = &guard;
            msg
        })
    }
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn read_loop(ws_stream: WsStream, tx: mpsc::Sender<StreamMessage>) {
    let (mut write, mut read) = ws_stream.split();
    loop {
        let frame = tokio::select! {
            frame = read.next() => frame,
            _ = tx.closed() => break,
        };
        let Some(frame) = frame else { break };
        let decoded = match frame {
            Ok(Message::Text(text)) => decode(text.as_bytes()),
            Ok(Message::Binary(data)) => decode(&data),
            Ok(Message::Ping(data)) => {
                if let Err(e) = write.send(Message::Pong(data)).await {
                    warn!(error = %e, "failed to answer socket ping");
                    break;
                }
                continue;
            }
            Ok(Message::Close(_)) => {
                debug!("socket closed by server");
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "socket read failed");
                break;
            }
        };
        match decoded {
            Some(msg) => {
                if tx.send(msg).await.is_err() {
                    break;
                }
            }
            None => continue,
        }
    }
}

fn decode(raw: &[u8]) -> Option<StreamMessage> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(value) => Some(StreamMessage(value)),
        Err(e) => {
            warn!(error = %e, bytes = raw.len(), "dropping malformed socket message");
            None
        }
    }
}

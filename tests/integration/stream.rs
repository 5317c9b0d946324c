//! Live update socket against a local tokio-tungstenite server

use futures::{SinkExt, StreamExt};
use matsya::{MatsyaClient, MatsyaClientBuilder};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

/// Accept one socket, send `frames`, then close.
async fn serve_once(frames: Vec<Message>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        for frame in frames {
            ws.send(frame).await.unwrap();
        }
        let _ = ws.close(None).await;
    });
    addr
}

fn client_for(addr: SocketAddr) -> MatsyaClient {
    MatsyaClientBuilder::new()
        .base_url(format!("http://{}", addr))
        .stream_buffer(4)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_malformed_frame_is_dropped_between_valid_frames() {
    let addr = serve_once(vec![
        Message::text(r#"{"type":"sensor_update","data":{"sensorId":"buoy-7","temperature":27.5}}"#),
        Message::text("this is not json"),
        Message::text(r#"{"type":"job_update","data":{"jobId":"job-42","status":"completed"}}"#),
    ])
    .await;

    let mut subscription = client_for(addr).subscribe().await.unwrap();

    let first = subscription.recv().await.unwrap();
    assert_eq!(first.kind(), Some("sensor_update"));
    assert_eq!(first.payload()["temperature"], 27.5);

    let second = subscription.recv().await.unwrap();
    assert_eq!(second.kind(), Some("job_update"));
    let job: matsya::types::IngestionJob = second.parse().unwrap();
    assert_eq!(job.job_id, "job-42");

    assert!(subscription.recv().await.is_none());
}

#[tokio::test]
async fn test_subscription_as_stream() {
    let addr = serve_once(vec![
        Message::text(r#"{"n":1}"#),
        Message::binary(br#"{"n":2}"#.to_vec()),
        Message::text(r#"{"n":3}"#),
    ])
    .await;

    let subscription = client_for(addr).subscribe().await.unwrap();
    let numbers: Vec<u64> = subscription
        .into_stream()
        .map(|m| m.payload()["n"].as_u64().unwrap())
        .collect()
        .await;
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_subscribe_fails_when_nothing_listens() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    assert!(client_for(addr).subscribe().await.is_err());
}

#[tokio::test]
async fn test_ping_is_answered_and_later_frames_still_arrive() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (pong_tx, pong_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        ws.send(Message::Ping(vec![7, 7].into())).await.unwrap();
        let reply = ws.next().await.unwrap().unwrap();
        let _ = pong_tx.send(reply);
        ws.send(Message::text(r#"{"type":"sensor_update","data":{"sensorId":"buoy-1"}}"#))
            .await
            .unwrap();
        let _ = ws.close(None).await;
    });

    let mut subscription = client_for(addr).subscribe().await.unwrap();

    let reply = pong_rx.await.unwrap();
    assert!(matches!(reply, Message::Pong(ref data) if data.as_ref() == [7u8, 7].as_slice()));

    let update = subscription.recv().await.unwrap();
    assert_eq!(update.kind(), Some("sensor_update"));
    assert!(subscription.recv().await.is_none());
}

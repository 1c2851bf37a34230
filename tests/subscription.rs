//! Subscription integration tests
//!
//! Runs a small `graphql-transport-ws` server on localhost and drives a
//! [`LiveConnection`] against it.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};

use pitboard::{ClientConfig, FeedState, LiveConnection, ReconnectPolicy};

type ServerSocket = WebSocketStream<TcpStream>;

const TIMEOUT: Duration = Duration::from_secs(10);

async fn accept(listener: &TcpListener) -> ServerSocket {
    let (stream, _) = listener.accept().await.expect("accept");
    accept_hdr_async(stream, |request: &Request, mut response: Response| {
        let offered = request
            .headers()
            .get("Sec-WebSocket-Protocol")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !offered.contains("graphql-transport-ws") {
            return Err(ErrorResponse::new(Some("missing sub-protocol".to_string())));
        }
        response
            .headers_mut()
            .insert("Sec-WebSocket-Protocol", HeaderValue::from_static("graphql-transport-ws"));
        Ok(response)
    })
    .await
    .expect("handshake")
}

/// Next JSON message from the client, `None` once it closes.
async fn recv(socket: &mut ServerSocket) -> Option<Value> {
    while let Some(frame) = socket.next().await {
        match frame.ok()? {
            Message::Text(text) => return Some(serde_json::from_str(&text).expect("client JSON")),
            Message::Close(_) => return None,
            _ => continue,
        }
    }
    None
}

async fn send(socket: &mut ServerSocket, value: Value) {
    socket.send(Message::text(value.to_string())).await.expect("server send");
}

/// Complete the init/ack/subscribe exchange and return the operation id.
async fn handshake(socket: &mut ServerSocket) -> (String, Value) {
    let init = recv(socket).await.expect("connection_init");
    assert_eq!(init["type"], "connection_init");
    send(socket, json!({ "type": "connection_ack" })).await;

    let subscribe = recv(socket).await.expect("subscribe");
    assert_eq!(subscribe["type"], "subscribe");
    let id = subscribe["id"].as_str().expect("operation id").to_string();
    (id, subscribe["payload"].clone())
}

fn session(participants: usize) -> Value {
    let rows: Vec<Value> = (1..=participants)
        .map(|n| {
            json!({
                "number": n.to_string(),
                "position": n,
                "bestLap": { "timeMilliseconds": 100_000 + n as i64 * 100 },
                "driver": { "firstName": "Car", "lastName": n.to_string() }
            })
        })
        .collect();
    json!({
        "id": "7622",
        "name": "Race",
        "liveStatus": { "isSessionRunning": true, "sessionStartTime": "2025-05-10T12:00:00Z" },
        "participants": rows
    })
}

fn next(id: &str, participants: usize) -> Value {
    json!({ "type": "next", "id": id, "payload": { "data": { "session": session(participants) } } })
}

async fn listener() -> (TcpListener, ClientConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let config = ClientConfig {
        ws_endpoint: format!("ws://{}/graphql", addr),
        reconnect: ReconnectPolicy {
            max_attempts: 3,
            initial_delay_ms: 10,
            max_delay_ms: 50,
            multiplier: 2.0,
        },
        ..ClientConfig::default()
    };
    (listener, config)
}

async fn wait_for_participants(connection: &LiveConnection, count: usize) {
    let mut snapshots = Box::pin(connection.snapshots());
    tokio::time::timeout(TIMEOUT, async {
        while let Some(session) = snapshots.next().await {
            if session.participants.len() == count {
                return;
            }
        }
        panic!("snapshot stream ended early");
    })
    .await
    .expect("snapshot in time");
}

#[tokio::test]
async fn each_next_replaces_snapshot_and_close_sends_complete() {
    let _ = tracing_subscriber::fmt::try_init();
    let (listener, config) = listener().await;
    let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();

    let server = tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        let (id, payload) = handshake(&mut socket).await;
        seen_tx.send(payload).unwrap();

        send(&mut socket, next(&id, 2)).await;
        send(&mut socket, json!({ "type": "ping" })).await;
        let pong = recv(&mut socket).await.expect("pong");
        assert_eq!(pong["type"], "pong");
        send(&mut socket, next(&id, 3)).await;

        // Everything the client sends until it closes
        while let Some(message) = recv(&mut socket).await {
            seen_tx.send(message).unwrap();
        }
        seen_tx.send(json!({ "type": "<closed>" })).unwrap();
        id
    });

    let connection = LiveConnection::subscribe(&config, "7622");
    wait_for_participants(&connection, 3).await;
    assert_eq!(connection.state(), FeedState::Live);
    assert_eq!(connection.current().map(|s| s.participants.len()), Some(3));

    connection.close().await;
    let id = tokio::time::timeout(TIMEOUT, server).await.expect("server done").unwrap();

    let payload = seen_rx.recv().await.unwrap();
    assert_eq!(payload["variables"], json!({ "sessionId": "7622", "filters": {}, "realTime": true }));
    assert!(payload["query"].as_str().unwrap().starts_with("subscription"));

    let complete = seen_rx.recv().await.unwrap();
    assert_eq!(complete, json!({ "type": "complete", "id": id }));
    assert_eq!(seen_rx.recv().await.unwrap()["type"], "<closed>");
}

#[tokio::test]
async fn dropping_the_connection_completes_the_subscription() {
    let (listener, config) = listener().await;

    let server = tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        let (id, _) = handshake(&mut socket).await;
        send(&mut socket, next(&id, 1)).await;
        let complete = recv(&mut socket).await;
        (id, complete)
    });

    let connection = LiveConnection::subscribe(&config, "7622");
    wait_for_participants(&connection, 1).await;
    drop(connection);

    let (id, complete) = tokio::time::timeout(TIMEOUT, server).await.expect("server done").unwrap();
    assert_eq!(complete, Some(json!({ "type": "complete", "id": id })));
}

#[tokio::test]
async fn reconnects_after_socket_loss() {
    let (listener, config) = listener().await;

    let server = tokio::spawn(async move {
        let mut first = accept(&listener).await;
        let (id, _) = handshake(&mut first).await;
        send(&mut first, next(&id, 1)).await;
        drop(first);

        let mut second = accept(&listener).await;
        let (second_id, _) = handshake(&mut second).await;
        send(&mut second, next(&second_id, 4)).await;
        // Hold the socket open until the client leaves
        while recv(&mut second).await.is_some() {}
        (id, second_id)
    });

    let connection = LiveConnection::subscribe(&config, "7622");
    wait_for_participants(&connection, 4).await;
    assert_eq!(connection.state(), FeedState::Live);
    connection.close().await;

    let (first_id, second_id) =
        tokio::time::timeout(TIMEOUT, server).await.expect("server done").unwrap();
    assert_ne!(first_id, second_id, "operation ids are not reused");
}

#[tokio::test]
async fn graphql_error_fails_the_feed() {
    let (listener, config) = listener().await;

    tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        let (id, _) = handshake(&mut socket).await;
        send(
            &mut socket,
            json!({ "type": "error", "id": id, "payload": [{ "message": "Session not found" }] }),
        )
        .await;
        while recv(&mut socket).await.is_some() {}
    });

    let connection = LiveConnection::subscribe(&config, "0");
    let state = tokio::time::timeout(TIMEOUT, connection.finished()).await.expect("feed ends");
    assert_eq!(state, FeedState::Failed("Session not found".to_string()));
    assert!(connection.current().is_none());
}

#[tokio::test]
async fn field_errors_keep_the_partial_snapshot() {
    let (listener, config) = listener().await;

    tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        let (id, _) = handshake(&mut socket).await;
        let mut partial = next(&id, 2);
        partial["payload"]["errors"] =
            json!([{ "message": "Cannot return null for field tires.label" }]);
        send(&mut socket, partial).await;
        send(&mut socket, next(&id, 3)).await;
        while recv(&mut socket).await.is_some() {}
    });

    let connection = LiveConnection::subscribe(&config, "7622");
    wait_for_participants(&connection, 3).await;
    assert_eq!(connection.state(), FeedState::Live);
    connection.close().await;
}

#[tokio::test]
async fn null_session_with_errors_fails_the_feed() {
    let (listener, config) = listener().await;

    tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        let (id, _) = handshake(&mut socket).await;
        send(
            &mut socket,
            json!({
                "type": "next",
                "id": id,
                "payload": {
                    "data": { "session": null },
                    "errors": [{ "message": "Session not found" }]
                }
            }),
        )
        .await;
        while recv(&mut socket).await.is_some() {}
    });

    let connection = LiveConnection::subscribe(&config, "0");
    let state = tokio::time::timeout(TIMEOUT, connection.finished()).await.expect("feed ends");
    assert_eq!(state, FeedState::Failed("Session not found".to_string()));
}

#[tokio::test]
async fn server_complete_closes_the_feed() {
    let (listener, config) = listener().await;

    tokio::spawn(async move {
        let mut socket = accept(&listener).await;
        let (id, _) = handshake(&mut socket).await;
        send(&mut socket, next(&id, 2)).await;
        send(&mut socket, json!({ "type": "complete", "id": id })).await;
        while recv(&mut socket).await.is_some() {}
    });

    let connection = LiveConnection::subscribe(&config, "7622");
    let state = tokio::time::timeout(TIMEOUT, connection.finished()).await.expect("feed ends");
    assert_eq!(state, FeedState::Closed);
    assert_eq!(connection.current().map(|s| s.participants.len()), Some(2));
}

#[tokio::test]
async fn unreachable_endpoint_gives_up_after_policy() {
    let (listener, mut config) = listener().await;
    drop(listener);
    config.reconnect.max_attempts = 2;

    let connection = LiveConnection::subscribe(&config, "7622");
    let state = tokio::time::timeout(TIMEOUT, connection.finished()).await.expect("feed ends");
    assert!(matches!(state, FeedState::Failed(_)), "got {state:?}");
}

//! HTTP transport integration tests
//!
//! Serves canned responses from a localhost listener and checks how
//! [`HttpTransport`] classifies each one.

use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use pitboard::{ClientConfig, GraphQlRequest, HttpTransport, TimingClient, TimingError, Transport};

const TIMEOUT: Duration = Duration::from_secs(10);

/// Read one request: headers, then `Content-Length` bytes of body.
async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.expect("read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= end + 4 + length {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Answer a single request with `status` and `body`, returning the endpoint
/// and a handle yielding the raw request text.
async fn serve_once(
    status: &'static str,
    body: String,
) -> (ClientConfig, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.expect("write response");
        stream.shutdown().await.ok();
        request
    });

    let config = ClientConfig {
        http_endpoint: format!("http://{}/graphql", addr),
        ..ClientConfig::default()
    };
    (config, server)
}

#[tokio::test]
async fn success_envelope_is_returned() {
    let body = json!({ "data": { "session": { "id": "7616" } } }).to_string();
    let (config, server) = serve_once("200 OK", body).await;
    let transport = HttpTransport::new(&config).unwrap();

    let envelope = tokio::time::timeout(TIMEOUT, transport.execute(&GraphQlRequest::session("7616")))
        .await
        .expect("response in time")
        .unwrap();
    assert_eq!(envelope.data, Some(json!({ "session": { "id": "7616" } })));
    assert!(envelope.errors.is_none());

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /graphql"));
    assert!(request.contains("\"sessionId\":\"7616\""));
}

#[tokio::test]
async fn unparseable_success_body_is_a_parse_error() {
    let (config, _server) = serve_once("200 OK", "<html>maintenance</html>".to_string()).await;
    let transport = HttpTransport::new(&config).unwrap();

    let err = transport.execute(&GraphQlRequest::session("1")).await.unwrap_err();
    assert!(matches!(err, TimingError::Parse { .. }), "got {err:?}");
}

#[tokio::test]
async fn error_status_with_graphql_errors_is_passed_through() {
    let body = json!({ "errors": [{ "message": "Variable \"$sessionId\" is invalid" }] });
    let (config, _server) = serve_once("400 Bad Request", body.to_string()).await;
    let transport = HttpTransport::new(&config).unwrap();

    let envelope = transport.execute(&GraphQlRequest::session("x")).await.unwrap();
    let err = envelope.into_result().unwrap_err();
    assert_eq!(err.to_string(), "Variable \"$sessionId\" is invalid");
}

#[tokio::test]
async fn other_error_statuses_keep_a_truncated_body() {
    let body = "x".repeat(500);
    let (config, _server) = serve_once("502 Bad Gateway", body).await;
    let transport = HttpTransport::new(&config).unwrap();

    let err = transport.execute(&GraphQlRequest::session("1")).await.unwrap_err();
    match &err {
        TimingError::Http { status, body } => {
            assert_eq!(*status, 502);
            assert_eq!(body, &format!("{}...", "x".repeat(200)));
        }
        other => panic!("Expected Http error, got {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn error_status_without_errors_array_is_an_http_error() {
    let (config, _server) = serve_once("404 Not Found", json!({ "data": null }).to_string()).await;
    let transport = HttpTransport::new(&config).unwrap();

    let err = transport.execute(&GraphQlRequest::session("1")).await.unwrap_err();
    assert!(matches!(err, TimingError::Http { status: 404, .. }), "got {err:?}");
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn partial_session_over_http_still_renders() {
    let body = json!({
        "data": { "session": { "id": "7616", "name": "Race", "participants": [
            { "number": "12", "position": 1, "tires": null }
        ] } },
        "errors": [{ "message": "Cannot return null for field tires.label" }]
    });
    let (config, _server) = serve_once("200 OK", body.to_string()).await;
    let client = TimingClient::new(&config).unwrap();

    let session = client.fetch_session("7616").await.unwrap();
    assert_eq!(session.participants.len(), 1);
    assert_eq!(session.participants[0].number, "12");
}

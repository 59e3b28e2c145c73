//! Integration tests for the Grok client against a local canned-response
//! HTTP server, reached through the `base_url` override.

use std::time::Duration;

use latexify::{GrokClient, GrokModel, ImageFile, LatexifyError, VisionClient};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn read_http_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.expect("read should succeed");
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&data[..pos]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= pos + 4 + content_length {
                break;
            }
        }
    }
    data
}

/// Serve a single canned HTTP response. Returns the base URL to point the
/// client at and a receiver for the raw request bytes.
async fn spawn_canned_server(
    status: &'static str,
    body: String,
) -> (String, oneshot::Receiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_http_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        tx.send(request).ok();
    });

    (format!("http://{addr}/v1"), rx)
}

fn completion_body(content: &str) -> String {
    serde_json::json!({
        "id": "cmpl-1",
        "model": "grok-vision-beta",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            },
            {
                "index": 1,
                "message": { "role": "assistant", "content": "second choice, ignored" },
                "finish_reason": "stop"
            }
        ],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
    })
    .to_string()
}

fn request_json(raw: &[u8]) -> serde_json::Value {
    let text = String::from_utf8_lossy(raw);
    let body = text
        .split("\r\n\r\n")
        .nth(1)
        .expect("request should have a body");
    serde_json::from_str(body).expect("request body should be JSON")
}

#[test]
fn test_from_env_without_key_fails_before_any_request() {
    // No other test in this binary touches XAI_API_KEY.
    unsafe { std::env::remove_var("XAI_API_KEY") };
    let result = GrokClient::from_env();
    assert!(matches!(result, Err(LatexifyError::ConfigError(_))));
}

#[tokio::test]
async fn test_query_with_image_returns_first_choice_content() {
    let (base_url, rx) = spawn_canned_server("200 OK", completion_body("\\frac{a}{b}")).await;

    let client = GrokClient::new("test-key").unwrap().base_url(base_url);
    let image = ImageFile::from_bytes(b"abc", "image/jpeg");
    let result = client
        .query_with_image_file("Convert this image to LaTeX code", &image)
        .await
        .expect("request should succeed");

    assert_eq!(result, "\\frac{a}{b}");

    let raw = rx.await.unwrap();
    let text = String::from_utf8_lossy(&raw);
    assert!(text.contains("Bearer test-key"), "auth header missing");
    assert!(text.contains("POST /v1/chat/completions"), "wrong path");

    // Exactly one text part with the prompt and one image part with the data URI.
    let request = request_json(&raw);
    let parts = request["messages"][0]["content"]
        .as_array()
        .expect("content should be multi-part");
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["type"], "text");
    assert_eq!(parts[0]["text"], "Convert this image to LaTeX code");
    assert_eq!(parts[1]["type"], "image_url");
    assert_eq!(parts[1]["image_url"]["url"], "data:image/jpeg;base64,YWJj");
}

#[tokio::test]
async fn test_builder_settings_reach_the_wire() {
    let (base_url, rx) = spawn_canned_server("200 OK", completion_body("x")).await;

    let client = GrokClient::new("test-key")
        .unwrap()
        .model(GrokModel::Grok2Vision)
        .temperature(0.5)
        .max_tokens(256)
        .base_url(base_url);
    client.complete("hello").await.unwrap();

    let request = request_json(&rx.await.unwrap());
    assert_eq!(request["model"], "grok-2-vision-1212");
    assert_eq!(request["max_tokens"], 256);
    assert_eq!(request["temperature"], 0.5);
    assert_eq!(request["messages"][0]["content"], "hello");
}

#[tokio::test]
async fn test_http_error_status_surfaces_as_api_error() {
    let (base_url, _rx) = spawn_canned_server(
        "500 Internal Server Error",
        r#"{"error":"model overloaded"}"#.to_string(),
    )
    .await;

    let client = GrokClient::new("test-key").unwrap().base_url(base_url);
    let err = client.complete("hi").await.unwrap_err();

    match err {
        LatexifyError::ApiError(msg) => {
            assert!(msg.contains("model overloaded"), "body missing from: {msg}");
            assert!(msg.contains("500"), "status missing from: {msg}");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json_surfaces_as_json_error() {
    let (base_url, _rx) = spawn_canned_server("200 OK", "not json at all".to_string()).await;

    let client = GrokClient::new("test-key").unwrap().base_url(base_url);
    let err = client.complete("hi").await.unwrap_err();

    assert!(matches!(err, LatexifyError::JsonError(_)), "got {err:?}");
}

#[tokio::test]
async fn test_empty_choices_surfaces_as_unexpected_response() {
    let body = r#"{"id":"cmpl-1","choices":[]}"#.to_string();
    let (base_url, _rx) = spawn_canned_server("200 OK", body).await;

    let client = GrokClient::new("test-key").unwrap().base_url(base_url);
    let err = client.complete("hi").await.unwrap_err();

    assert!(
        matches!(err, LatexifyError::UnexpectedResponse(_)),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_missing_content_surfaces_as_unexpected_response() {
    let body = serde_json::json!({
        "id": "cmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant" }, "finish_reason": "length" }
        ]
    })
    .to_string();
    let (base_url, _rx) = spawn_canned_server("200 OK", body).await;

    let client = GrokClient::new("test-key").unwrap().base_url(base_url);
    let err = client.complete("hi").await.unwrap_err();

    assert!(
        matches!(err, LatexifyError::UnexpectedResponse(_)),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_timeout_maps_to_timeout_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let _ = read_http_request(&mut socket).await;
        // Never answer; the client timeout must fire first.
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let client = GrokClient::new("test-key")
        .unwrap()
        .timeout(Duration::from_millis(100))
        .base_url(format!("http://{addr}/v1"));
    let err = client.complete("hi").await.unwrap_err();

    assert_eq!(err, LatexifyError::Timeout);
}

//! Test utilities for integration tests
#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use axum::{Router, body::Body, response::Response, routing::post};
use bytes::Bytes;
use futures::channel::mpsc;

use mosher::api::{AppState, app};
use mosher::core::AppConfig;
use mosher::core::config::{ANTHROPIC_VERSION, SYSTEM_PROMPT};

pub const TEST_API_KEY: &str = "sk-ant-REDACTED";

/// Config pointing upstream calls at `upstream_url`, usually a
/// `mockito` server
pub fn test_config(upstream_url: &str) -> AppConfig {
    AppConfig {
        anthropic_api_key: TEST_API_KEY.to_string(),
        anthropic_api_url: upstream_url.to_string(),
        anthropic_version: ANTHROPIC_VERSION.to_string(),
        system_prompt: SYSTEM_PROMPT.to_string(),
        static_dir: format!("{}/public", env!("CARGO_MANIFEST_DIR")),
    }
}

/// Creates a test application router
pub fn test_app(upstream_url: &str) -> Router {
    let app_state = AppState::new(test_config(upstream_url));
    app(Arc::new(app_state))
}

/// Serve the app on an ephemeral port and return the chat endpoint URL
pub async fn spawn_relay(upstream_url: &str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = test_app(upstream_url);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api/chat", addr)
}

/// Serve a fake Messages API whose streamed reply stays open until the
/// returned sender is dropped. Only the first request gets the stream.
pub async fn spawn_held_upstream() -> (String, mpsc::UnboundedSender<Result<Bytes, io::Error>>) {
    let (tx, rx) = mpsc::unbounded::<Result<Bytes, io::Error>>();
    let rx = Arc::new(Mutex::new(Some(rx)));
    let upstream = Router::new().route(
        "/v1/messages",
        post(move || {
            let rx = rx.lock().unwrap().take().unwrap();
            async move {
                Response::builder()
                    .header("content-type", "text/event-stream")
                    .body(Body::from_stream(rx))
                    .unwrap()
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });
    (format!("http://{}", addr), tx)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A complete streamed reply as sent by the Messages API
pub fn sse_reply(deltas: &[&str]) -> String {
    let mut body = String::from(
        "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"role\":\"assistant\",\"content\":[]}}\n\n\
         event: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
    );
    for delta in deltas {
        let event = serde_json::json!({
            "type": "content_block_delta",
            "index": 0,
            "delta": {"type": "text_delta", "text": delta}
        });
        body.push_str(&format!("event: content_block_delta\ndata: {}\n\n", event));
    }
    body.push_str(
        "event: content_block_stop\ndata: {\"type\":\"content_block_stop\",\"index\":0}\n\n\
         event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
    );
    body
}

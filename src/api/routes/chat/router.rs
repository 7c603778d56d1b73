//! Router for the chat API

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};

use super::public;
use crate::anthropic::{MessagesRequest, send_messages};
use crate::api::public::ApiError;
use crate::api::relay::relay_stream;
use crate::api::state::SharedState;

/// Forward a chat request upstream and relay the streamed response
async fn chat_handler(
    State(state): State<SharedState>,
    axum::Json(payload): axum::Json<public::ChatRequest>,
) -> Result<Response, ApiError> {
    tracing::info!(
        "Received request to /api/chat: model={} messages={}",
        payload.model,
        payload.messages.len()
    );

    let request = MessagesRequest::new(payload, &state.config.system_prompt);
    let upstream = send_messages(&state.http, &state.config, &request).await?;

    // Upstream rejected the call before streaming started so hand its
    // status and body back as is
    let status = upstream.status();
    if !status.is_success() {
        tracing::warn!("Upstream returned {}", status);
        let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
        let body = upstream.bytes().await?;
        let mut resp = (status, body).into_response();
        if let Some(content_type) = content_type {
            resp.headers_mut().insert(header::CONTENT_TYPE, content_type);
        }
        return Ok(resp);
    }

    let body = Body::from_stream(relay_stream(upstream.bytes_stream()));
    let resp = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .body(body)?;

    Ok(resp)
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}

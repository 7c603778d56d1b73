use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::AppConfig;

/// Chat payload as sent by the client. Anything beyond the required
/// fields is carried through to upstream untouched.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The payload forwarded upstream. `stream` and `system` always come
/// from the relay, never from the client.
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    #[serde(flatten)]
    request: ChatRequest,
    stream: bool,
    system: String,
}

impl MessagesRequest {
    pub fn new(mut request: ChatRequest, system: &str) -> Self {
        request.extra.remove("stream");
        request.extra.remove("system");
        Self {
            request,
            stream: true,
            system: system.to_string(),
        }
    }
}

/// POST the request to the Messages API. The response is returned as
/// is so the caller can decide how to relay it.
pub async fn send_messages(
    client: &reqwest::Client,
    config: &AppConfig,
    request: &MessagesRequest,
) -> reqwest::Result<reqwest::Response> {
    let url = format!(
        "{}/v1/messages",
        config.anthropic_api_url.trim_end_matches('/')
    );
    client
        .post(url)
        .header("x-api-key", &config.anthropic_api_key)
        .header("anthropic-version", &config.anthropic_version)
        .header("Content-Type", "application/json")
        .json(request)
        .send()
        .await
}

/// Server-sent events from the Messages API, tagged by `type`
#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum StreamEvent {
    /// Start of a new message
    #[serde(rename = "message_start")]
    MessageStart,

    /// Start of a content block (text or tool_use)
    #[serde(rename = "content_block_start")]
    ContentBlockStart,

    /// Incremental update to a content block
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: Delta },

    /// End of a content block
    #[serde(rename = "content_block_stop")]
    ContentBlockStop,

    /// Message-level updates (stop reason, usage)
    #[serde(rename = "message_delta")]
    MessageDelta,

    /// End of the message
    #[serde(rename = "message_stop")]
    MessageStop,

    #[serde(rename = "ping")]
    Ping,

    /// Error reported by upstream after the stream started
    #[serde(rename = "error")]
    Error { error: Value },

    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// Text carried by a `content_block_delta`, if there is any
    pub fn text_delta(&self) -> Option<&str> {
        match self {
            StreamEvent::ContentBlockDelta { delta } => {
                delta.text.as_deref().filter(|t| !t.is_empty())
            }
            _ => None,
        }
    }
}

// Deltas are matched on their fields rather than their `type` tag,
// which isn't always present. Only text deltas are rendered.
#[derive(Deserialize, Debug)]
pub struct Delta {
    pub text: Option<String>,
}

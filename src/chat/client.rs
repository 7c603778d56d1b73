use anyhow::{Result, bail};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures_util::StreamExt;

use super::session::OutboundRequest;

/// Response body of a chat turn, chunk by chunk
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Sends a chat turn and hands back the streaming body once the
/// response headers are in
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, request: &OutboundRequest) -> Result<ByteStream>;
}

/// Talks to the relay over HTTP
pub struct RelayClient {
    url: String,
    http: reqwest::Client,
}

impl RelayClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for RelayClient {
    async fn open(&self, request: &OutboundRequest) -> Result<ByteStream> {
        let response = self.http.post(&self.url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "API Error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            );
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(anyhow::Error::from))
            .boxed())
    }
}

use anyhow::{Error, Result};
use futures_util::StreamExt;
use serde::Serialize;

use super::client::Transport;
use super::decoder::{EventStreamDecoder, parse_event};
use super::transcript::{Role, Transcript, Turn};
use super::view::TranscriptView;
use crate::anthropic::StreamEvent;

/// Where the current turn is at.
///
/// `Idle -> Sending -> Streaming -> Idle` when the reply arrives,
/// `Idle -> Sending -> Error` when it doesn't. A new turn can start
/// from either `Idle` or `Error`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Sending,
    Streaming,
    Error,
}

impl TurnState {
    pub fn in_flight(self) -> bool {
        matches!(self, TurnState::Sending | TurnState::Streaming)
    }
}

/// Body of the request sent to the relay for one turn
#[derive(Clone, Serialize, Debug)]
pub struct OutboundRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Turn>,
}

pub struct ChatSession {
    transcript: Transcript,
    state: TurnState,
    decoder: EventStreamDecoder,
    model: String,
    max_tokens: u32,
}

impl ChatSession {
    pub fn new(model: &str, max_tokens: u32) -> Self {
        Self {
            transcript: Transcript::new(),
            state: TurnState::Idle,
            decoder: EventStreamDecoder::new(),
            model: model.to_string(),
            max_tokens,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Record the user's input and build the request for it. Does
    /// nothing and returns `None` while a turn is in flight or when the
    /// input is blank.
    pub fn begin_turn(
        &mut self,
        input: &str,
        view: &mut dyn TranscriptView,
    ) -> Option<OutboundRequest> {
        let input = input.trim();
        if self.state.in_flight() || input.is_empty() {
            return None;
        }

        let turn = Turn::new(Role::User, input);
        view.push_turn(&turn);
        self.transcript.push(turn);
        self.state = TurnState::Sending;

        Some(OutboundRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: self.transcript.turns().to_vec(),
        })
    }

    /// Response headers arrived, so open the assistant turn the reply
    /// streams into
    pub fn open_reply(&mut self, view: &mut dyn TranscriptView) {
        if self.state != TurnState::Sending {
            return;
        }

        let turn = Turn::new(Role::Assistant, "");
        view.push_turn(&turn);
        self.transcript.push(turn);
        self.decoder = EventStreamDecoder::new();
        self.state = TurnState::Streaming;
    }

    /// Apply the next chunk of the response body
    pub fn apply_chunk(&mut self, chunk: &[u8], view: &mut dyn TranscriptView) {
        if self.state != TurnState::Streaming {
            return;
        }

        for line in self.decoder.feed(chunk) {
            let Some(event) = parse_event(&line) else {
                continue;
            };

            if let Some(text) = event.text_delta() {
                if let Some(content) = self.transcript.append_to_last(text) {
                    view.replace_last(content);
                }
            } else if let StreamEvent::Error { error } = &event {
                tracing::warn!("Upstream reported an error mid-stream: {}", error);
            }
        }
    }

    /// The response body ended
    pub fn finish(&mut self, view: &mut dyn TranscriptView) {
        if self.state != TurnState::Streaming {
            return;
        }

        if let Some(leftover) = self.decoder.finish() {
            tracing::debug!("Dropping unterminated line at end of stream: {}", leftover);
        }
        view.close_last();
        self.state = TurnState::Idle;
    }

    /// The turn failed. The error is shown as an assistant turn and a
    /// new turn can be started.
    pub fn fail(&mut self, err: &Error, view: &mut dyn TranscriptView) {
        if self.state == TurnState::Streaming {
            view.close_last();
        }

        let turn = Turn::new(Role::Assistant, &format!("Error: {}", err));
        view.push_turn(&turn);
        self.transcript.push(turn);
        self.state = TurnState::Error;
    }

    /// Run one full turn for `input`. Returns false if the input was
    /// rejected without sending anything.
    pub async fn send(
        &mut self,
        input: &str,
        transport: &dyn Transport,
        view: &mut dyn TranscriptView,
    ) -> bool {
        let Some(request) = self.begin_turn(input, view) else {
            return false;
        };

        if let Err(e) = self.stream_reply(&request, transport, view).await {
            tracing::error!("Error calling relay: {:#}", e);
            self.fail(&e, view);
        }

        true
    }

    async fn stream_reply(
        &mut self,
        request: &OutboundRequest,
        transport: &dyn Transport,
        view: &mut dyn TranscriptView,
    ) -> Result<()> {
        let mut body = transport.open(request).await?;
        self.open_reply(view);

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            self.apply_chunk(&chunk, view);
        }

        self.finish(view);
        Ok(())
    }
}

//! Chat client for the relay: keeps the transcript, sends it each
//! turn and renders the streamed reply as it arrives.

mod client;
mod decoder;
mod session;
mod transcript;
mod view;

pub use client::{ByteStream, RelayClient, Transport};
pub use decoder::{EventStreamDecoder, parse_event};
pub use session::{ChatSession, OutboundRequest, TurnState};
pub use transcript::{Role, Transcript, Turn};
pub use view::{TerminalView, TranscriptView};

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000/api/chat";
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

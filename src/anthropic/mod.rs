//! Wire types and the HTTP call for the upstream Messages API

mod messages;

pub use messages::{ChatRequest, Delta, MessagesRequest, StreamEvent, send_messages};

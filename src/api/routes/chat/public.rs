//! Public types for the chat API
pub use crate::anthropic::ChatRequest;

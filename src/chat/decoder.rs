use std::mem;

use crate::anthropic::StreamEvent;

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Turns raw body chunks into complete lines.
///
/// A chunk can end partway through a UTF-8 sequence or partway
/// through a line. Both leftovers are held until the next chunk
/// arrives rather than being decoded early.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    partial_char: Vec<u8>,
    partial_line: String,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk and return every line it completes, without
    /// line terminators
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.partial_line[start..].find('\n') {
            let end = start + offset;
            let line = &self.partial_line[start..end];
            lines.push(line.strip_suffix('\r').unwrap_or(line).to_string());
            start = end + 1;
        }
        self.partial_line.drain(..start);
        lines
    }

    /// End of stream. Returns whatever never got a line terminator.
    pub fn finish(&mut self) -> Option<String> {
        if !self.partial_char.is_empty() {
            self.partial_char.clear();
            self.partial_line.push(char::REPLACEMENT_CHARACTER);
        }
        if self.partial_line.is_empty() {
            None
        } else {
            Some(mem::take(&mut self.partial_line))
        }
    }

    fn decode(&mut self, chunk: &[u8]) {
        let mut bytes = mem::take(&mut self.partial_char);
        bytes.extend_from_slice(chunk);

        let mut rest = bytes.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.partial_line.push_str(text);
                    return;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    self.partial_line.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        // Sequence is cut off by the end of the chunk
                        None => {
                            self.partial_char = after.to_vec();
                            return;
                        }
                        Some(len) => {
                            self.partial_line.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                    }
                }
            }
        }
    }
}

/// Parse one line of the event stream. Lines that aren't data lines,
/// the `[DONE]` sentinel, and payloads that don't parse all yield
/// `None`.
pub fn parse_event(line: &str) -> Option<StreamEvent> {
    let data = line.strip_prefix(DATA_PREFIX)?;
    if data == DONE_SENTINEL {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(data) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!("Skipping unparseable event {}: {}", data, e);
            None
        }
    }
}

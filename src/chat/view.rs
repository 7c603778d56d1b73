use std::io::{self, Write};

use super::transcript::{Role, Turn};

/// Where the transcript gets displayed
pub trait TranscriptView {
    /// A new turn was added
    fn push_turn(&mut self, turn: &Turn);

    /// The last turn's content changed. `content` is the complete
    /// text so far, not just the new part.
    fn replace_last(&mut self, content: &str);

    /// The last turn won't change again
    fn close_last(&mut self) {}
}

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "The Pixel Mosher",
    }
}

/// Writes the transcript to a terminal. Since a terminal can't redraw
/// a line in place, only the part of the content not yet shown is
/// written.
pub struct TerminalView<W: Write> {
    out: W,
    shown: String,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = write!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write> TranscriptView for TerminalView<W> {
    fn push_turn(&mut self, turn: &Turn) {
        let line = format!("{}: {}", label(turn.role), turn.content);
        self.shown = turn.content.clone();
        self.write(&line);
        // Assistant turns stay open for streamed text
        if turn.role == Role::User || !turn.content.is_empty() {
            self.write("\n");
        }
    }

    fn replace_last(&mut self, content: &str) {
        match content.strip_prefix(self.shown.as_str()) {
            Some(new_text) => self.write(new_text),
            None => {
                self.write("\n");
                self.write(content);
            }
        }
        self.shown = content.to_string();
    }

    fn close_last(&mut self) {
        self.write("\n");
        self.shown.clear();
    }
}

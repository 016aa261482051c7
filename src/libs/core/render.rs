use crate::libs::core::feed_builder::RenderRecord;
use crate::libs::core::index::{IdentifierIndex, Point};

pub const BUFFER_NAME: &str = "*yammer*";
const SEPARATOR: &str = "------------------------------------------------------------";

/// Append-only text output that knows where the next write lands.
pub trait TextSink {
    fn offset(&self) -> Point;
    fn append(&mut self, text: &str);
}

/// The read-only buffer the feed is rendered into. Offsets are counted in characters.
#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    name: String,
    text: String,
    char_len: usize,
}

impl DisplayBuffer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: String::new(),
            char_len: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    /// Point at the start of a 1-based line, or `None` past the end of the buffer.
    pub fn point_at_line(&self, line: usize) -> Option<Point> {
        if line == 0 {
            return None;
        }
        if line == 1 {
            return Some(0);
        }
        self.text
            .chars()
            .enumerate()
            .filter(|(_, c)| *c == '\n')
            .nth(line - 2)
            .map(|(position, _)| position + 1)
            .filter(|point| *point < self.char_len)
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new(BUFFER_NAME)
    }
}

impl TextSink for DisplayBuffer {
    fn offset(&self) -> Point {
        self.char_len
    }

    fn append(&mut self, text: &str) {
        self.char_len += text.chars().count();
        self.text.push_str(text);
    }
}

pub fn emit<S: TextSink>(records: &[RenderRecord], index: &mut IdentifierIndex, sink: &mut S) {
    for record in records {
        index.record(sink.offset(), record.message_id);
        sink.append(&render_block(record));
    }
}

fn render_block(record: &RenderRecord) -> String {
    let reply = record
        .reply_context_display_name
        .as_ref()
        .map(|name| format!(" in reply to {}", name))
        .unwrap_or_default();

    format!(
        "{}{}\n\n\t{}\n\tAbout {} from {}\n{}\n",
        record.sender_display_name,
        reply,
        record.body_plain,
        record.relative_time_label,
        record.client_type,
        SEPARATOR
    )
}

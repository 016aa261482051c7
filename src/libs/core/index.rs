use crate::libs::models::MessageId;

/// A character offset into the display buffer, counted from zero.
pub type Point = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub offset: Point,
    pub message_id: MessageId,
}

/// Maps the start of every rendered message back to the message it came from.
///
/// Entries are kept in emission order, which is also offset order, so a lookup is a
/// binary search for the last entry starting at or before the point.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    entries: Vec<IndexEntry>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, offset: Point, message_id: MessageId) {
        debug_assert!(
            self.entries.last().map_or(true, |last| last.offset <= offset),
            "offsets must not decrease within one render"
        );
        self.entries.push(IndexEntry { offset, message_id });
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn lookup(&self, point: Point) -> Option<MessageId> {
        let after = self.entries.partition_point(|entry| entry.offset <= point);
        after
            .checked_sub(1)
            .map(|position| self.entries[position].message_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }
}

//! Source location information for extracted GraphQL.

use graphql_types::{Position, Range};

/// Where an extracted GraphQL text sits in its containing file.
///
/// Contains both byte offsets (for text manipulation) and a line/column
/// range (for mapping positions between the fragment and the file).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    /// Byte offset of the first GraphQL character in the containing file
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// Range in the containing file (line/column)
    pub range: Range,
}

impl SourceLocation {
    /// Create a new source location.
    #[must_use]
    pub const fn new(offset: usize, length: usize, range: Range) -> Self {
        Self {
            offset,
            length,
            range,
        }
    }

    /// Compute the location of `text[offset..offset + length]`.
    #[must_use]
    pub fn of_span(text: &str, offset: usize, length: usize) -> Self {
        let start = position_at(text, 0, Position::default(), offset);
        let end = position_at(text, offset, start, offset + length);
        Self::new(offset, length, Range::new(start, end))
    }

    /// The position of the first GraphQL character in the containing file.
    ///
    /// This is the fragment's location offset: line 0 of the fragment maps
    /// to `start().line`, and only on that line is the column shifted.
    #[must_use]
    pub const fn start(&self) -> Position {
        self.range.start
    }
}

/// Walk `text[from..to]`, advancing `position` in UTF-16 columns.
fn position_at(text: &str, from: usize, mut position: Position, to: usize) -> Position {
    let Some(slice) = text.get(from..to) else {
        return position;
    };
    for c in slice.chars() {
        if c == '\n' {
            position.line += 1;
            position.character = 0;
        } else {
            position.character += c.len_utf16() as u32;
        }
    }
    position
}

use graphql_types::{OffsetRange, Position, Range};

/// Line index for converting between byte offsets and line/column positions.
///
/// Columns are UTF-16 code units, matching what editors send and expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Create a new line index from source text
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];

        for (i, c) in text.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }

        Self { line_starts }
    }

    /// Get the byte offset of the start of a line
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Convert a byte offset in `text` to a position.
    ///
    /// Offsets past the end clamp to the end of the text.
    #[must_use]
    pub fn position(&self, text: &str, offset: usize) -> Position {
        let offset = offset.min(text.len());
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));
        let line_start = self.line_starts[line];

        let character = text
            .get(line_start..offset)
            .map_or(offset - line_start, |prefix| {
                prefix.chars().map(char::len_utf16).sum()
            });

        Position::new(line as u32, character as u32)
    }

    /// Convert a byte range in `text` to a line/column range.
    #[must_use]
    pub fn range(&self, text: &str, range: OffsetRange) -> Range {
        Range::new(
            self.position(text, range.start),
            self.position(text, range.end),
        )
    }

    /// Convert a position to a byte offset in `text`.
    ///
    /// Returns `None` if the line does not exist. A character past the end
    /// of the line clamps to the line end.
    #[must_use]
    pub fn offset(&self, text: &str, position: Position) -> Option<usize> {
        let line_start = self.line_start(position.line as usize)?;
        let line_end = self
            .line_start(position.line as usize + 1)
            .unwrap_or(text.len());
        let line = text.get(line_start..line_end)?;

        let mut utf16 = 0usize;
        for (i, c) in line.char_indices() {
            if utf16 >= position.character as usize || c == '\n' {
                return Some(line_start + i);
            }
            utf16 += c.len_utf16();
        }
        Some(line_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index_new() {
        let text = "line 1\nline 2\nline 3";
        let index = LineIndex::new(text);

        assert_eq!(index.line_start(0), Some(0));
        assert_eq!(index.line_start(1), Some(7));
        assert_eq!(index.line_start(2), Some(14));
        assert_eq!(index.line_start(3), None);
    }

    #[test]
    fn test_position() {
        let text = "line 1\nline 2\nline 3";
        let index = LineIndex::new(text);

        assert_eq!(index.position(text, 0), Position::new(0, 0));
        assert_eq!(index.position(text, 5), Position::new(0, 5));
        assert_eq!(index.position(text, 7), Position::new(1, 0));
        assert_eq!(index.position(text, 10), Position::new(1, 3));
        assert_eq!(index.position(text, 100), Position::new(2, 6));
    }

    #[test]
    fn test_offset() {
        let text = "line 1\nline 2\nline 3";
        let index = LineIndex::new(text);

        assert_eq!(index.offset(text, Position::new(0, 0)), Some(0));
        assert_eq!(index.offset(text, Position::new(1, 3)), Some(10));
        assert_eq!(index.offset(text, Position::new(1, 50)), Some(13));
        assert_eq!(index.offset(text, Position::new(2, 6)), Some(20));
        assert_eq!(index.offset(text, Position::new(3, 0)), None);
    }

    #[test]
    fn test_utf16_columns() {
        // "é" is 2 bytes / 1 UTF-16 unit, "𝒳" is 4 bytes / 2 UTF-16 units
        let text = "é𝒳x";
        let index = LineIndex::new(text);

        assert_eq!(index.position(text, 2), Position::new(0, 1));
        assert_eq!(index.position(text, 6), Position::new(0, 3));
        assert_eq!(index.offset(text, Position::new(0, 3)), Some(6));
    }

    #[test]
    fn test_range() {
        let text = "query {\n  a\n}";
        let index = LineIndex::new(text);
        let range = index.range(text, OffsetRange::new(10, 11));
        assert_eq!(range, Range::new(Position::new(1, 2), Position::new(1, 3)));
    }
}

//! Position and range types for source locations.

/// Byte offset range in a source text.
///
/// Byte offsets are converted to line/column [`Position`]s when presenting
/// to users or LSP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OffsetRange {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl OffsetRange {
    /// Create a new offset range.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of this range in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if this is a zero-width range.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `offset` lies within this range (end inclusive).
    ///
    /// The end is inclusive so that a cursor placed right after the last
    /// character of a name still counts as being on it.
    #[must_use]
    pub const fn contains_inclusive(&self, offset: usize) -> bool {
        offset >= self.start && offset <= self.end
    }
}

impl std::fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Position in a source text (editor coordinates, 0-indexed).
///
/// - `line` is 0-indexed (first line is 0)
/// - `character` is 0-indexed UTF-16 code units from line start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: u32,
    /// Character offset within the line (0-indexed, UTF-16 code units)
    pub character: u32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.line.cmp(&other.line) {
            std::cmp::Ordering::Equal => self.character.cmp(&other.character),
            ord => ord,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.character + 1)
    }
}

/// Range in a source text (editor coordinates).
///
/// A range spans from `start` (inclusive) to `end` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    /// Start position (inclusive)
    pub start: Position,
    /// End position (exclusive)
    pub end: Position,
}

impl Range {
    /// Create a new range.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a zero-width range at a specific position.
    #[must_use]
    pub const fn at(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Returns `true` if the position is within this range (end inclusive).
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position >= self.start && position <= self.end
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        let a = Position::new(0, 10);
        let b = Position::new(1, 0);
        let c = Position::new(1, 5);

        assert!(a < b);
        assert!(b < c);
        assert_eq!(a.max(c), c);
    }

    #[test]
    fn test_range_contains() {
        let range = Range::new(Position::new(1, 4), Position::new(3, 2));

        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(2, 0)));
        assert!(range.contains(Position::new(3, 2)));
        assert!(!range.contains(Position::new(1, 3)));
        assert!(!range.contains(Position::new(3, 3)));
    }

    #[test]
    fn test_offset_range() {
        let range = OffsetRange::new(4, 9);
        assert_eq!(range.len(), 5);
        assert!(!range.is_empty());
        assert!(range.contains_inclusive(9));
        assert!(!range.contains_inclusive(10));
        assert_eq!(range.to_string(), "4..9");
    }

    #[test]
    fn test_display_is_one_based() {
        let range = Range::new(Position::new(0, 0), Position::new(2, 7));
        assert_eq!(range.to_string(), "1:1-3:8");
    }
}

use std::sync::Arc;

use graphql_extract::{ExtractedGraphQL, SourceLocation};
use graphql_types::{OffsetRange, Position, Range};

use crate::LineIndex;

/// A GraphQL text together with where it sits in its containing file.
///
/// Cheap to clone. Positions computed by parsing `text` alone are
/// fragment-local; [`crate::mapping`] translates them into file coordinates
/// using [`FragmentSource::location_offset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSource {
    text: Arc<str>,
    location: SourceLocation,
    line_index: Arc<LineIndex>,
}

impl FragmentSource {
    #[must_use]
    pub fn new(text: impl Into<Arc<str>>, location: SourceLocation) -> Self {
        let text = text.into();
        let line_index = Arc::new(LineIndex::new(&text));
        Self {
            text,
            location,
            line_index,
        }
    }

    /// The GraphQL text, with interpolations already blanked.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// File position of the fragment's first character (0-based).
    #[must_use]
    pub const fn location_offset(&self) -> Position {
        self.location.range.start
    }

    #[must_use]
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Fragment-local position of a byte offset into [`Self::text`].
    #[must_use]
    pub fn position_at(&self, offset: usize) -> Position {
        self.line_index.position(&self.text, offset)
    }

    /// Fragment-local range of a byte range in [`Self::text`].
    #[must_use]
    pub fn range_of(&self, range: OffsetRange) -> Range {
        self.line_index.range(&self.text, range)
    }

    /// Byte offset into [`Self::text`] of a fragment-local position.
    #[must_use]
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        self.line_index.offset(&self.text, position)
    }

    /// Fragment-local position just past the last character.
    #[must_use]
    pub fn end_position(&self) -> Position {
        self.position_at(self.text.len())
    }
}

impl From<ExtractedGraphQL> for FragmentSource {
    fn from(extracted: ExtractedGraphQL) -> Self {
        Self::new(extracted.source, extracted.location)
    }
}

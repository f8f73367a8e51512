//! Position mapping between an embedded fragment and its containing file.
//!
//! Line 0 of a fragment maps to the line of its location offset. Only
//! positions on that first line have their column shifted as well; later
//! lines start at column 0 in both coordinate spaces.
//!
//! Mapping is exact when the fragment's first line carries nothing but the
//! fragment itself after the offset. Tokens on later lines of a fragment
//! whose opening line has other content before it are still mapped exactly,
//! since only the first line's columns are shifted.

use graphql_types::{Position, Range};

use crate::FragmentSource;

/// Translate a fragment-local position into the containing file.
#[must_use]
pub fn position_in_containing_document(source: &FragmentSource, position: Position) -> Position {
    let offset = source.location_offset();
    if position.line == 0 {
        Position::new(offset.line, position.character + offset.character)
    } else {
        Position::new(position.line + offset.line, position.character)
    }
}

/// Translate a fragment-local range into the containing file.
#[must_use]
pub fn range_in_containing_document(source: &FragmentSource, range: Range) -> Range {
    Range::new(
        position_in_containing_document(source, range.start),
        position_in_containing_document(source, range.end),
    )
}

/// Translate a file position into fragment-local coordinates.
///
/// Positions before the fragment start saturate to its first line/column.
#[must_use]
pub fn position_from_position_in_containing_document(
    source: &FragmentSource,
    position: Position,
) -> Position {
    let offset = source.location_offset();
    let line = position.line.saturating_sub(offset.line);
    if line == 0 {
        Position::new(0, position.character.saturating_sub(offset.character))
    } else {
        Position::new(line, position.character)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_extract::{extract_from_source, Language};

    fn fragment(text: &str, language: Language) -> FragmentSource {
        extract_from_source(text, language)
            .into_iter()
            .next()
            .unwrap()
            .into()
    }

    #[test]
    fn test_graphql_file_is_identity() {
        let source = fragment("query {\n  a\n}", Language::GraphQL);
        let position = Position::new(1, 2);

        assert_eq!(position_in_containing_document(&source, position), position);
        assert_eq!(
            position_from_position_in_containing_document(&source, position),
            position
        );
    }

    #[test]
    fn test_first_line_shifts_column() {
        let source = fragment("const Q = gql`query { a }`;", Language::TypeScript);

        assert_eq!(
            position_in_containing_document(&source, Position::new(0, 8)),
            Position::new(0, 22)
        );
        assert_eq!(
            position_from_position_in_containing_document(&source, Position::new(0, 22)),
            Position::new(0, 8)
        );
    }

    #[test]
    fn test_later_lines_keep_column() {
        let source = fragment("\n\nconst Q = gql`\n  query {\n    a\n  }\n`;", Language::JavaScript);

        assert_eq!(
            position_in_containing_document(&source, Position::new(2, 4)),
            Position::new(4, 4)
        );
        assert_eq!(
            position_from_position_in_containing_document(&source, Position::new(4, 4)),
            Position::new(2, 4)
        );
    }

    #[test]
    fn test_range_maps_both_ends() {
        let source = fragment("x\nfoo(gql`{ a\n b }`)", Language::JavaScript);
        let range = Range::new(Position::new(0, 2), Position::new(1, 2));

        assert_eq!(
            range_in_containing_document(&source, range),
            Range::new(Position::new(1, 10), Position::new(2, 2))
        );
    }

    #[test]
    fn test_round_trip_for_every_position() {
        let text = "import gql from 'graphql-tag';\n\nexport const QUERY = gql`\n  query Hero {\n    hero { name }\n  }\n`;\n";
        let source = fragment(text, Language::TypeScript);
        let end = source.end_position();

        for line in 0..=end.line {
            for character in 0..12 {
                let local = Position::new(line, character);
                let in_file = position_in_containing_document(&source, local);
                assert_eq!(
                    position_from_position_in_containing_document(&source, in_file),
                    local
                );
            }
        }
    }

    #[test]
    fn test_position_before_fragment_saturates() {
        let source = fragment("\nconst Q = gql`{ a }`", Language::JavaScript);
        assert_eq!(
            position_from_position_in_containing_document(&source, Position::new(0, 3)),
            Position::new(0, 0)
        );
    }
}

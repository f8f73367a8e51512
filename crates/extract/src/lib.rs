//! Locates GraphQL text inside source files.
//!
//! `.graphql` files yield their whole text. Script files are scanned for
//! `` gql`...` `` tagged templates; each match yields the template body with
//! `${...}` interpolations blanked out so offsets stay put.

mod extractor;
mod source_location;

pub use extractor::{blank_placeholders, extract_from_source, ExtractedGraphQL};
pub use source_location::SourceLocation;

// Re-export types from graphql-types for convenience
pub use graphql_types::{Language, Position, Range};

//! # GraphQL Syntax Layer
//!
//! Turns file text into [`QueryDocument`]s and answers positional questions
//! about them.
//!
//! ## Document Model
//!
//! Every GraphQL text lives in a [`FragmentSource`]: the text itself plus
//! where it sits in the containing file. Pure GraphQL files have a single
//! source at line 0, column 0. Script files may have several, one per `gql`
//! template, each parsed independently so a syntax error in one does not
//! affect its siblings.
//!
//! ```rust,ignore
//! if let Some(documents) = extract_query_documents(&uri, &text, language) {
//!     for document in &documents {
//!         let cursor = position_from_position_in_containing_document(&document.source, cursor);
//!     }
//! }
//! ```
//!
//! ## Coordinates
//!
//! Anything produced by parsing a fragment alone is fragment-local. The
//! functions in [`mapping`] translate between fragment-local and file
//! positions; diagnostics and ranges handed outward are always file-relative.

mod document;
mod line_index;
pub mod mapping;
mod source;
mod type_info;

pub use document::{extract_query_documents, QueryDocument};
pub use line_index::LineIndex;
pub use mapping::{
    position_from_position_in_containing_document, position_in_containing_document,
    range_in_containing_document,
};
pub use source::FragmentSource;
pub use type_info::{node_and_type_info_at_position, NodeAndTypeInfo, NodeAtPosition};

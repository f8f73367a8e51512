//! # graphql-ide
//!
//! Editor-facing language features for GraphQL embedded in source files.
//! Every provider takes the [`Workspace`](graphql_project::Workspace), a
//! file URI and a cursor position in file coordinates, finds the query
//! document under the cursor and answers in file coordinates again.
//!
//! ## Core Principle: POD Types with Public Fields
//!
//! Results are plain structs with public fields and no protocol types, so
//! the transport layer converts them without knowing any GraphQL.
//!
//! Providers fail soft: a file outside every project, a cursor outside every
//! document or a document with a syntax error yields an empty answer, never
//! an error.
//!
//! ```text
//! graphql-lsp
//!     ↓
//! graphql-ide (this crate) ← POD types, editor API
//!     ↓
//! graphql-project ← Workspaces, projects and tracked documents
//!     ↓
//! graphql-analysis / graphql-syntax ← Validation, parsing, position mapping
//! ```

mod helpers;
mod types;

mod code_lenses;
mod completion;
mod goto_definition;
mod hover;

pub use code_lenses::{code_lenses, RUN_QUERY_COMMAND};
pub use completion::{completions, suggestions};
pub use goto_definition::goto_definition;
pub use hover::hover;
pub use types::{
    CodeLens, CodeLensCommand, CompletionItem, CompletionKind, HoverResult, InsertTextFormat,
    Location,
};

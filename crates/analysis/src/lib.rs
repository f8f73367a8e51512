// GraphQL Analysis Layer
// Turns query documents into diagnostics: syntax errors, schema validation
// with project-wide fragments, and deprecated usages.

mod deprecation;
mod fragments;
mod repeated;
mod validation;

pub use deprecation::find_deprecated_usages;
pub use fragments::{collect_fragments, FragmentEntry, Fragments};
pub use validation::{collect_diagnostics, validate};

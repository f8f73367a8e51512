//! Code lenses on operation and fragment definitions.

use apollo_compiler::ast;
use graphql_project::Workspace;
use graphql_types::{FileUri, OffsetRange};

use crate::CodeLens;

pub const RUN_QUERY_COMMAND: &str = "apollographql.runQuery";

/// One lens per operation and fragment definition in the file, in order of
/// occurrence. Documents with syntax errors contribute none.
#[must_use]
#[tracing::instrument(skip_all, fields(uri = %uri))]
pub fn code_lenses(workspace: &Workspace, uri: &FileUri) -> Vec<CodeLens> {
    let Some(documents) = workspace
        .project_for_file(uri)
        .and_then(|project| project.query_documents_at(uri))
    else {
        return Vec::new();
    };

    let mut lenses = Vec::new();
    for document in documents {
        let Some(ast) = document.ast() else {
            continue;
        };
        for definition in &ast.definitions {
            let (location, title, command) = match definition {
                ast::Definition::OperationDefinition(operation) => {
                    (operation.location(), "Run query", RUN_QUERY_COMMAND)
                }
                // Reference counting is not implemented yet
                ast::Definition::FragmentDefinition(fragment) => {
                    (fragment.location(), "? references", "")
                }
                _ => continue,
            };
            let Some(location) = location else {
                continue;
            };
            let range =
                document.file_range(OffsetRange::new(location.offset(), location.end_offset()));
            lenses.push(CodeLens::new(range, title, command));
        }
    }
    lenses
}

use std::collections::HashSet;

use apollo_compiler::diagnostic::ToCliReport;
use apollo_compiler::validation::Valid;
use apollo_compiler::{ast, ExecutableDocument, Name, Schema};
use graphql_syntax::QueryDocument;
use graphql_types::{Diagnostic, OffsetRange};

use crate::repeated::repeated_names;
use crate::{find_deprecated_usages, Fragments};

/// All diagnostics for one query document.
///
/// A document with a syntax error yields only that error. Otherwise the
/// document is validated with the project's fragments available, and
/// deprecated usages are reported as warnings. Every range is in the
/// coordinates of the containing file.
pub fn collect_diagnostics(
    schema: &Valid<Schema>,
    document: &QueryDocument,
    fragments: &Fragments,
) -> Vec<Diagnostic> {
    let Some(ast) = document.ast() else {
        return document.syntax_error().cloned().into_iter().collect();
    };

    let (executable, mut diagnostics) = validate(schema, document, ast, fragments);
    diagnostics.extend(find_deprecated_usages(schema, document, &executable));
    diagnostics
}

/// Validate a parsed document against the schema.
///
/// Fragments the document spreads but does not define are looked up in
/// `fragments` (transitively) and validated alongside it. Errors located in
/// those borrowed definitions belong to their own files and are dropped
/// here, as are unused-fragment errors: a fragment unused within one
/// extracted document may be used elsewhere in the project.
///
/// A name repeated within its scope is reported at every occurrence rather
/// than only at the repetition.
///
/// Returns the (possibly partial) executable document for further checks.
pub fn validate(
    schema: &Valid<Schema>,
    document: &QueryDocument,
    ast: &ast::Document,
    fragments: &Fragments,
) -> (ExecutableDocument, Vec<Diagnostic>) {
    let own_files: HashSet<_> = ast.sources.keys().copied().collect();

    let mut merged = ast.clone();
    for name in external_fragment_names(ast, fragments) {
        if let Some(entry) = fragments.get(&name) {
            merged
                .definitions
                .push(ast::Definition::FragmentDefinition(entry.definition.clone()));
        }
    }

    let repeated = repeated_names(schema, ast);
    let (executable, errors) = match merged.to_executable_validate(schema) {
        Ok(valid) => (valid.into_inner(), None),
        Err(with_errors) => (with_errors.partial, Some(with_errors.errors)),
    };

    let mut diagnostics = Vec::new();
    for apollo_diag in errors.iter().flat_map(|errors| errors.iter()) {
        let Some(location) = apollo_diag.error.location() else {
            continue;
        };
        if !own_files.contains(&location.file_id()) {
            continue;
        }

        let message = apollo_diag.error.to_string();
        if message.contains("must be used in an operation")
            || repeated
                .iter()
                .any(|occurrence| occurrence.reports(&message, location))
        {
            continue;
        }

        diagnostics.push(Diagnostic::validation(
            message,
            document.file_range(OffsetRange::new(location.offset(), location.end_offset())),
        ));
    }
    diagnostics.extend(
        repeated
            .iter()
            .map(|occurrence| occurrence.to_diagnostic(document)),
    );

    tracing::trace!(
        uri = %document.uri,
        diagnostics = diagnostics.len(),
        "validated query document"
    );

    (executable, diagnostics)
}

/// Names of fragments reachable from `ast` that it does not define itself.
fn external_fragment_names(ast: &ast::Document, fragments: &Fragments) -> Vec<Name> {
    let local: HashSet<&Name> = ast
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            ast::Definition::FragmentDefinition(fragment) => Some(&fragment.name),
            _ => None,
        })
        .collect();

    let mut pending = Vec::new();
    for definition in &ast.definitions {
        match definition {
            ast::Definition::OperationDefinition(operation) => {
                collect_spreads(&operation.selection_set, &mut pending);
            }
            ast::Definition::FragmentDefinition(fragment) => {
                collect_spreads(&fragment.selection_set, &mut pending);
            }
            _ => {}
        }
    }

    let mut seen = HashSet::new();
    let mut external = Vec::new();
    while let Some(name) = pending.pop() {
        if local.contains(&name) || !seen.insert(name.clone()) {
            continue;
        }
        if let Some(entry) = fragments.get(&name) {
            collect_spreads(&entry.definition.selection_set, &mut pending);
            external.push(name);
        }
    }
    external
}

fn collect_spreads(selections: &[ast::Selection], names: &mut Vec<Name>) {
    for selection in selections {
        match selection {
            ast::Selection::Field(field) => collect_spreads(&field.selection_set, names),
            ast::Selection::FragmentSpread(spread) => names.push(spread.fragment_name.clone()),
            ast::Selection::InlineFragment(inline) => {
                collect_spreads(&inline.selection_set, names);
            }
        }
    }
}

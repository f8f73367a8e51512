//! Deprecated field and enum value usage.

use std::collections::HashSet;

use apollo_compiler::ast::{self, DirectiveList};
use apollo_compiler::executable::{self, ExecutableDocument, SelectionSet};
use apollo_compiler::parser::{FileId, SourceSpan};
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::{Node, Schema};
use graphql_syntax::QueryDocument;
use graphql_types::{Diagnostic, OffsetRange};

const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// Warnings for every deprecated field or enum value the document uses.
///
/// Only definitions that come from `document` itself are inspected, so
/// fragments borrowed from other files are reported in those files.
pub fn find_deprecated_usages(
    schema: &Schema,
    document: &QueryDocument,
    executable: &ExecutableDocument,
) -> Vec<Diagnostic> {
    let own_files: HashSet<FileId> = document
        .ast()
        .map(|ast| ast.sources.keys().copied().collect())
        .unwrap_or_default();
    let is_own = |location: Option<SourceSpan>| {
        location.is_some_and(|location| own_files.contains(&location.file_id()))
    };

    let mut finder = DeprecationFinder {
        schema,
        document,
        diagnostics: Vec::new(),
    };

    for operation in executable.operations.iter() {
        if is_own(operation.location()) {
            finder.selection_set(&operation.selection_set);
        }
    }
    for fragment in executable.fragments.values() {
        if is_own(fragment.location()) {
            finder.selection_set(&fragment.selection_set);
        }
    }

    finder.diagnostics
}

struct DeprecationFinder<'a> {
    schema: &'a Schema,
    document: &'a QueryDocument,
    diagnostics: Vec<Diagnostic>,
}

impl DeprecationFinder<'_> {
    fn selection_set(&mut self, selection_set: &SelectionSet) {
        for selection in &selection_set.selections {
            match selection {
                executable::Selection::Field(field) => {
                    if let Some(reason) = deprecation_reason(&field.definition.directives) {
                        self.report(
                            format!(
                                "The field {}.{} is deprecated. {reason}",
                                selection_set.ty, field.definition.name
                            ),
                            field.name.location(),
                        );
                    }
                    for argument in &field.arguments {
                        if let Some(definition) = field.definition.argument_by_name(&argument.name) {
                            self.value(&argument.value, &definition.ty);
                        }
                    }
                    self.selection_set(&field.selection_set);
                }
                executable::Selection::InlineFragment(inline) => {
                    self.selection_set(&inline.selection_set);
                }
                executable::Selection::FragmentSpread(_) => {}
            }
        }
    }

    fn value(&mut self, value: &Node<ast::Value>, ty: &ast::Type) {
        match &**value {
            ast::Value::Enum(name) => {
                let Some(ExtendedType::Enum(enum_type)) =
                    self.schema.types.get(ty.inner_named_type())
                else {
                    return;
                };
                let Some(enum_value) = enum_type.values.get(name) else {
                    return;
                };
                if let Some(reason) = deprecation_reason(&enum_value.directives) {
                    self.report(
                        format!(
                            "The enum value {}.{} is deprecated. {reason}",
                            enum_type.name, enum_value.value
                        ),
                        value.location(),
                    );
                }
            }
            ast::Value::List(items) => {
                let item_type = match ty {
                    ast::Type::List(inner) | ast::Type::NonNullList(inner) => inner.as_ref(),
                    other => other,
                };
                for item in items {
                    self.value(item, item_type);
                }
            }
            ast::Value::Object(fields) => {
                let Some(ExtendedType::InputObject(input_type)) =
                    self.schema.types.get(ty.inner_named_type())
                else {
                    return;
                };
                for (name, field_value) in fields {
                    if let Some(field) = input_type.fields.get(name) {
                        self.value(field_value, &field.ty);
                    }
                }
            }
            _ => {}
        }
    }

    fn report(&mut self, message: String, location: Option<SourceSpan>) {
        let Some(location) = location else {
            return;
        };
        self.diagnostics.push(Diagnostic::deprecation(
            message,
            self.document
                .file_range(OffsetRange::new(location.offset(), location.end_offset())),
        ));
    }
}

fn deprecation_reason(directives: &DirectiveList) -> Option<String> {
    let directive = directives.get("deprecated")?;
    Some(
        directive
            .specified_argument_by_name("reason")
            .and_then(|reason| reason.as_str())
            .unwrap_or(DEFAULT_DEPRECATION_REASON)
            .to_string(),
    )
}

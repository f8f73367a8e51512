//! Schema-aware completion.
//!
//! The cursor context is read lexically from the text before the cursor.
//! The enclosing type comes from apollo-parser's error-tolerant CST, so
//! suggestions keep working while the document is incomplete.

use std::collections::HashSet;

use apollo_compiler::ast::OperationType;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::Schema;
use apollo_parser::cst::{self, CstNode};
use apollo_parser::{Parser, SyntaxNode};
use graphql_analysis::Fragments;
use graphql_project::Workspace;
use graphql_types::{FileUri, Position};

use crate::helpers::{document_at, type_description};
use crate::{CompletionItem, CompletionKind};

const KEYWORDS: [&str; 5] = ["query", "mutation", "subscription", "fragment", "{"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum CompletionContext {
    TopLevel,
    /// Right after `...`
    FragmentSpread,
    /// After `on` in an inline fragment or fragment definition
    TypeCondition,
    /// Inside the argument list of the named field
    Arguments(String),
    SelectionSet,
    /// Somewhere nothing is suggested, such as an argument value
    Unknown,
}

/// Completion items for `position` in a tracked file.
#[must_use]
#[tracing::instrument(skip_all, fields(uri = %uri, line = position.line))]
pub fn completions(workspace: &Workspace, uri: &FileUri, position: Position) -> Vec<CompletionItem> {
    let Some(context) = document_at(workspace, uri, position) else {
        return Vec::new();
    };
    let source = &context.document.source;
    let Some(offset) = source.offset_at(context.position) else {
        return Vec::new();
    };

    let fragments = context.project.fragments();
    let items = suggestions(context.project.schema(), &fragments, source.text(), offset);
    tracing::debug!(count = items.len(), "Completions computed");
    items
}

/// Suggestions for a cursor at byte `offset` of a GraphQL document.
#[must_use]
pub fn suggestions(
    schema: &Schema,
    fragments: &Fragments,
    text: &str,
    offset: usize,
) -> Vec<CompletionItem> {
    let Some(prefix) = text.get(..offset) else {
        return Vec::new();
    };

    let context = completion_context(prefix);
    match context {
        CompletionContext::TopLevel => {
            return KEYWORDS
                .iter()
                .map(|keyword| CompletionItem::new(*keyword, CompletionKind::Keyword))
                .collect();
        }
        CompletionContext::TypeCondition => return type_condition_items(schema),
        CompletionContext::Unknown => return Vec::new(),
        _ => {}
    }

    let tree = Parser::new(text).parse();
    let Some(ty) = enclosing_type(schema, &tree.document(), offset) else {
        return Vec::new();
    };

    match context {
        CompletionContext::FragmentSpread => fragment_items(schema, fragments, ty),
        CompletionContext::Arguments(field) => argument_items(schema, ty, &field),
        _ => field_items(schema, ty),
    }
}

const fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn completion_context(prefix: &str) -> CompletionContext {
    let word_start = prefix.trim_end_matches(is_name_char).len();
    let before = prefix[..word_start].trim_end();

    if before.ends_with("...") {
        return CompletionContext::FragmentSpread;
    }
    if before
        .strip_suffix("on")
        .is_some_and(|rest| !rest.ends_with(is_name_char))
    {
        return CompletionContext::TypeCondition;
    }
    if let Some(field) = open_argument_list(before) {
        if before.ends_with(':') {
            return CompletionContext::Unknown;
        }
        return CompletionContext::Arguments(field);
    }

    match brace_depth(before) {
        0 if before.is_empty() || before.ends_with('}') => CompletionContext::TopLevel,
        0 => CompletionContext::Unknown,
        _ => CompletionContext::SelectionSet,
    }
}

/// The name in front of the innermost unclosed `(` of the current
/// selection, if any.
fn open_argument_list(before: &str) -> Option<String> {
    let mut depth = 0usize;
    for (index, ch) in before.char_indices().rev() {
        match ch {
            ')' => depth += 1,
            '(' if depth == 0 => {
                let head = before[..index].trim_end();
                let name = &head[head.trim_end_matches(is_name_char).len()..];
                return (!name.is_empty()).then(|| name.to_string());
            }
            '(' => depth -= 1,
            '{' | '}' => return None,
            _ => {}
        }
    }
    None
}

fn brace_depth(text: &str) -> usize {
    text.chars().fold(0usize, |depth, ch| match ch {
        '{' => depth + 1,
        '}' => depth.saturating_sub(1),
        _ => depth,
    })
}

fn contains(node: &SyntaxNode, offset: usize) -> bool {
    let range = node.text_range();
    let start: usize = range.start().into();
    let end: usize = range.end().into();
    start <= offset && offset <= end
}

fn name_text(name: &cst::Name) -> String {
    name.text().to_string()
}

fn operation_type(operation: &cst::OperationDefinition) -> OperationType {
    match operation.operation_type() {
        Some(ty) if ty.mutation_token().is_some() => OperationType::Mutation,
        Some(ty) if ty.subscription_token().is_some() => OperationType::Subscription,
        _ => OperationType::Query,
    }
}

/// The type of the innermost selection set around `offset`.
fn enclosing_type<'s>(
    schema: &'s Schema,
    document: &cst::Document,
    offset: usize,
) -> Option<&'s ExtendedType> {
    document
        .definitions()
        .find_map(|definition| match definition {
            cst::Definition::OperationDefinition(operation) => {
                let selection_set = operation.selection_set()?;
                if !contains(selection_set.syntax(), offset) {
                    return None;
                }
                let root = schema.root_operation(operation_type(&operation))?;
                selection_set_type(schema, &selection_set, schema.types.get(root)?, offset)
            }
            cst::Definition::FragmentDefinition(fragment) => {
                let selection_set = fragment.selection_set()?;
                if !contains(selection_set.syntax(), offset) {
                    return None;
                }
                let name = fragment.type_condition()?.named_type()?.name()?;
                let ty = schema.types.get(name_text(&name).as_str())?;
                selection_set_type(schema, &selection_set, ty, offset)
            }
            _ => None,
        })
}

fn selection_set_type<'s>(
    schema: &'s Schema,
    selection_set: &cst::SelectionSet,
    ty: &'s ExtendedType,
    offset: usize,
) -> Option<&'s ExtendedType> {
    for selection in selection_set.selections() {
        match selection {
            cst::Selection::Field(field) => {
                let Some(nested) = field.selection_set() else {
                    continue;
                };
                if !contains(nested.syntax(), offset) {
                    continue;
                }
                let name = name_text(&field.name()?);
                let definition = schema.type_field(ty.name(), &name).ok()?;
                let field_type = schema.types.get(definition.ty.inner_named_type())?;
                return selection_set_type(schema, &nested, field_type, offset);
            }
            cst::Selection::InlineFragment(inline) => {
                let Some(nested) = inline.selection_set() else {
                    continue;
                };
                if !contains(nested.syntax(), offset) {
                    continue;
                }
                let condition = inline
                    .type_condition()
                    .and_then(|condition| condition.named_type())
                    .and_then(|named| named.name())
                    .and_then(|name| schema.types.get(name_text(&name).as_str()));
                return selection_set_type(schema, &nested, condition.unwrap_or(ty), offset);
            }
            cst::Selection::FragmentSpread(_) => {}
        }
    }
    Some(ty)
}

/// Object types a value of `ty` can have at runtime, in schema order.
fn possible_types<'s>(schema: &'s Schema, ty: &'s ExtendedType) -> Vec<&'s str> {
    match ty {
        ExtendedType::Object(object) => vec![object.name.as_str()],
        ExtendedType::Union(union_type) => union_type
            .members
            .iter()
            .map(|member| member.name.as_str())
            .collect(),
        ExtendedType::Interface(interface) => schema
            .types
            .values()
            .filter_map(|candidate| match candidate {
                ExtendedType::Object(object)
                    if object
                        .implements_interfaces
                        .iter()
                        .any(|implemented| implemented.name == interface.name) =>
                {
                    Some(object.name.as_str())
                }
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

const fn is_composite(ty: &ExtendedType) -> bool {
    matches!(
        ty,
        ExtendedType::Object(_) | ExtendedType::Interface(_) | ExtendedType::Union(_)
    )
}

fn field_items(schema: &Schema, ty: &ExtendedType) -> Vec<CompletionItem> {
    if !is_composite(ty) {
        return Vec::new();
    }

    let fields = match ty {
        ExtendedType::Object(object) => Some(&object.fields),
        ExtendedType::Interface(interface) => Some(&interface.fields),
        _ => None,
    };
    let mut items: Vec<CompletionItem> = fields
        .into_iter()
        .flatten()
        .map(|(name, field)| {
            CompletionItem::new(name.as_str(), CompletionKind::Field)
                .with_detail(field.ty.to_string())
                .with_documentation(field.description.as_deref())
                .with_deprecated(field.directives.get("deprecated").is_some())
        })
        .collect();

    items.push(CompletionItem::new("__typename", CompletionKind::Field).with_detail("String!"));

    if !matches!(ty, ExtendedType::Object(_)) {
        items.extend(possible_types(schema, ty).into_iter().map(|name| {
            CompletionItem::new(format!("... on {name}"), CompletionKind::Type)
                .with_snippet(format!("... on {name} {{\n  $0\n}}"))
                .with_sort_text(format!("z_{name}"))
        }));
    }
    items
}

fn fragment_items(schema: &Schema, fragments: &Fragments, ty: &ExtendedType) -> Vec<CompletionItem> {
    let enclosing: HashSet<&str> = possible_types(schema, ty).into_iter().collect();

    let mut items: Vec<CompletionItem> = fragments
        .iter()
        .filter(|(_, entry)| {
            schema
                .types
                .get(&entry.definition.type_condition)
                .is_some_and(|condition| {
                    possible_types(schema, condition)
                        .iter()
                        .any(|name| enclosing.contains(name))
                })
        })
        .map(|(name, entry)| {
            CompletionItem::new(name.as_str(), CompletionKind::Fragment)
                .with_detail(format!("fragment {name} on {}", entry.definition.type_condition))
        })
        .collect();
    items.push(CompletionItem::new("on", CompletionKind::Keyword));
    items
}

fn type_condition_items(schema: &Schema) -> Vec<CompletionItem> {
    schema
        .types
        .iter()
        .filter(|(name, ty)| !name.starts_with("__") && is_composite(ty))
        .map(|(name, ty)| {
            CompletionItem::new(name.as_str(), CompletionKind::Type)
                .with_documentation(type_description(ty))
        })
        .collect()
}

fn argument_items(schema: &Schema, ty: &ExtendedType, field: &str) -> Vec<CompletionItem> {
    let Ok(definition) = schema.type_field(ty.name(), field) else {
        return Vec::new();
    };
    definition
        .arguments
        .iter()
        .map(|argument| {
            CompletionItem::new(argument.name.as_str(), CompletionKind::Argument)
                .with_detail(argument.ty.to_string())
                .with_documentation(argument.description.as_deref())
                .with_insert_text(format!("{}: ", argument.name))
        })
        .collect()
}

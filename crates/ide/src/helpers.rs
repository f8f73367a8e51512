//! Lookups shared by the feature providers.

use apollo_compiler::parser::SourceSpan;
use apollo_compiler::schema::ExtendedType;
use graphql_project::{Project, Workspace};
use graphql_syntax::{position_from_position_in_containing_document, LineIndex, QueryDocument};
use graphql_types::{FileUri, OffsetRange, Position};

use crate::Location;

/// The project and document under a cursor, with the cursor translated
/// into document-local coordinates.
pub(crate) struct DocumentContext<'a> {
    pub project: &'a Project,
    pub document: &'a QueryDocument,
    pub position: Position,
}

pub(crate) fn document_at<'a>(
    workspace: &'a Workspace,
    uri: &FileUri,
    position: Position,
) -> Option<DocumentContext<'a>> {
    let project = workspace.project_for_file(uri)?;
    let document = project.query_document_at(uri, position)?;
    Some(DocumentContext {
        project,
        document,
        position: position_from_position_in_containing_document(&document.source, position),
    })
}

/// Resolve a schema node location to the project's schema file.
///
/// Built-in definitions live in a synthetic source and resolve to `None`.
pub(crate) fn schema_location(project: &Project, span: Option<SourceSpan>) -> Option<Location> {
    let span = span?;
    let source = project.schema().sources.get(&span.file_id())?;
    if source.path().to_str() != Some(project.schema_uri().as_str()) {
        return None;
    }
    let text = source.source_text();
    let range = LineIndex::new(text).range(text, OffsetRange::new(span.offset(), span.end_offset()));
    Some(Location::new(project.schema_uri().clone(), range))
}

pub(crate) fn type_location(ty: &ExtendedType) -> Option<SourceSpan> {
    match ty {
        ExtendedType::Scalar(node) => node.location(),
        ExtendedType::Object(node) => node.location(),
        ExtendedType::Interface(node) => node.location(),
        ExtendedType::Union(node) => node.location(),
        ExtendedType::Enum(node) => node.location(),
        ExtendedType::InputObject(node) => node.location(),
    }
}

pub(crate) fn type_description(ty: &ExtendedType) -> Option<&str> {
    match ty {
        ExtendedType::Scalar(node) => node.description.as_deref(),
        ExtendedType::Object(node) => node.description.as_deref(),
        ExtendedType::Interface(node) => node.description.as_deref(),
        ExtendedType::Union(node) => node.description.as_deref(),
        ExtendedType::Enum(node) => node.description.as_deref(),
        ExtendedType::InputObject(node) => node.description.as_deref(),
    }
}

/// Markdown for a hover: a fenced `graphql` block, then the description.
pub(crate) fn graphql_markdown(code: &str, description: Option<&str>) -> String {
    let mut contents = format!("```graphql\n{code}\n```");
    if let Some(description) = description.filter(|description| !description.is_empty()) {
        contents.push_str("\n\n");
        contents.push_str(description);
    }
    contents
}

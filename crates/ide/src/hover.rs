//! Hover information for fragment spreads, fields and named types.

use graphql_project::Workspace;
use graphql_syntax::{node_and_type_info_at_position, range_in_containing_document, NodeAtPosition};
use graphql_types::{FileUri, Position};

use crate::helpers::{
    document_at, graphql_markdown, schema_location, type_description, type_location,
};
use crate::HoverResult;

/// Hover for the node under `position`, or `None` when there is nothing
/// to say about it.
#[must_use]
#[tracing::instrument(skip_all, fields(uri = %uri, line = position.line))]
pub fn hover(workspace: &Workspace, uri: &FileUri, position: Position) -> Option<HoverResult> {
    let context = document_at(workspace, uri, position)?;
    let ast = context.document.ast()?;
    let info = node_and_type_info_at_position(
        &context.document.source,
        context.position,
        ast,
        context.project.schema(),
    )?;
    let range = range_in_containing_document(&context.document.source, info.range);

    let contents = match info.node {
        NodeAtPosition::FragmentSpread(spread) => {
            let fragments = context.project.fragments();
            let fragment = fragments.get(&spread.fragment_name)?;
            graphql_markdown(
                &format!(
                    "fragment {} on {}",
                    spread.fragment_name, fragment.definition.type_condition
                ),
                None,
            )
        }
        NodeAtPosition::Field(_) => {
            let parent_type = info.parent_type?;
            let field = info.field_definition?;
            graphql_markdown(
                &format!("{}.{}: {}", parent_type.name(), field.name, field.ty),
                field.description.as_deref(),
            )
        }
        NodeAtPosition::NamedType(_) => {
            let ty = info.current_type?;
            // Built-in scalars have no declaration to describe
            schema_location(context.project, type_location(ty))?;
            graphql_markdown(ty.name(), type_description(ty))
        }
    };

    tracing::debug!(%range, "Hover resolved");
    Some(HoverResult::new(contents).with_range(range))
}

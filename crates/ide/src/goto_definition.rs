//! Go-to-definition for fragment spreads, fields and named types.

use graphql_project::Workspace;
use graphql_syntax::{node_and_type_info_at_position, NodeAtPosition};
use graphql_types::{FileUri, Position};

use crate::helpers::{document_at, schema_location, type_location};
use crate::Location;

/// Where the node under `position` is declared.
///
/// Fragment spreads resolve to the fragment definition in whichever
/// project file declares it. Fields and named types resolve into the
/// schema file. Definitions without a source in the project, such as
/// built-in scalars and introspection fields, resolve to `None`.
#[must_use]
#[tracing::instrument(skip_all, fields(uri = %uri, line = position.line))]
pub fn goto_definition(workspace: &Workspace, uri: &FileUri, position: Position) -> Option<Location> {
    let context = document_at(workspace, uri, position)?;
    let ast = context.document.ast()?;
    let info = node_and_type_info_at_position(
        &context.document.source,
        context.position,
        ast,
        context.project.schema(),
    )?;

    match info.node {
        NodeAtPosition::FragmentSpread(spread) => {
            let fragments = context.project.fragments();
            let fragment = fragments.get(&spread.fragment_name)?;
            Some(Location::new(fragment.uri.clone(), fragment.range))
        }
        NodeAtPosition::Field(_) => {
            schema_location(context.project, info.field_definition?.location())
        }
        NodeAtPosition::NamedType(_) => {
            schema_location(context.project, type_location(info.current_type?))
        }
    }
}

//! AST node lookup with schema type context.

use apollo_compiler::ast;
use apollo_compiler::parser::SourceSpan;
use apollo_compiler::schema::{Component, ExtendedType, FieldDefinition};
use apollo_compiler::{Node, Schema};
use graphql_types::{OffsetRange, Position, Range};

use crate::FragmentSource;

/// The node kinds language features act on.
#[derive(Debug, Clone, Copy)]
pub enum NodeAtPosition<'a> {
    FragmentSpread(&'a Node<ast::FragmentSpread>),
    Field(&'a Node<ast::Field>),
    NamedType(&'a ast::NamedType),
}

/// The deepest relevant node under a cursor, with the type context in
/// effect at that point.
#[derive(Debug, Clone, Copy)]
pub struct NodeAndTypeInfo<'a> {
    pub node: NodeAtPosition<'a>,
    /// Fragment-local range of the node's name
    pub range: Range,
    /// The composite type whose selection set contains the node
    pub parent_type: Option<&'a ExtendedType>,
    /// For fields, the schema definition of the field
    pub field_definition: Option<&'a Component<FieldDefinition>>,
    /// The named type the node evaluates to: a field's unwrapped output
    /// type, or the type a named type reference points at
    pub current_type: Option<&'a ExtendedType>,
}

/// Find the deepest fragment spread, field or named type containing a
/// fragment-local `position`.
///
/// Returns `None` when the position is outside the text or not on any of
/// those node kinds.
#[must_use]
pub fn node_and_type_info_at_position<'a>(
    source: &FragmentSource,
    position: Position,
    document: &'a ast::Document,
    schema: &'a Schema,
) -> Option<NodeAndTypeInfo<'a>> {
    let offset = source.offset_at(position)?;
    let finder = Finder {
        schema,
        source,
        offset,
    };
    document
        .definitions
        .iter()
        .find_map(|definition| finder.definition(definition))
}

struct Finder<'a, 's> {
    schema: &'a Schema,
    source: &'s FragmentSource,
    offset: usize,
}

impl<'a> Finder<'a, '_> {
    fn span(&self, location: Option<SourceSpan>) -> Option<OffsetRange> {
        let location = location?;
        let span = OffsetRange::new(location.offset(), location.end_offset());
        span.contains_inclusive(self.offset).then_some(span)
    }

    fn definition(&self, definition: &'a ast::Definition) -> Option<NodeAndTypeInfo<'a>> {
        match definition {
            ast::Definition::OperationDefinition(operation) => {
                self.span(operation.location())?;
                if let Some(hit) = operation
                    .variables
                    .iter()
                    .find_map(|variable| self.named_type(variable.ty.inner_named_type(), None))
                {
                    return Some(hit);
                }
                let root = self
                    .schema
                    .root_operation(operation.operation_type)
                    .and_then(|name| self.schema.types.get(name));
                self.selections(&operation.selection_set, root)
            }
            ast::Definition::FragmentDefinition(fragment) => {
                self.span(fragment.location())?;
                if let Some(hit) = self.named_type(&fragment.type_condition, None) {
                    return Some(hit);
                }
                let ty = self.schema.types.get(&fragment.type_condition);
                self.selections(&fragment.selection_set, ty)
            }
            _ => None,
        }
    }

    fn named_type(
        &self,
        name: &'a ast::NamedType,
        parent_type: Option<&'a ExtendedType>,
    ) -> Option<NodeAndTypeInfo<'a>> {
        let span = self.span(name.location())?;
        Some(NodeAndTypeInfo {
            node: NodeAtPosition::NamedType(name),
            range: self.source.range_of(span),
            parent_type,
            field_definition: None,
            current_type: self.schema.types.get(name),
        })
    }

    fn selections(
        &self,
        selections: &'a [ast::Selection],
        parent_type: Option<&'a ExtendedType>,
    ) -> Option<NodeAndTypeInfo<'a>> {
        for selection in selections {
            match selection {
                ast::Selection::Field(field) => {
                    if self.span(field.location()).is_none() {
                        continue;
                    }
                    let field_definition = parent_type
                        .and_then(|parent| self.schema.type_field(parent.name(), &field.name).ok());
                    let current_type = field_definition
                        .and_then(|definition| self.schema.types.get(definition.ty.inner_named_type()));

                    if let Some(hit) = self.selections(&field.selection_set, current_type) {
                        return Some(hit);
                    }

                    let name = field.name.location()?;
                    return Some(NodeAndTypeInfo {
                        node: NodeAtPosition::Field(field),
                        range: self
                            .source
                            .range_of(OffsetRange::new(name.offset(), name.end_offset())),
                        parent_type,
                        field_definition,
                        current_type,
                    });
                }
                ast::Selection::FragmentSpread(spread) => {
                    if self.span(spread.location()).is_none() {
                        continue;
                    }
                    let name = spread.fragment_name.location()?;
                    return Some(NodeAndTypeInfo {
                        node: NodeAtPosition::FragmentSpread(spread),
                        range: self
                            .source
                            .range_of(OffsetRange::new(name.offset(), name.end_offset())),
                        parent_type,
                        field_definition: None,
                        current_type: None,
                    });
                }
                ast::Selection::InlineFragment(inline) => {
                    if self.span(inline.location()).is_none() {
                        continue;
                    }
                    let Some(type_condition) = &inline.type_condition else {
                        return self.selections(&inline.selection_set, parent_type);
                    };
                    if let Some(hit) = self.named_type(type_condition, parent_type) {
                        return Some(hit);
                    }
                    let ty = self.schema.types.get(type_condition);
                    return self.selections(&inline.selection_set, ty);
                }
            }
        }
        None
    }
}

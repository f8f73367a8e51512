//! Names that must be unique within their scope.
//!
//! The validator reports a repeated name once, at the repetition. Editors
//! should highlight every occurrence, so these are found from the AST and
//! reported once per node instead.

use apollo_compiler::parser::SourceSpan;
use apollo_compiler::{ast, Name, Node, Schema};
use graphql_syntax::QueryDocument;
use graphql_types::{Diagnostic, OffsetRange};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Repetition {
    Definition,
    Variable,
    Argument,
    Directive,
    ResponseName,
}

impl Repetition {
    /// Whether a validator message describes this kind of repetition.
    fn covers(self, message: &str) -> bool {
        match self {
            Self::Definition => message.contains("is defined multiple times in the document"),
            Self::Variable => message.contains("is declared multiple times"),
            Self::Argument => message.contains("is provided multiple times"),
            Self::Directive => message.contains("can only be used once per location"),
            Self::ResponseName => {
                message.contains("into the same alias")
                    || message.contains("different types using the same name")
                    || message.contains("conflicting field arguments for the same name")
            }
        }
    }
}

/// One node whose name clashes with a sibling.
#[derive(Debug, Clone)]
pub(crate) struct Occurrence {
    repetition: Repetition,
    message: String,
    span: SourceSpan,
}

impl Occurrence {
    /// Whether a validator error at `location` reports this same clash.
    pub(crate) fn reports(&self, message: &str, location: SourceSpan) -> bool {
        self.repetition.covers(message)
            && location.file_id() == self.span.file_id()
            && location.offset() < self.span.end_offset()
            && self.span.offset() < location.end_offset()
    }

    pub(crate) fn to_diagnostic(&self, document: &QueryDocument) -> Diagnostic {
        Diagnostic::validation(
            self.message.clone(),
            document.file_range(OffsetRange::new(self.span.offset(), self.span.end_offset())),
        )
    }
}

/// Every occurrence of a name repeated within its scope, in document order.
pub(crate) fn repeated_names(schema: &Schema, ast: &ast::Document) -> Vec<Occurrence> {
    let mut collector = Collector {
        schema,
        occurrences: Vec::new(),
    };
    collector.definitions(&ast.definitions);
    collector
        .occurrences
        .sort_by_key(|occurrence| occurrence.span.offset());
    collector.occurrences
}

struct Collector<'s> {
    schema: &'s Schema,
    occurrences: Vec<Occurrence>,
}

impl Collector<'_> {
    fn definitions(&mut self, definitions: &[ast::Definition]) {
        let operations = definitions.iter().filter_map(|definition| match definition {
            ast::Definition::OperationDefinition(operation) => {
                operation.name.as_ref().map(|name| (name, name.location()))
            }
            _ => None,
        });
        self.push_repeated(Repetition::Definition, operations, |name| {
            format!("There can be only one operation named \"{name}\".")
        });

        let fragments = definitions.iter().filter_map(|definition| match definition {
            ast::Definition::FragmentDefinition(fragment) => {
                Some((&fragment.name, fragment.name.location()))
            }
            _ => None,
        });
        self.push_repeated(Repetition::Definition, fragments, |name| {
            format!("There can be only one fragment named \"{name}\".")
        });

        for definition in definitions {
            match definition {
                ast::Definition::OperationDefinition(operation) => {
                    self.push_repeated(
                        Repetition::Variable,
                        operation
                            .variables
                            .iter()
                            .map(|variable| (&variable.name, variable.location())),
                        |name| format!("There can be only one variable named \"${name}\"."),
                    );
                    for variable in &operation.variables {
                        self.directives(&variable.directives);
                    }
                    self.directives(&operation.directives);
                    self.selection_set(&operation.selection_set);
                }
                ast::Definition::FragmentDefinition(fragment) => {
                    self.directives(&fragment.directives);
                    self.selection_set(&fragment.selection_set);
                }
                _ => {}
            }
        }
    }

    fn selection_set(&mut self, selections: &[ast::Selection]) {
        self.response_names(selections);
        for selection in selections {
            match selection {
                ast::Selection::Field(field) => {
                    self.arguments(&field.arguments);
                    self.directives(&field.directives);
                    self.selection_set(&field.selection_set);
                }
                ast::Selection::FragmentSpread(spread) => self.directives(&spread.directives),
                ast::Selection::InlineFragment(inline) => {
                    self.directives(&inline.directives);
                    self.selection_set(&inline.selection_set);
                }
            }
        }
    }

    fn arguments(&mut self, arguments: &[Node<ast::Argument>]) {
        self.push_repeated(
            Repetition::Argument,
            arguments
                .iter()
                .map(|argument| (&argument.name, argument.location())),
            |name| format!("There can be only one argument named \"{name}\"."),
        );
    }

    fn directives(&mut self, directives: &ast::DirectiveList) {
        // Unknown directives count as repeatable.
        let schema = self.schema;
        let unique = directives
            .iter()
            .filter(|directive| {
                schema
                    .directive_definitions
                    .get(&directive.name)
                    .is_some_and(|definition| !definition.repeatable)
            })
            .map(|directive| (&directive.name, directive.location()));
        self.push_repeated(Repetition::Directive, unique, |name| {
            format!("The directive \"@{name}\" can only be used once at this location.")
        });

        for directive in directives.iter() {
            self.arguments(&directive.arguments);
        }
    }

    /// Sibling fields sharing a response name must select the same field
    /// with the same arguments.
    fn response_names(&mut self, selections: &[ast::Selection]) {
        let mut groups: IndexMap<&Name, Vec<&Node<ast::Field>>> = IndexMap::new();
        for selection in selections {
            if let ast::Selection::Field(field) = selection {
                groups.entry(field.response_name()).or_default().push(field);
            }
        }

        for (response_name, fields) in groups {
            let Some((first, rest)) = fields.split_first() else {
                continue;
            };
            let reason = if rest.iter().any(|field| field.name != first.name) {
                "they select different fields"
            } else if rest
                .iter()
                .any(|field| !same_arguments(&first.arguments, &field.arguments))
            {
                "they have differing arguments"
            } else {
                continue;
            };

            let message = format!(
                "Fields \"{response_name}\" conflict because {reason}. Use different aliases on the fields to fetch both if this was intentional."
            );
            for field in &fields {
                if let Some(span) = field.location() {
                    self.occurrences.push(Occurrence {
                        repetition: Repetition::ResponseName,
                        message: message.clone(),
                        span,
                    });
                }
            }
        }
    }

    fn push_repeated<'n>(
        &mut self,
        repetition: Repetition,
        items: impl IntoIterator<Item = (&'n Name, Option<SourceSpan>)>,
        message: impl Fn(&Name) -> String,
    ) {
        let mut groups: IndexMap<&Name, Vec<Option<SourceSpan>>> = IndexMap::new();
        for (name, span) in items {
            groups.entry(name).or_default().push(span);
        }

        for (name, spans) in groups {
            if spans.len() < 2 {
                continue;
            }
            let message = message(name);
            for span in spans.into_iter().flatten() {
                self.occurrences.push(Occurrence {
                    repetition,
                    message: message.clone(),
                    span,
                });
            }
        }
    }
}

/// Argument lists are equal regardless of order.
fn same_arguments(left: &[Node<ast::Argument>], right: &[Node<ast::Argument>]) -> bool {
    left.len() == right.len()
        && left.iter().all(|argument| {
            right
                .iter()
                .any(|other| other.name == argument.name && other.value == argument.value)
        })
}

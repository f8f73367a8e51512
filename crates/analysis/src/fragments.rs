use apollo_compiler::{ast, Name, Node};
use graphql_syntax::QueryDocument;
use graphql_types::{FileUri, OffsetRange, Range};
use indexmap::IndexMap;

/// A fragment definition found somewhere in a project.
#[derive(Debug, Clone)]
pub struct FragmentEntry {
    pub definition: Node<ast::FragmentDefinition>,
    /// File that defines the fragment
    pub uri: FileUri,
    /// Range of the whole definition in that file
    pub range: Range,
}

/// Project-wide fragments by name.
pub type Fragments = IndexMap<Name, FragmentEntry>;

/// Index every fragment definition in `documents`.
///
/// Duplicate names resolve to the definition seen last.
pub fn collect_fragments<'a>(documents: impl IntoIterator<Item = &'a QueryDocument>) -> Fragments {
    let mut fragments = Fragments::new();

    for document in documents {
        let Some(ast) = document.ast() else {
            continue;
        };
        for definition in &ast.definitions {
            let ast::Definition::FragmentDefinition(fragment) = definition else {
                continue;
            };
            let range = fragment.location().map_or_else(Range::default, |location| {
                document.file_range(OffsetRange::new(location.offset(), location.end_offset()))
            });
            fragments.insert(
                fragment.name.clone(),
                FragmentEntry {
                    definition: fragment.clone(),
                    uri: document.uri.clone(),
                    range,
                },
            );
        }
    }

    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_syntax::extract_query_documents;
    use graphql_types::{Language, Position};

    fn documents(uri: &str, text: &str, language: Language) -> Vec<QueryDocument> {
        extract_query_documents(&FileUri::new(uri), text, language).unwrap()
    }

    #[test]
    fn test_collects_across_documents() {
        let a = documents(
            "file:///a.ts",
            "gql`fragment A on Query { a }`;\ngql`fragment B on Query { b }`;",
            Language::TypeScript,
        );
        let c = documents("file:///c.graphql", "fragment C on Query { c }", Language::GraphQL);

        let fragments = collect_fragments(a.iter().chain(&c));
        let names: Vec<&str> = fragments.keys().map(Name::as_str).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        let b = &fragments["B"];
        assert_eq!(b.uri.as_str(), "file:///a.ts");
        assert_eq!(b.range.start, Position::new(1, 4));
    }

    #[test]
    fn test_last_definition_wins() {
        let first = documents("file:///1.graphql", "fragment F on Query { a }", Language::GraphQL);
        let second = documents("file:///2.graphql", "fragment F on Query { b }", Language::GraphQL);

        let fragments = collect_fragments(first.iter().chain(&second));
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments["F"].uri.as_str(), "file:///2.graphql");

        let fragments = collect_fragments(second.iter().chain(&first));
        assert_eq!(fragments["F"].uri.as_str(), "file:///1.graphql");
    }

    #[test]
    fn test_skips_syntax_errors() {
        let broken = documents("file:///x.graphql", "fragment F on {", Language::GraphQL);
        assert!(collect_fragments(&broken).is_empty());
    }
}

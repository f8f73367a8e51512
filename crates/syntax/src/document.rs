use std::sync::Arc;

use apollo_compiler::ast;
use apollo_compiler::diagnostic::ToCliReport;
use graphql_extract::{extract_from_source, Language};
use graphql_types::{Diagnostic, FileUri, OffsetRange, Position, Range};

use crate::{mapping, FragmentSource};

/// Result of parsing a fragment: exactly one of an AST or a syntax error.
#[derive(Debug, Clone)]
enum Parsed {
    Ast(Arc<ast::Document>),
    SyntaxError(Diagnostic),
}

/// One parsed (or syntax-failed) GraphQL document extracted from a file.
///
/// Identity is the containing file plus the offset of extraction. Query
/// documents are never patched in place: every extraction pass for a file
/// builds a fresh set.
#[derive(Debug, Clone)]
pub struct QueryDocument {
    pub uri: FileUri,
    pub source: FragmentSource,
    parsed: Parsed,
}

impl QueryDocument {
    /// Parse a fragment. Syntax failures are captured, never returned.
    #[must_use]
    pub fn parse(uri: FileUri, source: FragmentSource) -> Self {
        let parsed = match ast::Document::parse(source.text(), uri.as_str()) {
            Ok(document) => Parsed::Ast(Arc::new(document)),
            Err(with_errors) => Parsed::SyntaxError(syntax_diagnostic(&source, &with_errors.errors)),
        };
        Self {
            uri,
            source,
            parsed,
        }
    }

    /// The parsed document, absent iff there is a syntax error.
    #[must_use]
    pub fn ast(&self) -> Option<&ast::Document> {
        match &self.parsed {
            Parsed::Ast(document) => Some(document),
            Parsed::SyntaxError(_) => None,
        }
    }

    /// The syntax error, absent iff the document parsed.
    #[must_use]
    pub const fn syntax_error(&self) -> Option<&Diagnostic> {
        match &self.parsed {
            Parsed::SyntaxError(diagnostic) => Some(diagnostic),
            Parsed::Ast(_) => None,
        }
    }

    /// Byte offset of the fragment in the containing file.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.source.location().offset
    }

    /// The file range this document spans.
    #[must_use]
    pub fn range(&self) -> Range {
        self.source.location().range
    }

    /// Whether `position` (file coordinates) falls on one of the lines this
    /// document spans, first and last line included.
    #[must_use]
    pub fn contains_position(&self, position: Position) -> bool {
        let range = self.range();
        position.line >= range.start.line && position.line <= range.end.line
    }

    /// Translate a fragment-local byte range into a file range.
    #[must_use]
    pub fn file_range(&self, range: OffsetRange) -> Range {
        mapping::range_in_containing_document(&self.source, self.source.range_of(range))
    }
}

fn syntax_diagnostic(
    source: &FragmentSource,
    errors: &apollo_compiler::validation::DiagnosticList,
) -> Diagnostic {
    let Some(first) = errors.iter().next() else {
        return Diagnostic::syntax("Syntax Error", file_range(source, OffsetRange::default()));
    };

    let span = first
        .error
        .location()
        .map_or_else(OffsetRange::default, |location| {
            OffsetRange::new(location.offset(), location.end_offset())
        });

    Diagnostic::syntax(first.error.to_string(), file_range(source, span))
}

fn file_range(source: &FragmentSource, range: OffsetRange) -> Range {
    mapping::range_in_containing_document(source, source.range_of(range))
}

/// Extract and parse all GraphQL documents in a file.
///
/// Returns `None` when a script file contains no `gql` templates, which is
/// distinct from a file holding one empty document: callers drop whatever
/// they tracked for the file. A `.graphql` file always yields exactly one
/// document.
#[tracing::instrument(skip(text), fields(uri = %uri))]
pub fn extract_query_documents(
    uri: &FileUri,
    text: &str,
    language: Language,
) -> Option<Vec<QueryDocument>> {
    let documents: Vec<QueryDocument> = extract_from_source(text, language)
        .into_iter()
        .map(|extracted| QueryDocument::parse(uri.clone(), extracted.into()))
        .collect();

    if documents.is_empty() {
        return None;
    }

    tracing::debug!(documents = documents.len(), "extracted query documents");
    Some(documents)
}

//! Editor-facing result types, independent of any protocol crate.

use graphql_types::{FileUri, Range};

/// A range in a specific file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub uri: FileUri,
    pub range: Range,
}

impl Location {
    #[must_use]
    pub const fn new(uri: FileUri, range: Range) -> Self {
        Self { uri, range }
    }
}

/// What a completion item inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Keyword,
    Field,
    Type,
    Fragment,
    Argument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertTextFormat {
    PlainText,
    Snippet,
}

/// Completion item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    pub detail: Option<String>,
    pub documentation: Option<String>,
    pub insert_text: Option<String>,
    pub insert_text_format: Option<InsertTextFormat>,
    pub sort_text: Option<String>,
    pub deprecated: bool,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            insert_text: None,
            insert_text_format: None,
            sort_text: None,
            deprecated: false,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_documentation(mut self, documentation: Option<&str>) -> Self {
        self.documentation = documentation.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_snippet(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        self.insert_text_format = Some(InsertTextFormat::Snippet);
        self
    }

    #[must_use]
    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        self.insert_text_format = Some(InsertTextFormat::PlainText);
        self
    }

    #[must_use]
    pub fn with_sort_text(mut self, sort_text: impl Into<String>) -> Self {
        self.sort_text = Some(sort_text.into());
        self
    }

    #[must_use]
    pub const fn with_deprecated(mut self, deprecated: bool) -> Self {
        self.deprecated = deprecated;
        self
    }
}

/// Hover information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    /// Markdown content
    pub contents: String,
    /// Range of the hovered name in the file
    pub range: Option<Range>,
}

impl HoverResult {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            range: None,
        }
    }

    #[must_use]
    pub const fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }
}

/// A command attached to a code lens. An empty `command` id renders the
/// title without making it clickable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLensCommand {
    pub title: String,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLens {
    pub range: Range,
    pub command: CodeLensCommand,
}

impl CodeLens {
    #[must_use]
    pub fn new(range: Range, title: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            range,
            command: CodeLensCommand {
                title: title.into(),
                command: command.into(),
            },
        }
    }
}

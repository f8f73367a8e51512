//! Conversions between the language service's types and LSP protocol types.
//!
//! IDE and project values go out through [`IntoLsp`]. Requests come in
//! through [`file_uri`] and [`ide_position`].

use std::path::PathBuf;

use graphql_ide::{CodeLens, CompletionItem, CompletionKind, HoverResult, InsertTextFormat, Location};
use graphql_types::{Diagnostic, DiagnosticSeverity, FileUri, Position, Range};
use lsp_types::Uri;

/// Extension trait for converting language-service values to LSP types.
pub trait IntoLsp {
    type Output;
    fn into_lsp(self) -> Self::Output;
}

impl IntoLsp for Position {
    type Output = lsp_types::Position;
    fn into_lsp(self) -> lsp_types::Position {
        lsp_types::Position {
            line: self.line,
            character: self.character,
        }
    }
}

impl IntoLsp for Range {
    type Output = lsp_types::Range;
    fn into_lsp(self) -> lsp_types::Range {
        lsp_types::Range {
            start: self.start.into_lsp(),
            end: self.end.into_lsp(),
        }
    }
}

impl IntoLsp for Diagnostic {
    type Output = lsp_types::Diagnostic;
    fn into_lsp(self) -> lsp_types::Diagnostic {
        let severity = match self.severity {
            DiagnosticSeverity::Error => lsp_types::DiagnosticSeverity::ERROR,
            DiagnosticSeverity::Warning => lsp_types::DiagnosticSeverity::WARNING,
        };
        lsp_types::Diagnostic {
            range: self.range.into_lsp(),
            severity: Some(severity),
            source: Some(self.source.to_string()),
            message: self.message,
            ..Default::default()
        }
    }
}

impl IntoLsp for HoverResult {
    type Output = lsp_types::Hover;
    fn into_lsp(self) -> lsp_types::Hover {
        lsp_types::Hover {
            contents: lsp_types::HoverContents::Markup(lsp_types::MarkupContent {
                kind: lsp_types::MarkupKind::Markdown,
                value: self.contents,
            }),
            range: self.range.map(IntoLsp::into_lsp),
        }
    }
}

impl IntoLsp for CompletionItem {
    type Output = lsp_types::CompletionItem;
    fn into_lsp(self) -> lsp_types::CompletionItem {
        lsp_types::CompletionItem {
            label: self.label,
            kind: Some(match self.kind {
                CompletionKind::Keyword => lsp_types::CompletionItemKind::KEYWORD,
                CompletionKind::Field => lsp_types::CompletionItemKind::FIELD,
                CompletionKind::Type => lsp_types::CompletionItemKind::CLASS,
                CompletionKind::Fragment => lsp_types::CompletionItemKind::SNIPPET,
                CompletionKind::Argument => lsp_types::CompletionItemKind::PROPERTY,
            }),
            detail: self.detail,
            documentation: self.documentation.map(|documentation| {
                lsp_types::Documentation::MarkupContent(lsp_types::MarkupContent {
                    kind: lsp_types::MarkupKind::Markdown,
                    value: documentation,
                })
            }),
            deprecated: Some(self.deprecated),
            insert_text: self.insert_text,
            insert_text_format: self.insert_text_format.map(|format| match format {
                InsertTextFormat::PlainText => lsp_types::InsertTextFormat::PLAIN_TEXT,
                InsertTextFormat::Snippet => lsp_types::InsertTextFormat::SNIPPET,
            }),
            sort_text: self.sort_text,
            ..Default::default()
        }
    }
}

impl IntoLsp for CodeLens {
    type Output = lsp_types::CodeLens;
    fn into_lsp(self) -> lsp_types::CodeLens {
        lsp_types::CodeLens {
            range: self.range.into_lsp(),
            command: Some(lsp_types::Command {
                title: self.command.title,
                command: self.command.command,
                arguments: None,
            }),
            data: None,
        }
    }
}

/// `None` when the location's URI is not a valid LSP URI.
impl IntoLsp for Location {
    type Output = Option<lsp_types::Location>;
    fn into_lsp(self) -> Option<lsp_types::Location> {
        Some(lsp_types::Location {
            uri: lsp_uri(&self.uri)?,
            range: self.range.into_lsp(),
        })
    }
}

pub const fn ide_position(position: lsp_types::Position) -> Position {
    Position::new(position.line, position.character)
}

/// The project model's key for a client URI.
///
/// `file://` URIs are normalized through their path, so that a client's
/// percent-encoding matches URIs built while scanning the disk.
pub fn file_uri(uri: &Uri) -> FileUri {
    uri_to_path(uri)
        .and_then(|path| FileUri::from_path(&path))
        .unwrap_or_else(|| FileUri::new(uri.as_str()))
}

pub fn lsp_uri(uri: &FileUri) -> Option<Uri> {
    uri.as_str().parse().ok()
}

pub fn uri_to_path(uri: &Uri) -> Option<PathBuf> {
    url::Url::parse(uri.as_str()).ok()?.to_file_path().ok()
}

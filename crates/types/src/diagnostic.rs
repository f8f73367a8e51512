//! Diagnostic records published per file.

use crate::Range;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Syntax and validation failures
    Error,
    /// Deprecated usages
    Warning,
}

/// The producer of a diagnostic, surfaced to editors as the `source` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSource {
    /// The document could not be parsed
    Syntax,
    /// A validation rule failed against the schema
    Validation,
    /// A deprecated field or enum value is used
    Deprecation,
}

impl DiagnosticSource {
    /// The tag string editors display next to the message.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "GraphQL: Syntax",
            Self::Validation => "GraphQL: Validation",
            Self::Deprecation => "GraphQL: Deprecation",
        }
    }

    /// The severity every diagnostic from this source carries.
    #[must_use]
    pub const fn severity(self) -> DiagnosticSeverity {
        match self {
            Self::Syntax | Self::Validation => DiagnosticSeverity::Error,
            Self::Deprecation => DiagnosticSeverity::Warning,
        }
    }
}

impl std::fmt::Display for DiagnosticSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A severity-tagged, range-located message about a GraphQL document.
///
/// The range is always in the coordinates of the containing file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub source: DiagnosticSource,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub range: Range,
}

impl Diagnostic {
    /// Create a diagnostic whose severity follows from its source.
    #[must_use]
    pub fn new(source: DiagnosticSource, message: impl Into<String>, range: Range) -> Self {
        Self {
            source,
            message: message.into(),
            severity: source.severity(),
            range,
        }
    }

    #[must_use]
    pub fn syntax(message: impl Into<String>, range: Range) -> Self {
        Self::new(DiagnosticSource::Syntax, message, range)
    }

    #[must_use]
    pub fn validation(message: impl Into<String>, range: Range) -> Self {
        Self::new(DiagnosticSource::Validation, message, range)
    }

    #[must_use]
    pub fn deprecation(message: impl Into<String>, range: Range) -> Self {
        Self::new(DiagnosticSource::Deprecation, message, range)
    }
}

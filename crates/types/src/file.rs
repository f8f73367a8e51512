//! File-related types: [`FileUri`], [`Language`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A URI string identifying a file.
///
/// Usually a `file://` URI. Cheap to clone; used as the key for every
/// per-file map in the project model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileUri(Arc<str>);

impl FileUri {
    /// Create a new `FileUri` from a string.
    #[must_use]
    pub fn new(uri: impl Into<Arc<str>>) -> Self {
        Self(uri.into())
    }

    /// Create a `file://` URI from an absolute filesystem path.
    ///
    /// Returns `None` for relative paths.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        url::Url::from_file_path(path)
            .ok()
            .map(|url| Self::new(url.as_str()))
    }

    /// Get the URI as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert a `file://` URI back to a filesystem path.
    ///
    /// Returns `None` for other schemes or malformed URIs.
    #[must_use]
    pub fn to_file_path(&self) -> Option<PathBuf> {
        url::Url::parse(&self.0).ok()?.to_file_path().ok()
    }

    /// Classify the file behind this URI by its extension.
    #[must_use]
    pub fn language(&self) -> Option<Language> {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        Language::from_path(Path::new(path))
    }
}

impl std::fmt::Display for FileUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FileUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

/// Source language of a file (determines extraction strategy).
///
/// Classification is driven purely by file extension; files with any
/// other extension are inert to the project model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// Raw GraphQL files (.graphql)
    GraphQL,
    /// JavaScript (.js)
    JavaScript,
    /// JavaScript with JSX (.jsx)
    JavaScriptReact,
    /// TypeScript (.ts)
    TypeScript,
    /// TypeScript with JSX (.tsx)
    TypeScriptReact,
}

impl Language {
    /// Detect language from a file path based on its extension.
    ///
    /// Returns `None` if the extension is not recognized.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "graphql" => Some(Self::GraphQL),
            "js" => Some(Self::JavaScript),
            "jsx" => Some(Self::JavaScriptReact),
            "ts" => Some(Self::TypeScript),
            "tsx" => Some(Self::TypeScriptReact),
            _ => None,
        }
    }

    /// The editor language identifier for this language.
    #[must_use]
    pub const fn language_id(self) -> &'static str {
        match self {
            Self::GraphQL => "graphql",
            Self::JavaScript => "javascript",
            Self::JavaScriptReact => "javascriptreact",
            Self::TypeScript => "typescript",
            Self::TypeScriptReact => "typescriptreact",
        }
    }

    /// Check if this language requires extraction (vs. direct GraphQL parsing).
    #[must_use]
    pub const fn requires_extraction(self) -> bool {
        !matches!(self, Self::GraphQL)
    }
}

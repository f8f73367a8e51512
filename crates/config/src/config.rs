use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level GraphQL configuration.
/// Either a single project or multiple named projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphQLConfig {
    /// Multi-project configuration, in file order
    Multi {
        projects: IndexMap<String, ProjectConfig>,
    },
    /// Single project configuration (boxed to reduce enum size)
    Single(Box<ProjectConfig>),
}

impl GraphQLConfig {
    /// Get all projects in configuration order.
    /// A single project config yields one unnamed project.
    #[must_use]
    pub fn projects(&self) -> Box<dyn Iterator<Item = (Option<&str>, &ProjectConfig)> + '_> {
        match self {
            Self::Single(config) => Box::new(std::iter::once((None, config.as_ref()))),
            Self::Multi { projects } => Box::new(
                projects
                    .iter()
                    .map(|(name, config)| (Some(name.as_str()), config)),
            ),
        }
    }

    /// Check if this is a multi-project configuration
    #[must_use]
    pub const fn is_multi_project(&self) -> bool {
        matches!(self, Self::Multi { .. })
    }

    /// Get the number of projects
    #[must_use]
    pub fn project_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi { projects } => projects.len(),
        }
    }
}

/// Configuration for a single GraphQL project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Path to the schema file, relative to the config directory
    #[serde(alias = "schema", skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<String>,

    /// File patterns to include
    #[serde(
        alias = "include",
        alias = "documents",
        skip_serializing_if = "Option::is_none"
    )]
    pub includes: Option<Patterns>,

    /// File patterns to exclude
    #[serde(alias = "exclude", skip_serializing_if = "Option::is_none")]
    pub excludes: Option<Patterns>,
}

/// One glob pattern or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    /// Single pattern
    Pattern(String),
    /// Multiple patterns
    Patterns(Vec<String>),
}

impl Patterns {
    /// Get all patterns
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::Pattern(pattern) => vec![pattern.as_str()],
            Self::Patterns(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }
}

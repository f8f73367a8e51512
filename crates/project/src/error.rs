use std::path::PathBuf;

use graphql_config::ConfigError;

/// Errors that prevent a project from being set up.
///
/// Everything that can go wrong after construction (syntax errors,
/// validation errors, unreadable documents) is reported as diagnostics or
/// logged instead.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Project {project}: {message}")]
    Configuration { project: String, message: String },

    #[error("Project {project}: failed to read schema {}: {source}", path.display())]
    SchemaIo {
        project: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ProjectError>;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No GraphQL config file found in {} or any parent directory", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

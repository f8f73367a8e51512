//! Project configuration for the embedded GraphQL language service.
//!
//! A workspace folder is configured by the nearest `.graphqlconfig` (or
//! `.graphqlrc`) file at or above it. One file may describe a single
//! project or several named ones; each resolves to a [`ResolvedProject`]
//! that knows its schema file and which paths it includes.

mod config;
mod error;
mod loader;
mod project;

pub use config::{GraphQLConfig, Patterns, ProjectConfig};
pub use error::{ConfigError, Result};
pub use loader::{find_config, is_config_file, load_config, load_config_from_str, CONFIG_FILES};
pub use project::{ResolvedProject, DEFAULT_EXCLUDES};

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::{ConfigError, GraphQLConfig, Patterns, ProjectConfig, Result};

/// Patterns excluded when a project configures no excludes of its own.
pub const DEFAULT_EXCLUDES: &[&str] = &["node_modules/**"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A project entry from a config file, resolved against the config's
/// directory.
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    /// Project name for multi-project configs
    pub name: Option<String>,
    /// Directory containing the config file; the project's root
    pub config_dir: PathBuf,
    /// Absolute schema path, if one is configured
    pub schema_path: Option<PathBuf>,
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
    /// Directories whose whole subtree is excluded (`<dir>/**` excludes)
    excluded_dirs: Vec<Pattern>,
}

impl ResolvedProject {
    /// Resolve one project entry of a config file located in `config_dir`.
    pub fn new(
        name: Option<&str>,
        config: &ProjectConfig,
        config_dir: &Path,
        config_path: &Path,
    ) -> Result<Self> {
        let compile = |patterns: Vec<&str>| -> Result<Vec<Pattern>> {
            patterns
                .into_iter()
                .flat_map(expand_braces)
                .map(|pattern| {
                    Pattern::new(&pattern).map_err(|e| ConfigError::Invalid {
                        path: config_path.to_path_buf(),
                        message: format!("Invalid glob pattern '{pattern}': {e}"),
                    })
                })
                .collect()
        };

        let includes = compile(config.includes.as_ref().map_or_else(Vec::new, Patterns::patterns))?;
        let excludes = compile(
            config
                .excludes
                .as_ref()
                .map_or_else(|| DEFAULT_EXCLUDES.to_vec(), Patterns::patterns),
        )?;
        let excluded_dirs = excludes
            .iter()
            .filter_map(|pattern| pattern.as_str().strip_suffix("/**"))
            .filter_map(|dir| Pattern::new(dir).ok())
            .collect();

        Ok(Self {
            name: name.map(str::to_string),
            config_dir: config_dir.to_path_buf(),
            schema_path: config
                .schema_path
                .as_deref()
                .map(|schema_path| normalize(&config_dir.join(schema_path))),
            includes,
            excludes,
            excluded_dirs,
        })
    }

    /// Resolve every project in a loaded config, in configuration order.
    pub fn from_config(config: &GraphQLConfig, config_path: &Path) -> Result<Vec<Self>> {
        let config_dir = config_path.parent().unwrap_or_else(|| Path::new(""));
        config
            .projects()
            .map(|(name, project)| Self::new(name, project, config_dir, config_path))
            .collect()
    }

    /// `"<configDir>"` or `"<configDir> (<name>)"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({name})", self.config_dir.display()),
            None => self.config_dir.display().to_string(),
        }
    }

    /// Whether this project claims `path`.
    ///
    /// A path outside the config directory never matches, even with no
    /// include patterns configured. The schema file itself never matches.
    #[must_use]
    pub fn includes_path(&self, path: &Path) -> bool {
        let path = normalize(path);

        if self.schema_path.as_deref() == Some(path.as_path()) {
            return false;
        }

        let Some(relative) = self.relative_path(&path) else {
            return false;
        };

        if self
            .excludes
            .iter()
            .any(|pattern| pattern.matches_with(&relative, MATCH_OPTIONS))
        {
            return false;
        }

        self.includes.is_empty()
            || self
                .includes
                .iter()
                .any(|pattern| pattern.matches_with(&relative, MATCH_OPTIONS))
    }

    /// Whether every path below the directory `dir` is excluded, so a scan
    /// need not descend into it.
    #[must_use]
    pub fn excludes_dir(&self, dir: &Path) -> bool {
        self.relative_path(&normalize(dir))
            .filter(|relative| !relative.is_empty())
            .is_some_and(|relative| {
                self.excluded_dirs
                    .iter()
                    .any(|pattern| pattern.matches_with(&relative, MATCH_OPTIONS))
            })
    }

    /// `path` relative to the config directory, `/`-separated.
    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.config_dir).ok()?;
        Some(
            relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        )
    }
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Normalize a pattern to be relative to the config directory.
fn normalize_pattern(pattern: &str) -> String {
    let mut normalized = pattern.trim();

    // Remove leading "./"
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest;
    }

    // Remove leading "/" (patterns are relative)
    let mut normalized = normalized.trim_start_matches('/').to_string();

    // Collapse consecutive slashes
    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }

    normalized
}

/// Expand `{a,b}` alternations into separate patterns, one group at a time.
fn expand_braces(pattern: &str) -> Vec<String> {
    let normalized = normalize_pattern(pattern);

    let Some(start) = normalized.find('{') else {
        return vec![normalized];
    };
    let Some(end) = normalized[start..].find('}').map(|end| start + end) else {
        return vec![normalized];
    };

    let before = &normalized[..start];
    let after = &normalized[end + 1..];
    normalized[start + 1..end]
        .split(',')
        .flat_map(|option| expand_braces(&format!("{before}{}{after}", option.trim())))
        .collect()
}

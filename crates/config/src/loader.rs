use crate::{ConfigError, GraphQLConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
pub const CONFIG_FILES: &[&str] = &[
    ".graphqlconfig",
    ".graphqlconfig.json",
    ".graphqlconfig.yaml",
    ".graphqlconfig.yml",
    ".graphqlrc",
    ".graphqlrc.json",
    ".graphqlrc.yaml",
    ".graphqlrc.yml",
];

/// Whether a path names a recognized config file.
#[must_use]
pub fn is_config_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| CONFIG_FILES.contains(&name))
}

/// Find a GraphQL config file by walking up the directory tree from the given start directory.
/// Returns the path to the config file if found.
#[tracing::instrument(fields(start = %start_dir.display()))]
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current_dir = start_dir.to_path_buf();
    let mut checked_dirs = 0;

    loop {
        tracing::trace!(dir = %current_dir.display(), "Checking directory for config files");
        for file_name in CONFIG_FILES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                tracing::info!(path = %config_path.display(), checked_dirs, "Found config file");
                return Some(config_path);
            }
        }

        checked_dirs += 1;
        if !current_dir.pop() {
            tracing::debug!(checked_dirs, "No config file found");
            return None;
        }
    }
}

/// Load a GraphQL config from the specified path.
/// Automatically detects the format based on file extension.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<GraphQLConfig> {
    tracing::debug!("Reading config file");
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = load_config_from_str(&contents, path)?;
    tracing::info!(
        projects = config.project_count(),
        multi_project = config.is_multi_project(),
        "Config loaded successfully"
    );
    Ok(config)
}

/// Load a GraphQL config from a string.
/// The path is used for error messages and format detection.
#[tracing::instrument(skip(contents), fields(path = %path.display(), size = contents.len()))]
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<GraphQLConfig> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    let config = match extension {
        "yml" | "yaml" => {
            tracing::trace!("Parsing as YAML");
            parse_yaml(contents, path)?
        }
        "json" => {
            tracing::trace!("Parsing as JSON");
            parse_json(contents, path)?
        }
        _ => {
            // No extension (.graphqlconfig, .graphqlrc) - try JSON first, then YAML
            tracing::trace!("Trying JSON then YAML");
            parse_json(contents, path).or_else(|_| parse_yaml(contents, path))?
        }
    };

    tracing::debug!("Validating config");
    validate_config(&config, path)?;

    Ok(config)
}

/// Parse YAML configuration
fn parse_yaml(contents: &str, path: &Path) -> Result<GraphQLConfig> {
    serde_saphyr::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("YAML parse error: {e}"),
    })
}

/// Parse JSON configuration
fn parse_json(contents: &str, path: &Path) -> Result<GraphQLConfig> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

/// Validate the loaded configuration
fn validate_config(config: &GraphQLConfig, path: &Path) -> Result<()> {
    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    if config.project_count() == 0 {
        return Err(invalid("`projects` is empty".to_string()));
    }

    for (name, project) in config.projects() {
        let name = name.unwrap_or("default");

        if project
            .schema_path
            .as_deref()
            .is_some_and(|schema_path| schema_path.trim().is_empty())
        {
            return Err(invalid(format!("Project '{name}' has empty schema path")));
        }

        let patterns = project
            .includes
            .iter()
            .chain(project.excludes.iter())
            .flat_map(crate::Patterns::patterns);
        for pattern in patterns {
            if pattern.trim().is_empty() {
                return Err(invalid(format!("Project '{name}' has empty file pattern")));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_json_single_project() {
        let json = r#"
{
  "schemaPath": "schema.graphql",
  "includes": ["src/**/*.graphql"]
}
"#;

        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(!config.is_multi_project());
        assert_eq!(config.project_count(), 1);
    }

    #[test]
    fn test_load_yaml_single_project() {
        let yaml = r#"
schemaPath: "schema.graphql"
includes: "**/*.graphql"
"#;

        let mut file = NamedTempFile::with_suffix(".yml").unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file.flush().unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(!config.is_multi_project());
    }

    #[test]
    fn test_load_extensionless_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join(".graphqlconfig");
        fs::write(
            &config_path,
            r#"{ "projects": { "a": { "schemaPath": "a.graphql" }, "b": { "schemaPath": "b.graphql" } } }"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();
        assert!(config.is_multi_project());
        assert_eq!(config.project_count(), 2);
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(b"{ not json").unwrap();
        file.flush().unwrap();

        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validation_empty_schema() {
        let result = load_config_from_str(r#"{ "schemaPath": "  " }"#, Path::new("c.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_empty_pattern() {
        let result = load_config_from_str(
            r#"{ "schemaPath": "s.graphql", "excludes": [""] }"#,
            Path::new("c.json"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_empty_projects() {
        let result = load_config_from_str(r#"{ "projects": {} }"#, Path::new("c.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = load_config(&temp_dir.path().join(".graphqlconfig"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join(".graphqlconfig");
        fs::write(&config_path, r#"{"schemaPath": "schema.graphql"}"#).unwrap();

        let found = find_config(temp_dir.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join(".graphqlconfig");
        fs::write(&config_path, r#"{"schemaPath": "schema.graphql"}"#).unwrap();

        let sub_dir = temp_dir.path().join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let found = find_config(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_config_file_priority() {
        let temp_dir = tempfile::tempdir().unwrap();

        fs::write(
            temp_dir.path().join(".graphqlrc.yml"),
            "schemaPath: yml.graphql",
        )
        .unwrap();
        fs::write(
            temp_dir.path().join(".graphqlconfig"),
            r#"{"schemaPath": "json.graphql"}"#,
        )
        .unwrap();

        let found = find_config(temp_dir.path()).unwrap();

        assert_eq!(found.file_name().unwrap(), ".graphqlconfig");
    }

    #[test]
    fn test_is_config_file() {
        assert!(is_config_file(Path::new("/a/b/.graphqlconfig")));
        assert!(is_config_file(Path::new(".graphqlrc.yaml")));
        assert!(!is_config_file(Path::new("/a/graphqlconfig")));
        assert!(!is_config_file(Path::new("/a/schema.graphql")));
    }
}

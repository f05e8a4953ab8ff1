//! Root configuration document
//!
//! The whole TOML file is kept as an ordered map so that type sections and
//! task entries can be merged key by key without knowing their schema.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::{ConfigError, ConfigMap, Repositories, RepositoryConfig};

/// Name of the section holding repository definitions
pub const REPOSITORIES_KEY: &str = "repositories";

/// Name of the array holding task entries
pub const TASKS_KEY: &str = "tasks";

/// The parsed configuration file
#[derive(Debug, Clone, Default)]
pub struct RootConfig {
    values: ConfigMap,
}

impl RootConfig {
    /// Loads configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let values: ConfigMap =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(Self { values })
    }

    /// Wraps an already-built mapping
    pub fn from_map(values: ConfigMap) -> Self {
        Self { values }
    }

    /// Returns the whole document
    pub fn as_map(&self) -> &ConfigMap {
        &self.values
    }

    /// Returns a named section, if present and a table
    pub fn section(&self, name: &str) -> Option<&ConfigMap> {
        self.values.get(name).and_then(Value::as_object)
    }

    /// Returns the task entries in file order (absent section yields none)
    pub fn tasks(&self) -> Result<Vec<ConfigMap>, ConfigError> {
        let entries = match self.values.get(TASKS_KEY) {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(ConfigError::InvalidSection {
                    section: TASKS_KEY.to_string(),
                    reason: "expected an array of tables".to_string(),
                })
            }
            None => return Ok(Vec::new()),
        };

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                entry
                    .as_object()
                    .cloned()
                    .ok_or_else(|| ConfigError::InvalidSection {
                        section: TASKS_KEY.to_string(),
                        reason: format!("entry {} is not a table", index),
                    })
            })
            .collect()
    }

    /// Returns the repository definitions (absent section yields none)
    pub fn repositories(&self) -> Result<Repositories, ConfigError> {
        let section = match self.values.get(REPOSITORIES_KEY) {
            Some(section) => section.clone(),
            None => return Ok(Repositories::default()),
        };

        let entries: std::collections::HashMap<String, RepositoryConfig> =
            serde_json::from_value(section).map_err(|e| ConfigError::InvalidSection {
                section: REPOSITORIES_KEY.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Repositories::new(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EXAMPLE: &str = r#"
[XMPP]
account    = "sender@test-server.net"
password   = "my-password"
recipient  = "recipient@test-server.net"

[repositories.test-repo]
url = "my-url"
password = "repo-password"

[backup]
repository = "test-repo"

[[tasks]]
type       = "rclone"
name       = "First task"
tags       = []

[[tasks]]
type       = "backup"
name       = "Second task"
tags       = ["daily"]
"#;

    #[test]
    fn parse_sections() {
        let config = RootConfig::from_toml_str(EXAMPLE).unwrap();

        let xmpp = config.section("XMPP").unwrap();
        assert_eq!(xmpp["account"], "sender@test-server.net");
        assert_eq!(config.section("backup").unwrap()["repository"], "test-repo");
        assert!(config.section("prune").is_none());
    }

    #[test]
    fn tasks_keep_file_order() {
        let config = RootConfig::from_toml_str(EXAMPLE).unwrap();

        let tasks = config.tasks().unwrap();
        let names: Vec<_> = tasks.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["First task", "Second task"]);
        assert_eq!(tasks[0]["type"], "rclone");
    }

    #[test]
    fn missing_task_section_is_empty() {
        let config = RootConfig::from_toml_str("[XMPP]\naccount = \"a\"\n").unwrap();

        assert!(config.tasks().unwrap().is_empty());
    }

    #[test]
    fn task_section_must_be_an_array() {
        let config = RootConfig::from_toml_str("tasks = 3\n").unwrap();

        assert!(matches!(config.tasks(), Err(ConfigError::InvalidSection { .. })));
    }

    #[test]
    fn repositories_are_parsed() {
        let config = RootConfig::from_toml_str(EXAMPLE).unwrap();

        let repositories = config.repositories().unwrap();
        let repo = repositories.resolve("test-repo").unwrap();
        assert_eq!(repo.url, "my-url");
        assert_eq!(repo.password, "repo-password");
    }

    #[test]
    fn repository_without_password_is_invalid() {
        let config = RootConfig::from_toml_str("[repositories.r]\nurl = \"u\"\n").unwrap();

        assert!(config.repositories().is_err());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let result = RootConfig::from_toml_str("[XMPP\naccount = ");

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(EXAMPLE.as_bytes()).unwrap();

        let config = RootConfig::load(file.path()).unwrap();
        assert_eq!(config.tasks().unwrap().len(), 2);
    }

    #[test]
    fn load_missing_file_is_a_read_error() {
        let result = RootConfig::load(Path::new("/nonexistent/auto-backup.toml"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}

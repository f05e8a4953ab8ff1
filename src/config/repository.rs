//! Named archive repositories

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

use super::ConfigError;

/// A `[repositories.<name>]` entry
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryConfig {
    pub url: String,
    pub password: String,
}

impl fmt::Debug for RepositoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("url", &self.url)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A repository resolved by name
#[derive(Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub url: String,
    pub password: String,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// All repositories declared in the configuration
#[derive(Debug, Clone, Default)]
pub struct Repositories {
    entries: HashMap<String, RepositoryConfig>,
}

impl Repositories {
    pub fn new(entries: HashMap<String, RepositoryConfig>) -> Self {
        Self { entries }
    }

    /// Looks up a repository by name
    pub fn resolve(&self, name: &str) -> Result<Repository, ConfigError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ConfigError::UnknownRepository(name.to_string()))?;

        Ok(Repository {
            name: name.to_string(),
            url: entry.url.clone(),
            password: entry.password.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

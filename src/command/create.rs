//! Archive creation through `borg create`

use std::path::PathBuf;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::json;

use super::borg::{with_repository_env, BORG};
use super::{required, Command, CommandError, Invocation, ProcessRunner};
use crate::config::{ConfigError, ConfigMap, Injectable, Repositories, Repository};

/// Parameters of a `backup` task
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveCreateParams {
    /// Checked when the archive is created
    pub source: Option<PathBuf>,
    pub repository: String,
    pub excludes: Vec<String>,
    pub ssh_command: Option<String>,
}

impl Injectable for ArchiveCreateParams {
    const TARGET: &'static str = "backup";
    const PARAMETERS: &'static [&'static str] = &["source", "repository", "excludes", "sshCommand"];

    fn defaults() -> ConfigMap {
        let mut defaults = ConfigMap::new();
        defaults.insert("excludes".to_string(), json!([]));
        defaults
    }
}

pub struct ArchiveCreateCommand {
    source: Option<PathBuf>,
    repository: Repository,
    excludes: Vec<String>,
    ssh_command: Option<String>,
    runner: Rc<dyn ProcessRunner>,
}

impl ArchiveCreateCommand {
    /// Resolves the repository name; an unknown name is a configuration error
    pub fn new(
        params: ArchiveCreateParams,
        repositories: &Repositories,
        runner: Rc<dyn ProcessRunner>,
    ) -> Result<Self, ConfigError> {
        let repository = repositories.resolve(&params.repository)?;

        Ok(Self {
            source: params.source,
            repository,
            excludes: params.excludes,
            ssh_command: params.ssh_command,
            runner,
        })
    }

    /// Archive name; `{hostname}` and `{now}` are expanded by borg itself
    pub fn archive(&self) -> String {
        format!("{}::{{hostname}}-{{now}}", self.repository.url)
    }

    pub fn invocation(&self) -> Result<Invocation, CommandError> {
        let source = required(self.source.as_deref(), "source")?;
        let excludes = self
            .excludes
            .iter()
            .flat_map(|pattern| ["--exclude", pattern.as_str()]);

        let invocation = Invocation::new(BORG)
            .args(["--verbose", "create"])
            .args(excludes)
            .arg(self.archive())
            .arg(".")
            .current_dir(source);

        Ok(with_repository_env(
            invocation,
            &self.repository.password,
            self.ssh_command.as_deref(),
        ))
    }
}

impl Command for ArchiveCreateCommand {
    fn execute(&self) -> Result<(), CommandError> {
        self.runner.run(&self.invocation()?)
    }
}

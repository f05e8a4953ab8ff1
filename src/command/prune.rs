//! Retention pruning through `borg prune`

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use super::borg::{with_repository_env, BORG};
use super::{Command, CommandError, Invocation, ProcessRunner};
use crate::config::{ConfigError, Injectable, Repositories, Repository};

/// A `--keep-*` value, passed to borg verbatim
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RetentionValue {
    Count(i64),
    Text(String),
}

impl fmt::Display for RetentionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionValue::Count(n) => write!(f, "{}", n),
            RetentionValue::Text(s) => f.write_str(s),
        }
    }
}

/// Parameters of a `prune` task
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArchivePruneParams {
    pub repository: String,
    pub dry_run: Option<bool>,
    pub ssh_command: Option<String>,
    pub within: Option<RetentionValue>,
    pub daily: Option<RetentionValue>,
    pub weekly: Option<RetentionValue>,
    pub monthly: Option<RetentionValue>,
}

impl Injectable for ArchivePruneParams {
    const TARGET: &'static str = "prune";
    const PARAMETERS: &'static [&'static str] = &[
        "repository",
        "dryRun",
        "sshCommand",
        "within",
        "daily",
        "weekly",
        "monthly",
    ];
}

pub struct ArchivePruneCommand {
    repository: Repository,
    dry_run: bool,
    ssh_command: Option<String>,
    keep: [(&'static str, Option<RetentionValue>); 4],
    runner: Rc<dyn ProcessRunner>,
}

impl ArchivePruneCommand {
    pub fn new(
        params: ArchivePruneParams,
        repositories: &Repositories,
        runner: Rc<dyn ProcessRunner>,
    ) -> Result<Self, ConfigError> {
        let repository = repositories.resolve(&params.repository)?;

        Ok(Self {
            repository,
            dry_run: params.dry_run.unwrap_or(false),
            ssh_command: params.ssh_command,
            keep: [
                ("within", params.within),
                ("daily", params.daily),
                ("weekly", params.weekly),
                ("monthly", params.monthly),
            ],
            runner,
        })
    }

    pub fn invocation(&self) -> Invocation {
        let mode = if self.dry_run { "--dry-run" } else { "--stats" };

        let keep = self.keep.iter().filter_map(|(period, value)| {
            value
                .as_ref()
                .map(|value| [format!("--keep-{}", period), value.to_string()])
        });

        let invocation = Invocation::new(BORG)
            .args(["--verbose", "prune", "--list", mode])
            .args(keep.flatten())
            .arg(&self.repository.url);

        with_repository_env(
            invocation,
            &self.repository.password,
            self.ssh_command.as_deref(),
        )
    }
}

impl Command for ArchivePruneCommand {
    fn execute(&self) -> Result<(), CommandError> {
        self.runner.run(&self.invocation())
    }
}

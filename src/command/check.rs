//! Archive count verification through `borg list --json`
//!
//! One listing per repository, in configured order. The counts for all
//! repositories are reported as a single notification.

use std::rc::Rc;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::borg::{with_repository_env, BORG};
use super::{Command, CommandError, Invocation, ProcessRunner};
use crate::config::{ConfigError, Injectable, Repositories, Repository};
use crate::notify::Notifications;

/// Parameters of a `check` task
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveCheckParams {
    pub repositories: Vec<String>,
    pub ssh_command: Option<String>,
}

impl Injectable for ArchiveCheckParams {
    const TARGET: &'static str = "check";
    const PARAMETERS: &'static [&'static str] = &["repositories", "sshCommand"];
}

#[derive(Debug, Deserialize)]
struct ArchiveListing {
    archives: Vec<ArchiveEntry>,
}

#[derive(Debug, Deserialize)]
struct ArchiveEntry {
    start: String,
}

/// Archive counts of one repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveCount {
    /// Archives started less than 24 hours before the check
    pub recent: usize,
    pub total: usize,
}

/// Parses a borg `start` timestamp (date-only or full ISO-8601)
///
/// Timestamps with an offset are converted to local time.
pub fn parse_start(value: &str) -> Result<NaiveDateTime, CommandError> {
    if let Ok(timestamp) = value.parse::<NaiveDateTime>() {
        return Ok(timestamp);
    }

    if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(timestamp);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Local).naive_local());
    }

    value
        .parse::<NaiveDate>()
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CommandError::Timestamp(value.to_string()))
}

/// Counts archives within the trailing day and overall
pub fn count_archives(starts: &[NaiveDateTime], now: NaiveDateTime) -> ArchiveCount {
    let one_day = Duration::days(1);
    let recent = starts
        .iter()
        .filter(|&&start| now.signed_duration_since(start) < one_day)
        .count();

    ArchiveCount {
        recent,
        total: starts.len(),
    }
}

pub struct ArchiveCheckCommand {
    repositories: Vec<Repository>,
    ssh_command: Option<String>,
    notify: Rc<Notifications>,
    runner: Rc<dyn ProcessRunner>,
}

impl ArchiveCheckCommand {
    /// Resolves every repository name up front
    pub fn new(
        params: ArchiveCheckParams,
        repositories: &Repositories,
        notify: Rc<Notifications>,
        runner: Rc<dyn ProcessRunner>,
    ) -> Result<Self, ConfigError> {
        let repositories = params
            .repositories
            .iter()
            .map(|name| repositories.resolve(name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            repositories,
            ssh_command: params.ssh_command,
            notify,
            runner,
        })
    }

    pub fn invocation(&self, repository: &Repository) -> Invocation {
        let invocation = Invocation::new(BORG)
            .args(["list", "--json"])
            .arg(&repository.url);

        with_repository_env(invocation, &repository.password, self.ssh_command.as_deref())
    }

    fn count(&self, repository: &Repository) -> Result<ArchiveCount, CommandError> {
        let stdout = self.runner.output(&self.invocation(repository))?;
        let listing: ArchiveListing = serde_json::from_slice(&stdout)?;

        let starts = listing
            .archives
            .iter()
            .map(|archive| parse_start(&archive.start))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(count_archives(&starts, Local::now().naive_local()))
    }

    /// Builds the report without sending it
    ///
    /// The last line carries no trailing whitespace.
    pub fn report(&self) -> Result<String, CommandError> {
        let lines = self
            .repositories
            .iter()
            .map(|repository| {
                let count = self.count(repository)?;
                Ok(format!(
                    "{}: {} (24h) {} (total)",
                    repository.name, count.recent, count.total
                ))
            })
            .collect::<Result<Vec<_>, CommandError>>()?;

        Ok(format!("Backup check results:\n{}", lines.join("\n")))
    }
}

impl Command for ArchiveCheckCommand {
    fn execute(&self) -> Result<(), CommandError> {
        let report = self.report()?;
        self.notify.message(&report)?;
        Ok(())
    }
}

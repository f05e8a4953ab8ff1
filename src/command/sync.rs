//! Remote sync through rclone

use std::rc::Rc;

use serde::Deserialize;

use super::{required, Command, CommandError, Invocation, ProcessRunner};
use crate::config::Injectable;

pub const RCLONE: &str = "rclone";

/// Parameters of an `rclone` task
///
/// All three are checked when the sync runs, not when it is built.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncParams {
    pub config_file: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
}

impl Injectable for SyncParams {
    const TARGET: &'static str = "rclone";
    const PARAMETERS: &'static [&'static str] = &["configFile", "source", "destination"];
}

pub struct SyncCommand {
    params: SyncParams,
    runner: Rc<dyn ProcessRunner>,
}

impl SyncCommand {
    pub fn new(params: SyncParams, runner: Rc<dyn ProcessRunner>) -> Self {
        Self { params, runner }
    }

    pub fn invocation(&self) -> Result<Invocation, CommandError> {
        let params = &self.params;

        Ok(Invocation::new(RCLONE)
            .args(["--verbose", "--config"])
            .arg(required(params.config_file.as_deref(), "configFile")?)
            .arg("sync")
            .arg(required(params.source.as_deref(), "source")?)
            .arg(required(params.destination.as_deref(), "destination")?))
    }
}

impl Command for SyncCommand {
    fn execute(&self) -> Result<(), CommandError> {
        self.runner.run(&self.invocation()?)
    }
}

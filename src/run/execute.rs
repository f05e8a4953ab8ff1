//! The sequential run loop

use thiserror::Error;
use tracing::{info, warn};

use super::{Task, TaskList, TaskOutcome};
use crate::config::ConfigError;
use crate::notify::{Notifications, NotifyError};

/// Sent after a run without failed tasks
pub const SUCCESS_MESSAGE: &str = "Backup successful";

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Counts of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub executed: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Executes every selected task in order
///
/// An empty `tags` slice leaves the list's filter untouched.
pub fn execute_tasks(
    task_list: &mut TaskList<Task>,
    tags: &[String],
) -> Result<RunSummary, RunError> {
    if !tags.is_empty() {
        task_list.filter_by_tags(tags.iter().cloned());
    }

    let mut summary = RunSummary::default();
    for task in task_list.iter() {
        let task = task?;
        summary.executed += 1;

        if task.safe_execute()? == TaskOutcome::Failure {
            summary.failed += 1;
        }
    }

    info!(
        executed = summary.executed,
        failed = summary.failed,
        "Run finished"
    );
    Ok(summary)
}

/// Sends the success message iff no task failed
pub fn report_summary(notify: &Notifications, summary: &RunSummary) -> Result<(), NotifyError> {
    if summary.succeeded() {
        notify.message(SUCCESS_MESSAGE)
    } else {
        warn!(failed = summary.failed, "Skipping success notification");
        Ok(())
    }
}

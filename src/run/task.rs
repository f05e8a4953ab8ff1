//! Named, tagged wrapper around a command
//!
//! [`Task::safe_execute`] is the single place where command failures are
//! contained. Everything a command returns as an error ends up here as a
//! log record, one failure notification and [`TaskOutcome::Failure`].

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::command::Command;
use crate::config::{ConfigMap, Injectable};
use crate::notify::{Notifications, NotifyError};

/// Name used in logs and notifications when an entry has none
pub const UNNAMED_TASK: &str = "unnamed";

/// Identity fields of a task entry
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TaskParams {
    pub name: Option<String>,
    pub tags: BTreeSet<String>,
}

impl Injectable for TaskParams {
    const TARGET: &'static str = "task";
    const PARAMETERS: &'static [&'static str] = &["name", "tags"];

    fn defaults() -> ConfigMap {
        let mut defaults = ConfigMap::new();
        defaults.insert("tags".to_string(), json!([]));
        defaults
    }
}

/// Result of one contained execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failure,
}

impl TaskOutcome {
    /// 0 on success, 1 on failure
    pub fn code(&self) -> u32 {
        match self {
            TaskOutcome::Success => 0,
            TaskOutcome::Failure => 1,
        }
    }
}

/// Something that can be selected by tag
pub trait Tagged {
    /// True iff at least one of `tags` is carried
    fn is_active(&self, tags: &BTreeSet<String>) -> bool;
}

pub struct Task {
    name: String,
    tags: BTreeSet<String>,
    command: Box<dyn Command>,
    notify: Rc<Notifications>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        tags: BTreeSet<String>,
        command: Box<dyn Command>,
        notify: Rc<Notifications>,
    ) -> Self {
        Self {
            name: name.into(),
            tags,
            command,
            notify,
        }
    }

    pub fn from_params(
        params: TaskParams,
        command: Box<dyn Command>,
        notify: Rc<Notifications>,
    ) -> Self {
        let name = params.name.unwrap_or_else(|| {
            warn!("Task entry without a name");
            UNNAMED_TASK.to_string()
        });
        Self::new(name, params.tags, command, notify)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Runs the command and contains any failure
    ///
    /// Only a failure to deliver the failure notification escapes.
    pub fn safe_execute(&self) -> Result<TaskOutcome, NotifyError> {
        info!(task = %self.name, "Starting task");

        match self.command.execute() {
            Ok(()) => {
                info!(task = %self.name, "Task finished");
                Ok(TaskOutcome::Success)
            }
            Err(e) => {
                error!(task = %self.name, "Task failed: {:#}", anyhow::Error::new(e));
                self.notify.task_failed(self)?;
                Ok(TaskOutcome::Failure)
            }
        }
    }
}

impl Tagged for Task {
    fn is_active(&self, tags: &BTreeSet<String>) -> bool {
        !self.tags.is_disjoint(tags)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

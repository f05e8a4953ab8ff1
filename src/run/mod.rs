//! # Task Execution
//!
//! Tasks run one at a time in configuration order. Each task contains its
//! own failures, so a broken task never stops the ones after it.
//!
//! ## Key Types
//!
//! - [`Task`] - Name, tags and a command, with the failure boundary
//! - [`TaskList`] - Lazy, filterable sequence built from task entries
//! - [`execute_tasks`] - The run loop
//! - [`RunSummary`] - What happened during a run

mod execute;
mod list;
mod task;

pub use execute::{execute_tasks, report_summary, RunError, RunSummary, SUCCESS_MESSAGE};
pub use list::TaskList;
pub use task::{Tagged, Task, TaskOutcome, TaskParams, UNNAMED_TASK};

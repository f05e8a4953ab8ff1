//! # Commands
//!
//! The operations a task can run, decoupled from naming, tagging and
//! failure reporting.
//!
//! ## Built-in Types
//!
//! | Type key | Command | External program |
//! |----------|---------|------------------|
//! | `rclone` | [`SyncCommand`] | `rclone sync` |
//! | `backup` | [`ArchiveCreateCommand`] | `borg create` |
//! | `prune` | [`ArchivePruneCommand`] | `borg prune` |
//! | `check` | [`ArchiveCheckCommand`] | `borg list --json` |
//! | `testfail` | [`AlwaysFailCommand`] | none |
//!
//! ## Key Types
//!
//! - [`Command`] - The execution capability every variant implements
//! - [`CommandRegistry`] - Maps a type key to a constructor
//! - [`ProcessRunner`] - Seam between commands and the operating system

mod borg;
mod check;
mod create;
mod fail;
mod process;
mod prune;
mod registry;
mod sync;

use std::process::ExitStatus;
use std::rc::Rc;

use thiserror::Error;

use crate::config::Repositories;
use crate::notify::{NotifyError, Notifications};

pub use check::{count_archives, parse_start, ArchiveCheckCommand, ArchiveCheckParams, ArchiveCount};
pub use create::{ArchiveCreateCommand, ArchiveCreateParams};
pub use fail::{AlwaysFailCommand, NoParams};
pub use process::{Invocation, ProcessRunner, SystemRunner};
pub use prune::{ArchivePruneCommand, ArchivePruneParams, RetentionValue};
pub use registry::{CommandConstructor, CommandRegistry, CommandType};
pub use sync::{SyncCommand, SyncParams};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to spawn {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed with {status}")]
    Status { program: String, status: ExitStatus },

    #[error("Failed to parse archive listing: {0}")]
    Listing(#[from] serde_json::Error),

    #[error("Invalid archive timestamp: {0}")]
    Timestamp(String),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("Missing parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("Task failed")]
    Deliberate,
}

/// Returns a parameter that may only be absent until execution
pub(crate) fn required<'a, T: ?Sized>(
    value: Option<&'a T>,
    key: &'static str,
) -> Result<&'a T, CommandError> {
    value.ok_or(CommandError::MissingParameter(key))
}

/// An executable backup operation
pub trait Command {
    /// Runs the operation; external failures are returned, never swallowed
    fn execute(&self) -> Result<(), CommandError>;
}

/// Collaborators shared by all commands of one run
#[derive(Clone)]
pub struct CommandContext {
    pub repositories: Rc<Repositories>,
    pub notify: Rc<Notifications>,
    pub runner: Rc<dyn ProcessRunner>,
}

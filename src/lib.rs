//! Auto Backup - configuration-driven backup task runner
//!
//! Runs a list of declaratively configured tasks (rclone sync, borg archive
//! creation, pruning and archive checks) one after another and reports
//! failures and results as XMPP chat messages.

pub mod cli;
pub mod command;
pub mod config;
pub mod notify;
pub mod run;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{Command, CommandError, CommandRegistry};
pub use config::{ConfigError, RootConfig};
pub use notify::{NotificationSender, Notifications};
pub use run::{Task, TaskList};

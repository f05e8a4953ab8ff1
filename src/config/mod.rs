//! # Configuration
//!
//! Loading of the root TOML document and the composition rules that turn a
//! raw task entry into the values a command is built from.
//!
//! ## Precedence
//!
//! | Priority | Source | Applied by |
//! |----------|--------|------------|
//! | 1 | Explicit overrides | [`ValueInjector::provide_values`] |
//! | 2 | Task entry | [`TaskConfigMerger`] |
//! | 3 | Type section (`[backup]`, `[prune]`, ...) | [`TaskConfigMerger`] |
//! | 4 | Declared parameter defaults | [`Injectable::defaults`] |
//! | 5 | `null` | [`ValueInjector::resolve`] |
//!
//! ## Root Sections
//!
//! ```toml
//! [XMPP]
//! account   = "sender@example.net"
//! password  = "secret"
//! recipient = "admin@example.net"
//!
//! [repositories.offsite]
//! url      = "ssh://backup@host/./repo"
//! password = "repo-secret"
//!
//! [backup]
//! repository = "offsite"
//!
//! [[tasks]]
//! name = "Home"
//! tags = ["daily"]
//! type = "backup"
//! source = "/home"
//! ```

mod inject;
mod merge;
mod repository;
mod root;

use serde_json::{Map, Value};
use thiserror::Error;

pub use inject::{Injectable, ValueInjector};
pub use merge::{MergingTaskFactory, TaskConfigMerger};
pub use repository::{Repositories, Repository, RepositoryConfig};
pub use root::RootConfig;

/// Ordered key/value mapping used for sections and task entries
pub type ConfigMap = Map<String, Value>;

/// Key selecting the command constructor of a task entry
pub const TYPE_KEY: &str = "type";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Missing required key '{0}'")]
    MissingKey(String),

    #[error("Invalid section '{section}': {reason}")]
    InvalidSection { section: String, reason: String },

    #[error("Invalid parameters for '{target}'")]
    InvalidParameters {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown repository: {0}")]
    UnknownRepository(String),

    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),
}

/// Returns the `type` of a task entry
pub fn task_type(task_config: &ConfigMap) -> Result<&str, ConfigError> {
    task_config
        .get(TYPE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::MissingKey(TYPE_KEY.to_string()))
}

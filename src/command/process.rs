//! External process invocation
//!
//! Commands describe the process they want as an [`Invocation`] and hand it
//! to a [`ProcessRunner`]. The system runner blocks until the child exits;
//! no timeout is applied.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use super::CommandError;

/// A fully described external process call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invocation {
    /// Program to execute
    pub program: String,

    /// Arguments in order
    pub args: Vec<String>,

    /// Working directory (inherits the current one when unset)
    pub cwd: Option<PathBuf>,

    /// Variables added to the inherited environment
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Returns the value set for an environment variable, if any
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Program and arguments as a single list
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            command.current_dir(cwd);
        }

        for (key, value) in &self.env {
            command.env(key, value);
        }

        command
    }

    fn log(&self) {
        // Environment values carry passphrases; only the names are logged
        let env_keys: Vec<&str> = self.env.iter().map(|(k, _)| k.as_str()).collect();
        debug!(
            argv = ?self.argv(),
            cwd = ?self.cwd,
            env = ?env_keys,
            "Spawning process"
        );
    }
}

/// Executes external processes
pub trait ProcessRunner {
    /// Runs to completion; a non-zero exit status is an error
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError>;

    /// Runs to completion and returns captured stdout
    fn output(&self, invocation: &Invocation) -> Result<Vec<u8>, CommandError>;
}

/// Runs processes with [`std::process::Command`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        invocation.log();

        let status = invocation
            .to_command()
            .status()
            .map_err(|source| CommandError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(CommandError::Status {
                program: invocation.program.clone(),
                status,
            });
        }

        Ok(())
    }

    fn output(&self, invocation: &Invocation) -> Result<Vec<u8>, CommandError> {
        invocation.log();

        let output = invocation
            .to_command()
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| CommandError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Status {
                program: invocation.program.clone(),
                status: output.status,
            });
        }

        Ok(output.stdout)
    }
}

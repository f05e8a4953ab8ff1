//! Shared bits of the borg archive tool invocations

use super::Invocation;

pub const BORG: &str = "borg";

/// Passphrase of the repository being accessed
pub const PASSPHRASE_ENV: &str = "BORG_PASSPHRASE";

/// Remote shell command used for ssh repositories
pub const REMOTE_SHELL_ENV: &str = "BORG_RSH";

/// Adds the passphrase and, only when configured, the remote shell command
pub fn with_repository_env(
    invocation: Invocation,
    password: &str,
    ssh_command: Option<&str>,
) -> Invocation {
    let invocation = invocation.env(PASSPHRASE_ENV, password);

    match ssh_command {
        Some(command) => invocation.env(REMOTE_SHELL_ENV, command),
        None => invocation,
    }
}

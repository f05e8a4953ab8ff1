//! Diagnostic command for exercising the failure path end to end

use serde::Deserialize;

use super::{Command, CommandError};
use crate::config::Injectable;

/// Empty parameter set
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct NoParams {}

impl Injectable for NoParams {
    const TARGET: &'static str = "testfail";
    const PARAMETERS: &'static [&'static str] = &[];
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFailCommand;

impl Command for AlwaysFailCommand {
    fn execute(&self) -> Result<(), CommandError> {
        Err(CommandError::Deliberate)
    }
}

use std::collections::HashSet;

use crate::{config::PreviewConfig, PreviewboxError, PreviewboxResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The allow-list of programs that may be run inside a sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPolicy {
    allowed: HashSet<String>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl CommandPolicy {
    /// Creates a policy allowing exactly `programs`.
    pub fn new<I, S>(programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: programs.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates the policy described by the configuration's allow-list.
    pub fn from_config(config: &PreviewConfig) -> Self {
        Self::new(config.get_allowed_commands().iter().cloned())
    }

    /// Returns whether `program` may be run.
    pub fn allows(&self, program: &str) -> bool {
        self.allowed.contains(program)
    }

    /// Splits a raw command line on whitespace and checks its program against the allow-list.
    ///
    /// Returns the argv to execute, program first.
    pub fn parse(&self, command_line: &str) -> PreviewboxResult<Vec<String>> {
        let argv: Vec<String> = command_line.split_whitespace().map(String::from).collect();
        let program = argv.first().map(String::as_str).unwrap_or_default();

        if !self.allows(program) {
            return Err(PreviewboxError::CommandRejected(program.to_string()));
        }

        Ok(argv)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

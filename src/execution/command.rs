//! Command representation.

use std::time::Duration;

/// A one-shot command to run through a [`CommandRunner`](super::CommandRunner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The command line to execute.
    pub command_line: String,
    /// Maximum execution time; [`DEFAULT_TIMEOUT`](super::DEFAULT_TIMEOUT) when unset.
    pub timeout: Option<Duration>,
}

impl Command {
    /// Create a new command with the given command line.
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            timeout: None,
        }
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Timeout in effect for this command.
    pub fn effective_timeout(&self) -> Duration {
        self.timeout.unwrap_or(super::DEFAULT_TIMEOUT)
    }
}

impl From<&str> for Command {
    fn from(command_line: &str) -> Self {
        Self::new(command_line)
    }
}

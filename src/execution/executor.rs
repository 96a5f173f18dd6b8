//! Deadline-bounded command execution.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::command::Command;
use super::result::ExecutionResult;
use crate::error::ShellTermError;
use crate::Result;

/// Default execution timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Black-box primitive that runs one command to completion.
///
/// Implementations block; [`execute_with_timeout`] moves them onto the
/// blocking pool.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &Command) -> Result<ExecutionResult>;
}

/// Run `command` on `runner`, failing with [`ShellTermError::Timeout`] once
/// its deadline passes.
///
/// The blocking call is not interrupted on timeout; runners that can stop
/// early should honor [`Command::effective_timeout`] themselves.
pub async fn execute_with_timeout(
    runner: Arc<dyn CommandRunner>,
    command: Command,
) -> Result<ExecutionResult> {
    let deadline = command.effective_timeout();
    debug!("Executing {:?} with {:?} deadline", command.command_line, deadline);

    let task = tokio::task::spawn_blocking(move || runner.run(&command));

    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(ShellTermError::ExecutionFailed(e.to_string())),
        Err(_) => {
            warn!("Command exceeded {:?} deadline", deadline);
            Err(ShellTermError::Timeout)
        }
    }
}

/// Run a command line with [`DEFAULT_TIMEOUT`].
pub async fn execute(runner: Arc<dyn CommandRunner>, command_line: &str) -> Result<ExecutionResult> {
    execute_with_timeout(runner, Command::new(command_line)).await
}
